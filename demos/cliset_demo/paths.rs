//! Config file discovery for the demo.
//!
//! Cliset reads the files it is given and skips missing ones; deciding which
//! files exist is the program's job. The demo uses the classic layout:
//!
//! | Tier   | Paths                                                        |
//! |--------|--------------------------------------------------------------|
//! | global | `/etc/grepper.conf`, then `/etc/grepper/*.conf` sorted       |
//! | user   | `~/.grepper.conf`, then `~/.config/grepper/*.conf` sorted    |
//!
//! plus the platform config directory from the `directories` crate when it
//! differs from the fixed user directory.

use std::path::{Path, PathBuf};

use cliset::ConfigSource;
use directories::{BaseDirs, ProjectDirs};

pub fn config_source(program: &str) -> ConfigSource {
    let etc = PathBuf::from("/etc");
    let mut source = ConfigSource::new()
        .global(etc.join(format!("{program}.conf")))
        .globals(conf_files(&etc.join(program)));

    if let Some(base) = BaseDirs::new() {
        let home = base.home_dir();
        let user_dir = home.join(".config").join(program);
        source = source
            .user(home.join(format!(".{program}.conf")))
            .users(conf_files(&user_dir));

        if let Some(project) = ProjectDirs::from("", "", program)
            && project.config_dir() != user_dir
        {
            source = source.users(conf_files(project.config_dir()));
        }
    }
    source
}

/// `*.conf` files in `dir`, sorted. Empty when the directory is missing.
fn conf_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "conf"))
        .collect();
    files.sort();
    files
}
