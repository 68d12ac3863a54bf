//! Small shared types: precedence tiers, provenance, and the ordered list of
//! config files to read.

use std::fmt;
use std::path::{Path, PathBuf};

/// Precedence tier, lowest first. Each tier fully overrides the ones before
/// it for the keys it sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Defaults,
    Global,
    User,
    Environment,
    CommandLine,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Defaults => write!(f, "defaults"),
            Tier::Global => write!(f, "global"),
            Tier::User => write!(f, "user"),
            Tier::Environment => write!(f, "environment"),
            Tier::CommandLine => write!(f, "command line"),
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Default,
    File { path: PathBuf, tier: Tier },
    Env(String),
    CommandLine,
}

impl Source {
    pub fn tier(&self) -> Tier {
        match self {
            Source::Default => Tier::Defaults,
            Source::File { tier, .. } => *tier,
            Source::Env(_) => Tier::Environment,
            Source::CommandLine => Tier::CommandLine,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Default => write!(f, "default"),
            Source::File { path, .. } => write!(f, "{}", path.display()),
            Source::Env(var) => write!(f, "environment variable {var}"),
            Source::CommandLine => write!(f, "command line"),
        }
    }
}

/// Ordered config files to read: every global path, then every per-user path.
///
/// Paths are kept in the order they are added; callers that expand a
/// directory of `*.conf` files are expected to add them sorted. Later entries
/// override earlier ones for the keys they set. A path that does not exist is
/// skipped when loading.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSource {
    global: Vec<PathBuf>,
    user: Vec<PathBuf>,
}

impl ConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a system-wide config file.
    pub fn global(mut self, path: impl Into<PathBuf>) -> Self {
        self.global.push(path.into());
        self
    }

    /// Append several system-wide config files.
    pub fn globals<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.global.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Append a per-user config file.
    pub fn user(mut self, path: impl Into<PathBuf>) -> Self {
        self.user.push(path.into());
        self
    }

    /// Append several per-user config files.
    pub fn users<P: Into<PathBuf>>(mut self, paths: impl IntoIterator<Item = P>) -> Self {
        self.user.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.user.is_empty()
    }

    /// All paths in precedence order, each tagged with its tier.
    pub fn paths(&self) -> impl Iterator<Item = (&Path, Tier)> {
        self.global
            .iter()
            .map(|p| (p.as_path(), Tier::Global))
            .chain(self.user.iter().map(|p| (p.as_path(), Tier::User)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered_by_precedence() {
        assert!(Tier::Defaults < Tier::Global);
        assert!(Tier::Global < Tier::User);
        assert!(Tier::User < Tier::Environment);
        assert!(Tier::Environment < Tier::CommandLine);
    }

    #[test]
    fn globals_come_before_users_regardless_of_call_order() {
        let source = ConfigSource::new()
            .user("/home/u/.app.conf")
            .global("/etc/app.conf")
            .globals(["/etc/app/a.conf", "/etc/app/b.conf"]);
        let paths: Vec<_> = source.paths().collect();
        assert_eq!(
            paths,
            vec![
                (Path::new("/etc/app.conf"), Tier::Global),
                (Path::new("/etc/app/a.conf"), Tier::Global),
                (Path::new("/etc/app/b.conf"), Tier::Global),
                (Path::new("/home/u/.app.conf"), Tier::User),
            ]
        );
    }

    #[test]
    fn source_display() {
        assert_eq!(Source::Default.to_string(), "default");
        assert_eq!(Source::CommandLine.to_string(), "command line");
        assert_eq!(
            Source::Env("APP__JOBS".into()).to_string(),
            "environment variable APP__JOBS"
        );
    }
}
