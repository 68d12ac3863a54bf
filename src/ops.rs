//! Immediate actions and the text they produce.
//!
//! Provides the logic behind `--help`, `--version`, `--dump-config`,
//! `--dump-setting-names`, `--generate-manpage` and `help COMMAND`, and the
//! `ActionResult` enum that callers use to display results.

use std::fmt;
use std::path::Path;

use crate::dispatch::{Subcommand, Subcommands};
use crate::error::ClisetError;
use crate::file::CONFIG_SECTION;
use crate::help;
use crate::manpage;
use crate::registry::Registry;
use crate::resolved::{ConfigEntry, ResolvedSettings};
use crate::types::Source;

/// Result of an immediate action. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionResult {
    /// General usage text.
    Help(String),
    /// Usage text of one subcommand.
    SubcommandHelp(String),
    Version { program: String, version: String },
    /// The resolved `[config]` section.
    DumpConfig { entries: Vec<ConfigEntry> },
    /// Every registered setting name, in registration order.
    SettingNames(Vec<String>),
    /// A filled manual page.
    Manpage(String),
}

impl fmt::Display for ActionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionResult::Help(text)
            | ActionResult::SubcommandHelp(text)
            | ActionResult::Manpage(text) => write!(f, "{text}"),
            ActionResult::Version { program, version } => writeln!(f, "{program} {version}"),
            ActionResult::DumpConfig { entries } => {
                writeln!(f, "[{CONFIG_SECTION}]")?;
                for entry in entries {
                    if entry.source != Source::Default {
                        writeln!(f, "# {}", entry.source)?;
                    }
                    if entry.value.is_empty() {
                        writeln!(f, "{} =", entry.key)?;
                    } else {
                        writeln!(f, "{} = {}", entry.key, entry.value)?;
                    }
                }
                Ok(())
            }
            ActionResult::SettingNames(names) => {
                for name in names {
                    writeln!(f, "{name}")?;
                }
                Ok(())
            }
        }
    }
}

pub fn help(
    program: &str,
    description: Option<&str>,
    registry: &Registry,
    subcommands: &Subcommands,
) -> ActionResult {
    ActionResult::Help(help::usage(program, description, registry, subcommands))
}

pub fn subcommand_help(program: &str, subcommand: &Subcommand) -> ActionResult {
    ActionResult::SubcommandHelp(help::subcommand_help(program, subcommand))
}

pub fn dump_config(settings: &ResolvedSettings) -> ActionResult {
    ActionResult::DumpConfig {
        entries: settings.dump_config(),
    }
}

pub fn setting_names(registry: &Registry) -> ActionResult {
    ActionResult::SettingNames(registry.iter().map(|s| s.name().to_string()).collect())
}

/// Read the troff template at `path` and fill it in.
pub fn generate_manpage(
    path: &Path,
    program: &str,
    registry: &Registry,
    subcommands: &Subcommands,
) -> Result<ActionResult, ClisetError> {
    let template = std::fs::read_to_string(path).map_err(|e| ClisetError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(ActionResult::Manpage(manpage::fill_template(
        &template,
        program,
        registry,
        subcommands,
    )))
}
