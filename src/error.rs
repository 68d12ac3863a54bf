use std::path::PathBuf;
use thiserror::Error;

use crate::types::Source;

#[derive(Debug, Error)]
#[cfg_attr(feature = "rich-errors", derive(miette::Diagnostic))]
pub enum ClisetError {
    #[error("Failed to parse {path}: {message}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cliset::read)))]
    Read { path: PathBuf, message: String },

    #[error("Failed to read {path}: {source}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cliset::io)))]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid value '{value}' for setting '{setting}' from {origin}: {reason}")]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cliset::coercion)))]
    Coercion {
        setting: String,
        value: String,
        reason: String,
        origin: Source,
    },

    #[error(transparent)]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(code(cliset::parse), help("run with --help to list the options"))
    )]
    Parse(#[from] ParseError),

    #[error("Unknown command '{name}' (available: {})", available.join(", "))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cliset::dispatch)))]
    UnknownSubcommand {
        name: String,
        available: Vec<String>,
    },

    #[error("A command is required (available: {})", available.join(", "))]
    #[cfg_attr(feature = "rich-errors", diagnostic(code(cliset::dispatch)))]
    MissingSubcommand { available: Vec<String> },

    #[error("Setting '{0}' must be set")]
    #[cfg_attr(
        feature = "rich-errors",
        diagnostic(code(cliset::required), help("set it in a config file or on the command line"))
    )]
    MissingRequired(String),

    #[error("Unknown key '{key}' in {path} (line {line})")]
    UnknownKey {
        key: String,
        path: PathBuf,
        line: usize,
    },

    #[error("Unknown keys in config file")]
    UnknownKeys(Vec<ClisetError>),

    #[error("Unknown setting: {0}")]
    UnknownSetting(String),

    #[error("Setting '{setting}' is not {expected}")]
    TypeMismatch {
        setting: String,
        expected: &'static str,
    },

    #[error("Name '{0}' is registered more than once")]
    DuplicateName(String),

    #[error("Invalid setting name '{0}': use lowercase letters, digits and dashes")]
    InvalidName(String),

    #[error("Invalid default for '{setting}': {reason}")]
    InvalidDefault { setting: String, reason: String },
}

/// Errors raised while scanning command-line tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no such option: {token}")]
    UnknownOption { token: String },

    #[error("{option} option requires an argument")]
    MissingArgument { option: String },

    #[error("{option} option does not take a value (got '{value}')")]
    UnexpectedArgument { option: String, value: String },

    #[error("ambiguous option: {token} could be {}", candidates.join(", "))]
    AmbiguousOption {
        token: String,
        candidates: Vec<String>,
    },
}
