//! Subcommands and dispatch of the positional arguments.

use tracing::debug;

use crate::error::ClisetError;

/// Name of the subcommand that is added as soon as any other one exists.
pub const HELP_SUBCOMMAND: &str = "help";

/// A named subcommand with its help text and argument synopsis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcommand {
    name: String,
    help: String,
    usage: String,
}

impl Subcommand {
    pub fn new(name: &str, help: &str) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            usage: String::new(),
        }
    }

    /// Argument synopsis shown after the name, e.g. `FILE...`.
    pub fn usage(mut self, usage: &str) -> Self {
        self.usage = usage.to_string();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn usage_text(&self) -> &str {
        &self.usage
    }
}

/// Registered subcommands, in registration order.
///
/// When at least one is registered, `help` is available as well and is
/// listed last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subcommands {
    commands: Vec<Subcommand>,
    help: Subcommand,
}

impl Default for Subcommands {
    fn default() -> Self {
        Self {
            commands: Vec::new(),
            help: Subcommand::new(HELP_SUBCOMMAND, "Show help for a command.").usage("[COMMAND]"),
        }
    }
}

impl Subcommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subcommand. `help` is reserved.
    pub fn add(&mut self, subcommand: Subcommand) -> Result<(), ClisetError> {
        let name = subcommand.name();
        if name.is_empty() || name.starts_with('-') {
            return Err(ClisetError::InvalidName(name.to_string()));
        }
        if name == HELP_SUBCOMMAND || self.commands.iter().any(|c| c.name == name) {
            return Err(ClisetError::DuplicateName(name.to_string()));
        }
        self.commands.push(subcommand);
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Every subcommand including `help`; nothing when none is registered.
    pub fn iter(&self) -> impl Iterator<Item = &Subcommand> {
        let help = (!self.is_empty()).then_some(&self.help);
        self.commands.iter().chain(help)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.iter().map(Subcommand::name)
    }

    /// Case-sensitive lookup.
    pub fn get(&self, name: &str) -> Option<&Subcommand> {
        self.iter().find(|c| c.name == name)
    }

    fn available(&self) -> Vec<String> {
        self.names().map(String::from).collect()
    }
}

/// Where the positional arguments go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    /// No subcommands registered: the positionals are the program's arguments.
    Args(Vec<String>),
    /// Run `subcommand` with the remaining arguments.
    Run {
        subcommand: String,
        args: Vec<String>,
    },
    /// `help` or `help NAME`. Nothing is run.
    Help { subcommand: Option<Subcommand> },
}

/// Route positional arguments to a subcommand.
///
/// With no subcommands registered the positionals pass through unchanged.
/// Otherwise the first one names the subcommand.
pub fn dispatch(
    positionals: Vec<String>,
    subcommands: &Subcommands,
) -> Result<Dispatch, ClisetError> {
    if subcommands.is_empty() {
        return Ok(Dispatch::Args(positionals));
    }

    let mut positionals = positionals.into_iter();
    let Some(name) = positionals.next() else {
        return Err(ClisetError::MissingSubcommand {
            available: subcommands.available(),
        });
    };
    if subcommands.get(&name).is_none() {
        return Err(ClisetError::UnknownSubcommand {
            name,
            available: subcommands.available(),
        });
    }

    if name == HELP_SUBCOMMAND {
        let subcommand = match positionals.next() {
            None => None,
            Some(topic) => match subcommands.get(&topic) {
                Some(found) => Some(found.clone()),
                None => {
                    return Err(ClisetError::UnknownSubcommand {
                        name: topic,
                        available: subcommands.available(),
                    });
                }
            },
        };
        return Ok(Dispatch::Help { subcommand });
    }

    debug!(subcommand = %name, "dispatching");
    Ok(Dispatch::Run {
        subcommand: name,
        args: positionals.collect(),
    })
}
