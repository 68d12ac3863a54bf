//! Clap adapter for cliset.
//!
//! This module is the **optional integration layer** between cliset's own
//! token parser and the [clap](https://docs.rs/clap) ecosystem. It is
//! compiled only when the `clap` Cargo feature is enabled (on by default).
//!
//! [`Cliset::to_clap_command()`] mirrors the registry as a `clap::Command`:
//! every long flag (including the derived `--no-*` forms) becomes an
//! argument, choices become possible values, help groups become help
//! headings, and subcommands carry over. Hand the command to clap-based
//! tooling such as shell-completion or man-page generators.
//!
//! Parsing and resolution stay with [`Cliset::resolve()`]; the command is a
//! description of the interface, not a second parser to keep in sync.

use clap::builder::PossibleValuesParser;
use clap::{Arg, ArgAction, Command};

use crate::builder::Cliset;
use crate::setting::{FlagEffect, Setting};
use crate::value::SettingKind;

/// Id of the positional arguments. Uppercase, so it never collides with a
/// setting name.
const ARGS_ID: &str = "ARGS";

impl Cliset {
    /// Describe this program as a `clap::Command`.
    pub fn to_clap_command(&self) -> Command {
        let mut command = Command::new(self.program().to_string())
            .disable_help_flag(true)
            .disable_version_flag(true)
            .disable_help_subcommand(true)
            .args_override_self(true);
        if let Some(version) = self.version() {
            command = command.version(version.to_string());
        }
        if let Some(description) = self.description() {
            command = command.about(description.to_string());
        }

        for setting in self.registry().iter() {
            command = command.args(setting_args(setting));
        }

        if self.subcommands().is_empty() {
            command = command.arg(positionals());
        } else {
            command = command.subcommand_required(true);
            for subcommand in self.subcommands().iter() {
                command = command.subcommand(
                    Command::new(subcommand.name().to_string())
                        .about(subcommand.help().to_string())
                        .arg(positionals()),
                );
            }
        }
        command
    }
}

fn positionals() -> Arg {
    Arg::new(ARGS_ID)
        .num_args(0..)
        .action(ArgAction::Append)
}

/// One clap argument per long flag of `setting`.
fn setting_args(setting: &Setting) -> Vec<Arg> {
    let flags = setting.long_flags();
    let mut args = Vec::with_capacity(flags.len());

    for (i, flag) in flags.iter().enumerate() {
        let mut arg = Arg::new(flag.name.clone()).long(flag.name.clone());
        if let Some(group) = setting.group_name() {
            arg = arg.help_heading(group.to_string());
        }

        arg = match flag.effect {
            FlagEffect::Enable => {
                let arg = arg.action(ArgAction::SetTrue).help(setting.help().to_string());
                match flags.get(1) {
                    Some(negation) => arg.overrides_with(negation.name.clone()),
                    None => arg,
                }
            }
            FlagEffect::Disable => arg
                .action(ArgAction::SetTrue)
                .help(format!("Negate --{}", setting.name()))
                .overrides_with(setting.name().to_string()),
            FlagEffect::Assign => value_arg(arg, setting),
        };

        if i == 0
            && let Some((first, rest)) = setting.aliases().split_first()
        {
            arg = arg.short(*first).short_aliases(rest.iter().copied());
        }
        args.push(arg);
    }
    args
}

fn value_arg(arg: Arg, setting: &Setting) -> Arg {
    let action = if *setting.kind() == SettingKind::StringList {
        ArgAction::Append
    } else {
        ArgAction::Set
    };
    let arg = arg
        .action(action)
        .num_args(1)
        .value_name(setting.metavar_name().to_string())
        .help(setting.help().to_string());

    match setting.kind() {
        SettingKind::Choice(choices) => arg.value_parser(PossibleValuesParser::new(choices.clone())),
        SettingKind::Integer => arg.allow_negative_numbers(true),
        _ => arg,
    }
}
