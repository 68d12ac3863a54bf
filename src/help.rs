//! Usage text for `--help` and `help COMMAND`.

use crate::dispatch::{Subcommand, Subcommands};
use crate::registry::Registry;
use crate::setting::Setting;
use crate::value::SettingKind;

/// Column where help text starts.
const HELP_COLUMN: usize = 24;

/// The `Usage:` line.
pub fn synopsis(program: &str, subcommands: &Subcommands) -> String {
    if subcommands.is_empty() {
        format!("Usage: {program} [OPTIONS] [ARGS]...")
    } else {
        format!("Usage: {program} [OPTIONS] COMMAND [ARGS]...")
    }
}

/// Full help: synopsis, description, commands, then options by group.
///
/// Ungrouped settings come first under `Options:`; each group follows under
/// its own heading, in the order the groups first appear.
pub fn usage(
    program: &str,
    description: Option<&str>,
    registry: &Registry,
    subcommands: &Subcommands,
) -> String {
    let mut out = synopsis(program, subcommands);
    out.push('\n');

    if let Some(description) = description {
        out.push_str(&format!("\n{description}\n"));
    }

    if !subcommands.is_empty() {
        out.push_str("\nCommands:\n");
        for subcommand in subcommands.iter() {
            push_row(&mut out, subcommand.name(), subcommand.help());
        }
    }

    for (heading, settings) in grouped(registry) {
        if settings.is_empty() {
            continue;
        }
        out.push_str(&format!("\n{heading}:\n"));
        for setting in settings {
            push_row(&mut out, &option_label(setting), &option_help(setting));
        }
    }
    out
}

/// Help for one subcommand, as shown by `help COMMAND`.
pub fn subcommand_help(program: &str, subcommand: &Subcommand) -> String {
    let mut out = format!("Usage: {program} [OPTIONS] {}", subcommand.name());
    if !subcommand.usage_text().is_empty() {
        out.push(' ');
        out.push_str(subcommand.usage_text());
    }
    out.push('\n');
    if !subcommand.help().is_empty() {
        out.push_str(&format!("\n{}\n", subcommand.help()));
    }
    out
}

/// `-o, --output=FILE`, or `-v, --verbose, --no-verbose` for booleans.
pub fn option_label(setting: &Setting) -> String {
    let mut names: Vec<String> = setting.aliases().iter().map(|c| format!("-{c}")).collect();
    let flags = setting.long_flags();
    let takes_value = setting.kind().takes_value();
    for flag in flags {
        if takes_value {
            names.push(format!("--{}={}", flag.name, setting.metavar_name()));
        } else {
            names.push(format!("--{}", flag.name));
        }
    }
    names.join(", ")
}

/// Help text with the permitted choices appended.
pub fn option_help(setting: &Setting) -> String {
    match setting.kind() {
        SettingKind::Choice(choices) => {
            let choices = choices.join(", ");
            if setting.help().is_empty() {
                format!("one of: {choices}")
            } else {
                format!("{} (one of: {choices})", setting.help())
            }
        }
        _ => setting.help().to_string(),
    }
}

/// Settings split into `(heading, settings)`, ungrouped ones first.
pub fn grouped(registry: &Registry) -> Vec<(&str, Vec<&Setting>)> {
    let mut groups: Vec<(&str, Vec<&Setting>)> = vec![("Options", Vec::new())];
    for setting in registry.iter() {
        let heading = setting.group_name().unwrap_or("Options");
        match groups.iter_mut().find(|(name, _)| *name == heading) {
            Some((_, members)) => members.push(setting),
            None => groups.push((heading, vec![setting])),
        }
    }
    groups
}

fn push_row(out: &mut String, label: &str, help: &str) {
    if help.is_empty() {
        out.push_str(&format!("  {label}\n"));
    } else if label.len() + 2 < HELP_COLUMN - 2 {
        out.push_str(&format!("  {label:<width$}{help}\n", width = HELP_COLUMN - 2));
    } else {
        out.push_str(&format!("  {label}\n"));
        out.push_str(&format!("{:width$}{help}\n", "", width = HELP_COLUMN));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{test_registry, test_subcommands};

    #[test]
    fn synopsis_mentions_commands_only_when_present() {
        assert_eq!(
            synopsis("prog", &Subcommands::new()),
            "Usage: prog [OPTIONS] [ARGS]..."
        );
        assert_eq!(
            synopsis("prog", &test_subcommands()),
            "Usage: prog [OPTIONS] COMMAND [ARGS]..."
        );
    }

    #[test]
    fn labels() {
        let registry = test_registry();
        assert_eq!(
            option_label(registry.get("verbose").unwrap()),
            "-v, --verbose, --no-verbose"
        );
        assert_eq!(option_label(registry.get("output").unwrap()), "-o, --output=FILE");
        assert_eq!(option_label(registry.get("jobs").unwrap()), "-j, --jobs=INT");
        assert_eq!(option_label(registry.get("help").unwrap()), "-h, --help");
    }

    #[test]
    fn choices_listed_in_help() {
        let registry = test_registry();
        assert_eq!(
            option_help(registry.get("mode").unwrap()),
            "Search strategy. (one of: fast, slow)"
        );
    }

    #[test]
    fn usage_lists_commands_and_options() {
        let text = usage(
            "prog",
            Some("Search things."),
            &test_registry(),
            &test_subcommands(),
        );
        assert!(text.starts_with("Usage: prog [OPTIONS] COMMAND [ARGS]...\n\nSearch things.\n"));
        assert!(text.contains("\nCommands:\n  search                Search files for patterns.\n"));
        assert!(text.contains("  help                  Show help for a command.\n"));
        assert!(text.contains("\nOptions:\n"));
        assert!(text.contains("  -o, --output=FILE     Write output to FILE.\n"));
        // Long labels put the help on the next line.
        assert!(text.contains("  -v, --verbose, --no-verbose\n                        Print more output.\n"));
    }

    #[test]
    fn groups_follow_ungrouped_options() {
        let mut registry = Registry::new();
        registry
            .register_all([
                Setting::string("log", "Log file.").group("Logging"),
                Setting::boolean("quiet", "Be quiet."),
            ])
            .unwrap();
        let headings: Vec<_> = grouped(&registry).into_iter().map(|(h, _)| h).collect();
        assert_eq!(headings, vec!["Options", "Logging"]);

        let text = usage("prog", None, &registry, &Subcommands::new());
        let options = text.find("Options:").unwrap();
        let logging = text.find("Logging:").unwrap();
        assert!(options < logging);
    }

    #[test]
    fn row_without_help_is_label_only() {
        let mut out = String::new();
        push_row(&mut out, "--quiet", "");
        push_row(&mut out, "--jobs=INT", "Jobs.");
        assert_eq!(out, "  --quiet\n  --jobs=INT            Jobs.\n");
    }

    #[test]
    fn subcommand_usage() {
        let subcommands = test_subcommands();
        let text = subcommand_help("prog", subcommands.get("print").unwrap());
        assert_eq!(text, "Usage: prog [OPTIONS] print FILE\n\nPrint matching lines.\n");
    }
}
