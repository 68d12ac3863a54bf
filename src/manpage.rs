//! Filling a troff manual page template.
//!
//! Only the bodies of the `.SH SYNOPSIS` and `.SH OPTIONS` sections are
//! generated. Every other line of the template, including the two section
//! headers, is copied verbatim.

use crate::dispatch::Subcommands;
use crate::help;
use crate::registry::Registry;
use crate::setting::Setting;

/// Replace the SYNOPSIS and OPTIONS bodies of `template`.
pub fn fill_template(
    template: &str,
    program: &str,
    registry: &Registry,
    subcommands: &Subcommands,
) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut skipping = false;

    for line in template.lines() {
        if let Some(title) = section_title(line) {
            out.push(line.to_string());
            skipping = true;
            match title.as_str() {
                "SYNOPSIS" => out.push(synopsis(program, registry, subcommands)),
                "OPTIONS" => out.push(options(registry)),
                _ => skipping = false,
            }
            continue;
        }
        if !skipping {
            out.push(line.to_string());
        }
    }

    let mut filled = out.join("\n");
    if template.ends_with('\n') {
        filled.push('\n');
    }
    filled
}

/// The section name of a `.SH` line, unquoted and uppercased.
fn section_title(line: &str) -> Option<String> {
    let rest = line.strip_prefix(".SH")?;
    if !rest.is_empty() && !rest.starts_with([' ', '\t']) {
        return None;
    }
    Some(rest.trim().trim_matches('"').to_ascii_uppercase())
}

fn synopsis(program: &str, registry: &Registry, subcommands: &Subcommands) -> String {
    let mut lines = vec![format!(".B {}", escape(program))];
    for setting in registry.iter() {
        for flag in setting.long_flags() {
            if setting.kind().takes_value() {
                lines.push(format!(
                    "[\\fB\\-\\-{}\\fR=\\fI{}\\fR]",
                    escape(&flag.name),
                    escape(setting.metavar_name())
                ));
            } else {
                lines.push(format!("[\\fB\\-\\-{}\\fR]", escape(&flag.name)));
            }
        }
    }
    if subcommands.is_empty() {
        lines.push("[\\fIARGS\\fR]...".to_string());
    } else {
        lines.push("\\fICOMMAND\\fR [\\fIARGS\\fR]...".to_string());
    }
    lines.join("\n")
}

fn options(registry: &Registry) -> String {
    let mut lines = Vec::new();
    for (heading, settings) in help::grouped(registry) {
        if settings.is_empty() {
            continue;
        }
        if heading != "Options" {
            lines.push(format!(".SS \"{}\"", escape(heading)));
        }
        for setting in settings {
            lines.push(".TP".to_string());
            lines.push(option_names(setting));
            let text = help::option_help(setting);
            if !text.is_empty() {
                lines.push(text_line(&text));
            }
        }
    }
    lines.join("\n")
}

fn option_names(setting: &Setting) -> String {
    let mut names: Vec<String> = setting
        .aliases()
        .iter()
        .map(|c| format!("\\fB\\-{}\\fR", escape(&c.to_string())))
        .collect();
    for flag in setting.long_flags() {
        let mut name = format!("\\fB\\-\\-{}\\fR", escape(&flag.name));
        if setting.kind().takes_value() {
            name.push_str(&format!("=\\fI{}\\fR", escape(setting.metavar_name())));
        }
        names.push(name);
    }
    names.join(", ")
}

/// A text line that troff will not read as a request.
fn text_line(text: &str) -> String {
    let escaped = escape(text);
    if escaped.starts_with(['.', '\'']) {
        format!("\\&{escaped}")
    } else {
        escaped
    }
}

/// Escape backslashes and dashes for troff.
fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('-', "\\-")
}
