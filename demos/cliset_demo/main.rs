//! # cliset demo application
//!
//! A small grep-like tool that showcases how to integrate
//! [cliset](https://docs.rs/cliset) into a real application. This is **not**
//! a real app: it exists to demonstrate and manually verify cliset's
//! features.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example cliset_demo -- search -e fn src/lib.rs
//! cargo run --example cliset_demo -- --help
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature                | How to exercise it                                                   |
//! |------------------------|----------------------------------------------------------------------|
//! | Defaults               | `cargo run --example cliset_demo -- --dump-config`                   |
//! | Config files           | Put `[config]` in `~/.grepper.conf`, then `--dump-config`            |
//! | Explicit config file   | `... -- --config ./my.conf --dump-config`                            |
//! | Env var override       | `GREPPER__LOG_LEVEL=debug cargo run --example cliset_demo -- search -e x Cargo.toml` |
//! | Boolean negation       | `... -- --no-ignore-case search -e Fn src/lib.rs`                    |
//! | Repeated list option   | `... -- search -e fn -e struct src/lib.rs`                           |
//! | Subcommand help        | `cargo run --example cliset_demo -- help search`                     |
//! | Manual page            | `... -- --generate-manpage=grepper.1.in`                             |
//! | `--` terminator        | `... -- search -e x -- --odd-file-name`                              |
//! | Output file            | `... -- --output=matches.txt search -e fn src/lib.rs`                |
//! | Standard input         | `cat Cargo.toml \| cargo run --example cliset_demo -- search -e name` |

mod paths;

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::process::ExitCode;
use std::sync::Mutex;

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cliset::{Cliset, ClisetError, Outcome, ResolvedSettings, Setting, Subcommand, profile_env_var};

const PROGRAM: &str = "grepper";

fn build() -> Result<Cliset, ClisetError> {
    Cliset::builder(PROGRAM)
        .version(env!("CARGO_PKG_VERSION"))
        .description("Search files for lines matching any of the given patterns.")
        .setting(
            Setting::string_list("pattern", "search for PATTERN (repeatable)")
                .alias('e')
                .metavar("PATTERN"),
        )
        .setting(Setting::boolean("ignore-case", "ignore case when matching").alias('i'))
        .setting(Setting::boolean("line-number", "prefix lines with their number").alias('n'))
        .setting(Setting::bytesize("max-size", "skip files larger than SIZE").default_value(10_000_000_i64))
        .setting(
            Setting::integer("max-count", "stop after N matches per file (0: no limit)")
                .alias('m')
                .metavar("N"),
        )
        .subcommand(Subcommand::new("search", "Print matching lines of each FILE (default: standard input).").usage("[FILE]..."))
        .subcommand(Subcommand::new("count", "Count matching lines of each FILE (default: standard input).").usage("[FILE]..."))
        .config_source(paths::config_source(PROGRAM))
        .env_prefix("GREPPER")
        .build()
}

/// Install a subscriber honouring `--log` and `--log-level`.
///
/// `RUST_LOG`, when set, wins over `--log-level`.
fn init_logging(settings: &ResolvedSettings) -> Result<(), ClisetError> {
    let level = match settings.string("log-level")? {
        "debug" => "debug",
        "info" => "info",
        "warning" => "warn",
        _ => "error",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let log = settings.string("log")?;
    if log.is_empty() {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(filter)
            .init();
    } else {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log)
            .map_err(|e| ClisetError::Io {
                path: log.into(),
                source: e,
            })?;
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_env_filter(filter)
            .init();
    }
    Ok(())
}

struct Matcher {
    patterns: Vec<String>,
    ignore_case: bool,
}

impl Matcher {
    fn new(settings: &ResolvedSettings) -> Result<Self, ClisetError> {
        let ignore_case = settings.boolean("ignore-case")?;
        let patterns = settings
            .string_list("pattern")?
            .iter()
            .map(|p| if ignore_case { p.to_lowercase() } else { p.clone() })
            .collect();
        Ok(Self {
            patterns,
            ignore_case,
        })
    }

    fn is_match(&self, line: &str) -> bool {
        if self.ignore_case {
            let line = line.to_lowercase();
            self.patterns.iter().any(|p| line.contains(p.as_str()))
        } else {
            self.patterns.iter().any(|p| line.contains(p.as_str()))
        }
    }
}

fn io_error(path: &str) -> impl Fn(io::Error) -> ClisetError + '_ {
    move |e| ClisetError::Io {
        path: path.into(),
        source: e,
    }
}

/// Open an input by name; `-` is standard input.
fn open_input(
    path: &str,
    settings: &ResolvedSettings,
) -> Result<Option<Box<dyn BufRead>>, ClisetError> {
    if path == "-" {
        return Ok(Some(Box::new(io::stdin().lock())));
    }
    let file = File::open(path).map_err(io_error(path))?;
    let size = file.metadata().map_err(io_error(path))?.len();
    let max_size = settings.integer("max-size")?;
    if max_size > 0 && size > max_size as u64 {
        warn!(path, size, max_size, "skipping large file");
        return Ok(None);
    }
    Ok(Some(Box::new(BufReader::new(file))))
}

/// Matching lines of `path` as `(line number, text)`.
fn matches(
    path: &str,
    matcher: &Matcher,
    settings: &ResolvedSettings,
) -> Result<Vec<(usize, String)>, ClisetError> {
    let Some(input) = open_input(path, settings)? else {
        return Ok(Vec::new());
    };

    let max_count = usize::try_from(settings.integer("max-count")?).unwrap_or(0);
    let mut found = Vec::new();
    for (i, line) in input.lines().enumerate() {
        let line = line.map_err(io_error(path))?;
        if matcher.is_match(&line) {
            found.push((i + 1, line));
            if max_count > 0 && found.len() >= max_count {
                break;
            }
        }
    }
    debug!(path, count = found.len(), "searched input");
    Ok(found)
}

/// Where results go: the `--output` file, or standard output.
fn open_output(settings: &ResolvedSettings) -> Result<Box<dyn Write>, ClisetError> {
    let output = settings.string("output")?;
    if output.is_empty() || output == "-" {
        return Ok(Box::new(io::stdout().lock()));
    }
    let file = File::create(output).map_err(io_error(output))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn run(
    subcommand: &str,
    files: &[String],
    settings: &ResolvedSettings,
    out: &mut dyn Write,
) -> Result<(), ClisetError> {
    settings.require("pattern")?;
    let matcher = Matcher::new(settings)?;
    let line_numbers = settings.boolean("line-number")?;
    let stdin = ["-".to_string()];
    let inputs = if files.is_empty() { &stdin[..] } else { files };
    let prefix_names = inputs.len() > 1;

    let output = settings.string("output")?;
    let write_error = io_error(if output.is_empty() { "-" } else { output });
    for path in inputs {
        let found = matches(path, &matcher, settings)?;
        match subcommand {
            "count" => writeln!(out, "{path}: {}", found.len()).map_err(&write_error)?,
            _ => {
                for (number, line) in found {
                    let written = match (prefix_names, line_numbers) {
                        (true, true) => writeln!(out, "{path}:{number}:{line}"),
                        (true, false) => writeln!(out, "{path}:{line}"),
                        (false, true) => writeln!(out, "{number}:{line}"),
                        (false, false) => writeln!(out, "{line}"),
                    };
                    written.map_err(&write_error)?;
                }
            }
        }
    }
    out.flush().map_err(write_error)
}

fn real_main() -> Result<(), ClisetError> {
    let app = build()?;
    match app.resolve(std::env::args().skip(1))? {
        Outcome::Exit(result) => print!("{result}"),
        Outcome::Immediate { action, .. } => {
            eprintln!("{PROGRAM}: unhandled option --{}", action.setting);
        }
        Outcome::Run(invocation) => {
            init_logging(&invocation.settings)?;
            if let Ok(profile) = std::env::var(profile_env_var(PROGRAM)) {
                info!(%profile, "profiling requested, not supported by the demo");
            }
            let subcommand = invocation.subcommand.as_deref().unwrap_or("search");
            let mut out = open_output(&invocation.settings)?;
            run(subcommand, &invocation.args, &invocation.settings, &mut out)?;
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match real_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{PROGRAM}: {e}");
            ExitCode::FAILURE
        }
    }
}
