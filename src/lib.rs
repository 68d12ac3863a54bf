//! Settings for command-line programs, resolved from defaults, config files,
//! the environment and the command line through one registry.
//!
//! Cliset lets a program declare its settings once. The same definitions
//! drive the config file reader, the GNU-style option parser, `--help`,
//! `--dump-config` and the manual page, and every value ends up typed and
//! tagged with the source that set it.
//!
//! ```ignore
//! let app = Cliset::builder("grepper")
//!     .version("1.0")
//!     .setting(Setting::boolean("verbose", "print more").alias('v'))
//!     .setting(Setting::string_list("pattern", "pattern to search for").alias('e'))
//!     .config_source(ConfigSource::new().global("/etc/grepper.conf").user(home_conf))
//!     .build()?;
//!
//! match app.resolve(std::env::args().skip(1))? {
//!     Outcome::Run(invocation) => run(invocation.settings, invocation.args),
//!     Outcome::Exit(result) => print!("{result}"),
//!     Outcome::Immediate { action, .. } => handle(action),
//! }
//! ```
//!
//! # Settings
//!
//! A [`Setting`] has a name (lowercase letters, digits and dashes), a
//! [`SettingKind`], a default, optional single-character aliases, help text
//! and an optional help group. The kinds are a closed set:
//!
//! | Kind | Config file text | Command line |
//! |------|------------------|--------------|
//! | `String` | any text | `--name=VALUE` |
//! | `Boolean` | `yes`, `on`, `true`, `1` are on; anything else is off | `--name`, `--no-name` |
//! | `Integer` | decimal, may be negative | `--name=N` |
//! | `Bytesize` | `512`, `10k`, `1.5MiB`, ... | `--name=SIZE` |
//! | `StringList` | comma-separated, `"..."` protects commas | repeat `--name=VALUE` |
//! | `Choice` | one of the listed values | `--name=VALUE` |
//!
//! Booleans never fail to coerce. Every other malformed value is a
//! [`ClisetError::Coercion`] naming the setting, the value and where it came
//! from; nothing falls back to the default silently.
//!
//! # Layer precedence
//!
//! ```text
//! Defaults              Setting::default_value
//!        ↑ overridden by
//! Global config files   ConfigSource::global, in order added
//!        ↑ overridden by
//! User config files     ConfigSource::user, then --config FILE
//!        ↑ overridden by
//! Environment vars      PREFIX__NAME (opt-in with env_prefix)
//!        ↑ overridden by
//! Command line          left to right, last occurrence wins
//! ```
//!
//! Every layer is sparse: a file only needs the keys it changes. On the
//! command line a list option replaces the list from lower layers with its
//! first occurrence, and each further occurrence adds one item.
//!
//! # Config files
//!
//! Only the `[config]` section holds settings. Other sections are parsed and
//! kept, and mean nothing to cliset. Files whose name ends in `.toml` are
//! TOML (native arrays map onto list settings); everything else is INI:
//!
//! ```text
//! [config]
//! verbose = yes
//! pattern = foo, bar, "hello, world"
//! log-level: debug
//! ```
//!
//! A missing file is skipped. A file that exists but does not parse, or that
//! holds a bad value, aborts resolution and contributes nothing. Unknown keys
//! in `[config]` are ignored with a warning, or reported with their line
//! number in [`strict`](ClisetBuilder::strict) mode.
//!
//! Cliset does not discover files itself; the program lists them in a
//! [`ConfigSource`], global files first, each group in ascending order.
//!
//! # Command line
//!
//! GNU conventions: `--name`, `--name=value`, `--name value`, `-x`, `-xvalue`,
//! bundles such as `-vq`, unambiguous long-option prefixes, and `--` to end
//! options. Options and positional arguments may be interleaved.
//!
//! Immediate options such as `--help` and `--dump-config` act as soon as they
//! are seen and the rest of the line is not parsed, so they belong last.
//!
//! # Subcommands
//!
//! Registering any [`Subcommand`] makes the first positional argument select
//! one, and adds `help` (`prog help search` shows the help for `search`).
//! Settings are global: every subcommand sees the same values.
//!
//! # Standard settings
//!
//! Unless turned off with
//! [`standard_settings(false)`](ClisetBuilder::standard_settings), every
//! program gets `--help`, `--version` (when a version is set), `--output`,
//! `--generate-manpage`, `--config`, `--no-default-configs`, `--dump-config`,
//! `--dump-setting-names`, `--log` and `--log-level`.
//!
//! # Logging
//!
//! Cliset reports what it reads and skips through [`tracing`] at `debug`
//! level, and ignored unknown keys at `warn`. It never installs a
//! subscriber.
//!
//! # Clap adapter
//!
//! With the `clap` feature (on by default),
//! [`Cliset::to_clap_command()`] describes the program as a `clap::Command`
//! for clap-based tooling.
//!
//! # Error handling
//!
//! All fallible operations return [`ClisetError`]. Errors carry the file
//! path and line, the offending token, or the setting name, so they can be
//! shown to users as they are. Enable the `rich-errors` feature for
//! `miette` diagnostics.

pub mod error;
pub mod types;
pub mod value;

mod builder;
#[cfg(feature = "clap")]
mod cli;
mod dispatch;
mod env;
mod file;
mod help;
mod ini;
mod manpage;
mod merge;
mod ops;
mod parser;
mod registry;
mod resolve;
mod resolved;
mod setting;
pub mod standard;

#[cfg(test)]
mod fixtures;

pub use builder::{Cliset, ClisetBuilder, Invocation, Outcome};
pub use dispatch::{Dispatch, Subcommand, Subcommands, dispatch};
pub use env::profile_env_var;
pub use error::{ClisetError, ParseError};
pub use file::{ConfigFile, FileEntry, RawSourceValue, Syntax};
pub use ops::ActionResult;
pub use parser::{Assignment, CliValue, ImmediateAction, ParsedArgs};
pub use registry::Registry;
pub use resolve::{ResolveInput, resolve};
pub use resolved::{ConfigEntry, ResolvedSetting, ResolvedSettings};
pub use setting::{FlagEffect, LongFlag, Setting};
pub use types::{ConfigSource, Source, Tier};
pub use value::{RawValue, SettingKind, Value};
