use std::path::Path;

use tracing::debug;

use crate::dispatch::{self, Dispatch, Subcommand, Subcommands};
use crate::error::ClisetError;
use crate::file;
use crate::ops::{self, ActionResult};
use crate::parser::{self, ImmediateAction, ParsedArgs};
use crate::registry::Registry;
use crate::resolve::{self, ResolveInput};
use crate::resolved::ResolvedSettings;
use crate::setting::Setting;
use crate::standard;
use crate::types::ConfigSource;

/// A configured program: its settings, subcommands and config files.
///
/// Built once with [`Cliset::builder`]; every call to
/// [`resolve`](Self::resolve) is independent and leaves it unchanged.
#[derive(Debug, Clone)]
pub struct Cliset {
    program: String,
    version: Option<String>,
    description: Option<String>,
    registry: Registry,
    subcommands: Subcommands,
    config_source: ConfigSource,
    env_prefix: Option<String>,
    strict: bool,
}

/// What the program should do after resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Normal run with the resolved settings.
    Run(Invocation),
    /// A built-in immediate action produced output. Print it and exit.
    Exit(ActionResult),
    /// An application-defined immediate option was given.
    ///
    /// `settings` holds everything resolved from files, the environment and
    /// the options before it.
    Immediate {
        action: ImmediateAction,
        settings: ResolvedSettings,
    },
}

/// A normal run: settings plus the dispatched subcommand and its arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub settings: ResolvedSettings,
    /// `None` when the program has no subcommands.
    pub subcommand: Option<String>,
    pub args: Vec<String>,
}

impl Cliset {
    pub fn builder(program: &str) -> ClisetBuilder {
        ClisetBuilder::new(program)
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn subcommands(&self) -> &Subcommands {
        &self.subcommands
    }

    pub fn config_source(&self) -> &ConfigSource {
        &self.config_source
    }

    /// Parse command-line tokens (without the program name). No I/O.
    pub fn parse<I, S>(&self, args: I) -> Result<ParsedArgs, ClisetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(parser::parse(&self.registry, args)?)
    }

    /// Parse `args` (without the program name), read the config files and the
    /// process environment, and decide what to run.
    pub fn resolve<I, S>(&self, args: I) -> Result<Outcome, ClisetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.resolve_with_env(args, std::env::vars().collect())
    }

    /// Like [`resolve`](Self::resolve), with the environment given explicitly.
    pub fn resolve_with_env<I, S>(
        &self,
        args: I,
        env_vars: Vec<(String, String)>,
    ) -> Result<Outcome, ClisetError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args = self.parse(args)?;

        if let Some(action) = &args.immediate
            && let Some(result) = self.standalone_action(action)?
        {
            return Ok(Outcome::Exit(result));
        }

        let immediate = args.immediate.clone();
        let positionals = args.positionals.clone();
        let input = self.build_input(args, env_vars)?;
        let settings = resolve::resolve(&self.registry, input)?;

        if let Some(action) = immediate {
            if action.setting == standard::DUMP_CONFIG {
                return Ok(Outcome::Exit(ops::dump_config(&settings)));
            }
            return Ok(Outcome::Immediate { action, settings });
        }

        match dispatch::dispatch(positionals, &self.subcommands)? {
            Dispatch::Args(args) => Ok(Outcome::Run(Invocation {
                settings,
                subcommand: None,
                args,
            })),
            Dispatch::Run { subcommand, args } => Ok(Outcome::Run(Invocation {
                settings,
                subcommand: Some(subcommand),
                args,
            })),
            Dispatch::Help { subcommand: None } => Ok(Outcome::Exit(self.help())),
            Dispatch::Help {
                subcommand: Some(subcommand),
            } => Ok(Outcome::Exit(ops::subcommand_help(&self.program, &subcommand))),
        }
    }

    /// The `--help` text.
    pub fn usage(&self) -> String {
        self.help().to_string()
    }

    fn help(&self) -> ActionResult {
        ops::help(
            &self.program,
            self.description.as_deref(),
            &self.registry,
            &self.subcommands,
        )
    }

    /// Built-in immediate actions that need no settings.
    fn standalone_action(
        &self,
        action: &ImmediateAction,
    ) -> Result<Option<ActionResult>, ClisetError> {
        let result = match action.setting.as_str() {
            standard::HELP => self.help(),
            standard::VERSION => ActionResult::Version {
                program: self.program.clone(),
                version: self.version.clone().unwrap_or_default(),
            },
            standard::DUMP_SETTING_NAMES => ops::setting_names(&self.registry),
            standard::GENERATE_MANPAGE => {
                let template = action.value.as_deref().unwrap_or_default();
                ops::generate_manpage(
                    Path::new(template),
                    &self.program,
                    &self.registry,
                    &self.subcommands,
                )?
            }
            _ => return Ok(None),
        };
        debug!(option = %action.setting, "handled immediate option");
        Ok(Some(result))
    }

    /// Read the config files and bundle everything for the pure pipeline.
    ///
    /// `--no-default-configs` skips the [`ConfigSource`] files; files named
    /// with `--config` are read after them and must exist.
    fn build_input(
        &self,
        args: ParsedArgs,
        env_vars: Vec<(String, String)>,
    ) -> Result<ResolveInput, ClisetError> {
        let skip_defaults = self.registry.contains(standard::NO_DEFAULT_CONFIGS)
            && args.flag_for(standard::NO_DEFAULT_CONFIGS) == Some(true);

        let mut files = if skip_defaults {
            debug!("skipping default config files");
            Vec::new()
        } else {
            file::load_config_files(&self.config_source)?
        };

        if self.registry.contains(standard::CONFIG) {
            let explicit: Vec<&str> = args.texts_for(standard::CONFIG).collect();
            files.extend(file::load_explicit_files(&explicit)?);
        }

        Ok(ResolveInput {
            files,
            env_vars,
            env_prefix: self.env_prefix.clone(),
            args,
            strict: self.strict,
        })
    }
}

/// Builder for a [`Cliset`].
///
/// Settings and subcommands are validated in [`build`](Self::build), so the
/// chain itself never fails.
#[derive(Debug, Clone)]
pub struct ClisetBuilder {
    program: String,
    version: Option<String>,
    description: Option<String>,
    settings: Vec<Setting>,
    subcommands: Vec<Subcommand>,
    config_source: ConfigSource,
    env_prefix: Option<String>,
    strict: bool,
    standard_settings: bool,
}

impl ClisetBuilder {
    fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            version: None,
            description: None,
            settings: Vec::new(),
            subcommands: Vec::new(),
            config_source: ConfigSource::default(),
            env_prefix: None,
            strict: false,
            standard_settings: true,
        }
    }

    /// Program version. Adds `--version` to the standard settings.
    pub fn version(mut self, version: &str) -> Self {
        self.version = Some(version.to_string());
        self
    }

    /// One-paragraph description shown in `--help`.
    pub fn description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn setting(mut self, setting: Setting) -> Self {
        self.settings.push(setting);
        self
    }

    pub fn settings(mut self, settings: impl IntoIterator<Item = Setting>) -> Self {
        self.settings.extend(settings);
        self
    }

    pub fn subcommand(mut self, subcommand: Subcommand) -> Self {
        self.subcommands.push(subcommand);
        self
    }

    /// Config files to read, global ones first. Missing files are skipped.
    pub fn config_source(mut self, source: ConfigSource) -> Self {
        self.config_source = source;
        self
    }

    /// Read settings from `{PREFIX}__{NAME}` environment variables.
    ///
    /// Off unless a prefix is set. The environment ranks above config files
    /// and below the command line.
    pub fn env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_string());
        self
    }

    /// Reject unknown keys in the `[config]` section (default `false`, which
    /// ignores them with a warning).
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Register the standard settings: `--help`, `--version`, `--config`,
    /// `--dump-config` and friends (default `true`).
    pub fn standard_settings(mut self, enabled: bool) -> Self {
        self.standard_settings = enabled;
        self
    }

    /// Validate everything and build the [`Cliset`].
    pub fn build(self) -> Result<Cliset, ClisetError> {
        let mut registry = Registry::new();
        if self.standard_settings {
            registry.register_all(standard::standard_settings(self.version.is_some()))?;
        }
        registry.register_all(self.settings)?;

        let mut subcommands = Subcommands::new();
        for subcommand in self.subcommands {
            subcommands.add(subcommand)?;
        }

        Ok(Cliset {
            program: self.program,
            version: self.version,
            description: self.description,
            registry,
            subcommands,
            config_source: self.config_source,
            env_prefix: self.env_prefix,
            strict: self.strict,
        })
    }
}
