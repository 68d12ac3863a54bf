//! Core resolution pipeline: merge every layer into typed settings.
//!
//! Operates on pre-loaded data (`ResolveInput`) with no I/O, making the full
//! pipeline testable with synthetic inputs. Steps:
//!
//! 1. Start from each setting's default
//! 2. Apply config files in order (global before user, later overrides earlier)
//! 3. Apply environment variables on top (when a prefix is set)
//! 4. Apply command-line assignments on top (highest priority)

use crate::env;
use crate::error::ClisetError;
use crate::file::ConfigFile;
use crate::merge::Merger;
use crate::parser::ParsedArgs;
use crate::registry::Registry;
use crate::resolved::ResolvedSettings;

/// All pre-loaded data needed to resolve settings. No I/O happens here.
#[derive(Debug, Clone, Default)]
pub struct ResolveInput {
    /// Parsed files in precedence order: first = lowest priority, last = highest.
    pub files: Vec<ConfigFile>,
    /// Raw environment variable pairs (pass `std::env::vars().collect()` or synthetic data).
    pub env_vars: Vec<(String, String)>,
    /// Env var prefix (e.g. `"MYAPP"`). `None` means env disabled.
    pub env_prefix: Option<String>,
    /// The parsed command line.
    pub args: ParsedArgs,
    /// Whether to reject unknown keys in `[config]`.
    pub strict: bool,
}

/// Resolve settings from pre-loaded inputs.
///
/// Any error aborts the whole resolution; nothing is partially returned.
pub fn resolve(registry: &Registry, input: ResolveInput) -> Result<ResolvedSettings, ClisetError> {
    let mut merger = Merger::new(registry, input.strict);

    for file in &input.files {
        merger.apply_file(file)?;
    }

    if let Some(prefix) = &input.env_prefix {
        merger.apply_env(env::env_values(prefix, registry, input.env_vars))?;
    }

    merger.apply_args(&input.args)?;

    Ok(merger.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::test_registry;
    use crate::parser;
    use crate::types::{Source, Tier};
    use std::path::Path;

    fn file(path: &str, tier: Tier, content: &str) -> ConfigFile {
        ConfigFile::parse(Path::new(path), tier, content).unwrap()
    }

    fn args(tokens: &[&str]) -> ParsedArgs {
        parser::parse(&test_registry(), tokens.iter().copied()).unwrap()
    }

    fn env(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_input(tokens: &[&str]) -> ResolveInput {
        ResolveInput {
            files: vec![
                file("/etc/app.conf", Tier::Global, "[config]\noutput = global\n"),
                file("/home/u/.app.conf", Tier::User, "[config]\noutput = user\n"),
            ],
            args: args(tokens),
            ..ResolveInput::default()
        }
    }

    #[test]
    fn defaults_only() {
        let settings = resolve(&test_registry(), ResolveInput::default()).unwrap();
        assert_eq!(settings.string("output").unwrap(), "");
        assert_eq!(settings.integer("jobs").unwrap(), 1);
    }

    #[test]
    fn precedence_chain() {
        let registry = test_registry();

        let settings = resolve(&registry, full_input(&["--output=cli"])).unwrap();
        assert_eq!(settings.string("output").unwrap(), "cli");

        let settings = resolve(&registry, full_input(&[])).unwrap();
        assert_eq!(settings.string("output").unwrap(), "user");

        let mut input = full_input(&[]);
        input.files.pop();
        let settings = resolve(&registry, input).unwrap();
        assert_eq!(settings.string("output").unwrap(), "global");

        let mut input = full_input(&[]);
        input.files.clear();
        let settings = resolve(&registry, input).unwrap();
        assert_eq!(settings.string("output").unwrap(), "");
    }

    #[test]
    fn env_between_files_and_cli() {
        let registry = test_registry();
        let mut input = full_input(&[]);
        input.env_prefix = Some("APP".into());
        input.env_vars = env(&[("APP__OUTPUT", "env")]);
        let settings = resolve(&registry, input).unwrap();
        assert_eq!(settings.string("output").unwrap(), "env");
        assert_eq!(
            settings.source("output"),
            Some(&Source::Env("APP__OUTPUT".into()))
        );

        let mut input = full_input(&["-o", "cli"]);
        input.env_prefix = Some("APP".into());
        input.env_vars = env(&[("APP__OUTPUT", "env")]);
        let settings = resolve(&registry, input).unwrap();
        assert_eq!(settings.string("output").unwrap(), "cli");
    }

    #[test]
    fn env_ignored_without_prefix() {
        let mut input = full_input(&[]);
        input.env_vars = env(&[("APP__OUTPUT", "env")]);
        let settings = resolve(&test_registry(), input).unwrap();
        assert_eq!(settings.string("output").unwrap(), "user");
    }

    #[test]
    fn broken_value_aborts_resolution() {
        let mut input = full_input(&[]);
        input
            .files
            .push(file("/home/u/more.conf", Tier::User, "[config]\njobs = lots\n"));
        assert!(matches!(
            resolve(&test_registry(), input),
            Err(ClisetError::Coercion { .. })
        ));
    }

    #[test]
    fn strict_mode_rejects_unknown_keys() {
        let mut input = full_input(&[]);
        input.strict = true;
        input
            .files
            .push(file("/home/u/more.conf", Tier::User, "[config]\ntypo = 1\n"));
        assert!(matches!(
            resolve(&test_registry(), input),
            Err(ClisetError::UnknownKeys(_))
        ));
    }

    #[test]
    fn idempotent() {
        let registry = test_registry();
        let first = resolve(&registry, full_input(&["-v", "--pattern=a"])).unwrap();
        let second = resolve(&registry, full_input(&["-v", "--pattern=a"])).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.dump_config(), second.dump_config());
    }
}
