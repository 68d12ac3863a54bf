//! Layered merge of raw values into typed settings.
//!
//! Layers are applied lowest precedence first; a later layer replaces the
//! value of every key it sets. Each layer is coerced in full before any of
//! its values is committed, so a file with one bad value contributes nothing.

use tracing::{debug, warn};

use crate::error::ClisetError;
use crate::file::{ConfigFile, Syntax};
use crate::parser::{CliValue, ParsedArgs};
use crate::registry::Registry;
use crate::resolved::{ResolvedSetting, ResolvedSettings};
use crate::types::Source;
use crate::value::{self, RawValue, SettingKind, Value};

/// Accumulates values per setting while the layers are applied.
pub struct Merger<'r> {
    registry: &'r Registry,
    strict: bool,
    values: Vec<(Value, Source)>,
}

impl<'r> Merger<'r> {
    /// Start from every setting's default.
    pub fn new(registry: &'r Registry, strict: bool) -> Self {
        let values = registry
            .iter()
            .map(|s| (s.default().clone(), Source::Default))
            .collect();
        Self {
            registry,
            strict,
            values,
        }
    }

    /// Apply the `[config]` section of one file.
    ///
    /// Keys that are not settings are ignored with a warning, or rejected
    /// together as [`ClisetError::UnknownKeys`] in strict mode. Immediate
    /// options are not settings.
    pub fn apply_file(&mut self, file: &ConfigFile) -> Result<(), ClisetError> {
        debug!(path = %file.path().display(), tier = %file.tier(), "merging config file");
        let mut staged = Vec::new();
        let mut unknown = Vec::new();

        for raw in file.config_values() {
            let index = match self.registry.index_of(&raw.key) {
                Some(index) if !self.registry.at(index).is_immediate() => index,
                _ if self.strict => {
                    unknown.push(ClisetError::UnknownKey {
                        key: raw.key,
                        path: file.path().to_path_buf(),
                        line: raw.line,
                    });
                    continue;
                }
                _ => {
                    warn!(
                        key = %raw.key,
                        path = %file.path().display(),
                        line = raw.line,
                        "ignoring unknown key in config file"
                    );
                    continue;
                }
            };

            let setting = self.registry.at(index);
            let coerced = match (file.syntax(), setting.kind(), &raw.value) {
                // A TOML scalar given to a list is a one-item list.
                (Syntax::Toml, SettingKind::StringList, RawValue::Text(text)) => {
                    Ok(Value::StringList(vec![text.clone()]))
                }
                (_, kind, raw_value) => value::coerce(kind, raw_value),
            };
            let coerced = coerced.map_err(|reason| ClisetError::Coercion {
                setting: setting.name().to_string(),
                value: raw.value.to_string(),
                reason,
                origin: raw.source.clone(),
            })?;
            staged.push((index, coerced, raw.source));
        }

        if !unknown.is_empty() {
            return Err(ClisetError::UnknownKeys(unknown));
        }
        self.commit(staged);
        Ok(())
    }

    /// Apply environment values (see [`env_values`](crate::env::env_values)).
    pub fn apply_env(
        &mut self,
        entries: Vec<(usize, RawValue, Source)>,
    ) -> Result<(), ClisetError> {
        if entries.is_empty() {
            return Ok(());
        }
        debug!(count = entries.len(), "merging environment");
        let mut staged = Vec::with_capacity(entries.len());
        for (index, raw, source) in entries {
            let setting = self.registry.at(index);
            let coerced =
                value::coerce(setting.kind(), &raw).map_err(|reason| ClisetError::Coercion {
                    setting: setting.name().to_string(),
                    value: raw.to_string(),
                    reason,
                    origin: source.clone(),
                })?;
            staged.push((index, coerced, source));
        }
        self.commit(staged);
        Ok(())
    }

    /// Apply command-line assignments in token order.
    ///
    /// The first occurrence of a list option replaces the lower layers' list;
    /// each further occurrence appends one item, commas included.
    pub fn apply_args(&mut self, args: &ParsedArgs) -> Result<(), ClisetError> {
        if args.assignments.is_empty() {
            return Ok(());
        }
        debug!(count = args.assignments.len(), "merging command line");
        let mut staged: Vec<(usize, Value)> = Vec::new();

        for assignment in &args.assignments {
            let Some(index) = self.registry.index_of(&assignment.setting) else {
                return Err(ClisetError::UnknownSetting(assignment.setting.clone()));
            };
            let setting = self.registry.at(index);

            let coerced = match (&assignment.value, setting.kind()) {
                (CliValue::Enable, _) => Value::Boolean(true),
                (CliValue::Disable, _) => Value::Boolean(false),
                (CliValue::Text(text), SettingKind::StringList) => {
                    let previous = staged.iter_mut().rev().find(|(i, _)| *i == index);
                    if let Some((_, Value::StringList(items))) = previous {
                        items.push(text.clone());
                        continue;
                    }
                    Value::StringList(vec![text.clone()])
                }
                (CliValue::Text(text), kind) => {
                    value::coerce_text(kind, text).map_err(|reason| ClisetError::Coercion {
                        setting: setting.name().to_string(),
                        value: text.clone(),
                        reason,
                        origin: Source::CommandLine,
                    })?
                }
            };
            staged.push((index, coerced));
        }

        self.commit(
            staged
                .into_iter()
                .map(|(index, value)| (index, value, Source::CommandLine))
                .collect(),
        );
        Ok(())
    }

    fn commit(&mut self, staged: Vec<(usize, Value, Source)>) {
        for (index, value, source) in staged {
            self.values[index] = (value, source);
        }
    }

    /// Final values in registration order, immediate options left out.
    pub fn finish(self) -> ResolvedSettings {
        let entries = self
            .registry
            .iter()
            .zip(self.values)
            .filter(|(setting, _)| !setting.is_immediate())
            .map(|(setting, (value, source))| ResolvedSetting::new(setting.name(), value, source))
            .collect();
        ResolvedSettings::from_entries(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::test_registry;
    use crate::parser;
    use crate::types::Tier;
    use std::path::Path;

    fn ini(path: &str, tier: Tier, content: &str) -> ConfigFile {
        ConfigFile::parse(Path::new(path), tier, content).unwrap()
    }

    fn args(tokens: &[&str]) -> ParsedArgs {
        parser::parse(&test_registry(), tokens.iter().copied()).unwrap()
    }

    #[test]
    fn defaults_only() {
        let registry = test_registry();
        let settings = Merger::new(&registry, false).finish();
        assert!(!settings.boolean("verbose").unwrap());
        assert!(settings.boolean("color").unwrap());
        assert_eq!(settings.integer("jobs").unwrap(), 1);
        assert_eq!(settings.string("mode").unwrap(), "fast");
        assert_eq!(settings.source("jobs"), Some(&Source::Default));
    }

    #[test]
    fn immediate_options_are_not_settings() {
        let registry = test_registry();
        let settings = Merger::new(&registry, false).finish();
        assert!(!settings.contains("help"));
        assert!(!settings.contains("dump-config"));
        assert!(!settings.contains("generate-manpage"));
    }

    #[test]
    fn later_file_overrides_earlier() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        merger
            .apply_file(&ini("g.conf", Tier::Global, "[config]\njobs = 2\noutput = g\n"))
            .unwrap();
        merger
            .apply_file(&ini("u.conf", Tier::User, "[config]\njobs = 3\n"))
            .unwrap();
        let settings = merger.finish();
        assert_eq!(settings.integer("jobs").unwrap(), 3);
        assert_eq!(settings.string("output").unwrap(), "g");
        assert_eq!(settings.source("jobs").unwrap().tier(), Tier::User);
        assert_eq!(settings.source("output").unwrap().tier(), Tier::Global);
    }

    #[test]
    fn ini_list_splits_on_commas() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        merger
            .apply_file(&ini(
                "a.conf",
                Tier::User,
                "[config]\npattern = foo, bar, foobar, \"hello, world\"\n",
            ))
            .unwrap();
        assert_eq!(
            merger.finish().string_list("pattern").unwrap(),
            &["foo", "bar", "foobar", "hello, world"]
        );
    }

    #[test]
    fn toml_scalar_for_list_is_one_item() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        merger
            .apply_file(&ini("a.toml", Tier::User, "[config]\npattern = \"a,b\"\n"))
            .unwrap();
        assert_eq!(merger.finish().string_list("pattern").unwrap(), &["a,b"]);
    }

    #[test]
    fn toml_list_for_scalar_is_coercion_error() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        let err = merger
            .apply_file(&ini("a.toml", Tier::User, "[config]\noutput = [\"x\"]\n"))
            .unwrap_err();
        assert!(matches!(err, ClisetError::Coercion { setting, .. } if setting == "output"));
    }

    #[test]
    fn coercion_error_commits_nothing() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        let err = merger
            .apply_file(&ini(
                "bad.conf",
                Tier::User,
                "[config]\noutput = partial\njobs = many\n",
            ))
            .unwrap_err();
        match err {
            ClisetError::Coercion {
                setting,
                value,
                origin,
                ..
            } => {
                assert_eq!(setting, "jobs");
                assert_eq!(value, "many");
                assert_eq!(origin.to_string(), "bad.conf");
            }
            other => panic!("Expected Coercion, got {other:?}"),
        }
        assert_eq!(merger.finish().string("output").unwrap(), "");
    }

    #[test]
    fn unknown_keys_lenient_are_ignored() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        merger
            .apply_file(&ini("a.conf", Tier::User, "[config]\ntypo = 1\njobs = 5\nhelp = yes\n"))
            .unwrap();
        let settings = merger.finish();
        assert_eq!(settings.integer("jobs").unwrap(), 5);
        assert!(!settings.contains("typo"));
    }

    #[test]
    fn unknown_keys_strict_are_collected() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, true);
        let err = merger
            .apply_file(&ini(
                "a.conf",
                Tier::User,
                "[config]\ntypo = 1\njobs = 5\nother = 2\n",
            ))
            .unwrap_err();
        let ClisetError::UnknownKeys(errors) = err else {
            panic!("Expected UnknownKeys");
        };
        assert_eq!(errors.len(), 2);
        assert!(matches!(
            &errors[1],
            ClisetError::UnknownKey { key, line: 2, .. } if key == "typo"
        ));
        assert_eq!(merger.finish().integer("jobs").unwrap(), 1);
    }

    #[test]
    fn other_sections_never_validated() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, true);
        merger
            .apply_file(&ini("a.conf", Tier::User, "[plugin]\nanything = 1\n"))
            .unwrap();
    }

    #[test]
    fn env_layer() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        merger
            .apply_env(vec![(
                4,
                RawValue::Text("8".into()),
                Source::Env("APP__JOBS".into()),
            )])
            .unwrap();
        let settings = merger.finish();
        assert_eq!(settings.integer("jobs").unwrap(), 8);
        assert_eq!(settings.source("jobs").unwrap().tier(), Tier::Environment);
    }

    #[test]
    fn env_coercion_error_names_variable() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        let err = merger
            .apply_env(vec![(
                4,
                RawValue::Text("x".into()),
                Source::Env("APP__JOBS".into()),
            )])
            .unwrap_err();
        assert!(err.to_string().contains("APP__JOBS"));
    }

    #[test]
    fn cli_list_replaces_then_appends() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        merger
            .apply_file(&ini("a.conf", Tier::User, "[config]\npattern = x, y\n"))
            .unwrap();
        merger
            .apply_args(&args(&["--pattern=a", "--pattern=b,c", "-e", "d"]))
            .unwrap();
        assert_eq!(
            merger.finish().string_list("pattern").unwrap(),
            &["a", "b,c", "d"]
        );
    }

    #[test]
    fn cli_negation_beats_file() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        merger
            .apply_file(&ini("a.conf", Tier::User, "[config]\nverbose = true\n"))
            .unwrap();
        merger.apply_args(&args(&["--no-verbose"])).unwrap();
        let settings = merger.finish();
        assert!(!settings.boolean("verbose").unwrap());
        assert_eq!(settings.source("verbose"), Some(&Source::CommandLine));
    }

    #[test]
    fn cli_last_value_wins() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        merger
            .apply_args(&args(&["--jobs=2", "-j", "-3", "--mode", "slow"]))
            .unwrap();
        let settings = merger.finish();
        assert_eq!(settings.integer("jobs").unwrap(), -3);
        assert_eq!(settings.string("mode").unwrap(), "slow");
    }

    #[test]
    fn cli_bad_choice_is_coercion_error() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        let err = merger.apply_args(&args(&["--mode=medium"])).unwrap_err();
        assert!(matches!(
            err,
            ClisetError::Coercion { origin: Source::CommandLine, .. }
        ));
    }

    #[test]
    fn cli_bytesize() {
        let registry = test_registry();
        let mut merger = Merger::new(&registry, false);
        merger.apply_args(&args(&["--max-size=2KiB"])).unwrap();
        assert_eq!(merger.finish().integer("max-size").unwrap(), 2048);
    }
}
