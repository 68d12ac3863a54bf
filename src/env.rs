use tracing::debug;

use crate::registry::Registry;
use crate::types::Source;
use crate::value::RawValue;

/// Collect setting values from environment variables matching `{PREFIX}__*`.
///
/// The part after the double underscore is lowercased and `_` becomes `-`, so
/// `MYAPP__LOG_LEVEL` sets `log-level`. Variables that do not name a
/// registered, non-immediate setting are ignored. A single underscore after
/// the prefix never matches, which keeps variables such as `MYAPP_PROFILE`
/// out of the settings.
///
/// Values are text and coerce like INI values (lists split on commas).
/// Results are ordered by variable name so the outcome does not depend on
/// the environment's iteration order.
///
/// Takes an iterator so tests can pass synthetic data instead of `std::env::vars()`.
pub fn env_values(
    prefix: &str,
    registry: &Registry,
    vars: impl IntoIterator<Item = (String, String)>,
) -> Vec<(usize, RawValue, Source)> {
    let needle = format!("{prefix}__");
    let mut matched: Vec<(String, usize, String)> = Vec::new();

    for (key, value) in vars {
        let Some(rest) = key.strip_prefix(&needle) else {
            continue;
        };
        if rest.is_empty() {
            continue;
        }
        let name = rest.to_lowercase().replace('_', "-");
        match registry.index_of(&name) {
            Some(index) if !registry.at(index).is_immediate() => {
                matched.push((key, index, value));
            }
            _ => debug!(var = %key, "environment variable does not name a setting"),
        }
    }

    matched.sort_by(|a, b| a.0.cmp(&b.0));
    matched
        .into_iter()
        .map(|(var, index, value)| (index, RawValue::Text(value), Source::Env(var)))
        .collect()
}

/// Name of the profiling variable for `program`: `<PROGRAM>_PROFILE`.
///
/// Uses the base name of `program` up to its first `.`, with every character
/// that is not an ASCII letter or digit replaced by `_`, uppercased.
pub fn profile_env_var(program: &str) -> String {
    let base = program.rsplit('/').next().unwrap_or(program);
    let base = base.split('.').next().unwrap_or(base);
    let name: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{name}_PROFILE")
}
