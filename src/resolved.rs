//! The result of resolution: every setting's final value and where it came from.

use std::collections::HashMap;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ClisetError;
use crate::file::CONFIG_SECTION;
use crate::types::Source;
use crate::value::{self, Value};

/// One resolved setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSetting {
    name: String,
    value: Value,
    source: Source,
}

impl ResolvedSetting {
    pub(crate) fn new(name: &str, value: Value, source: Source) -> Self {
        Self {
            name: name.to_string(),
            value,
            source,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The source that set the value last.
    pub fn source(&self) -> &Source {
        &self.source
    }
}

/// One `key = value` line of a configuration dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub section: String,
    pub key: String,
    /// The value in the INI text form that reads back to the same value.
    pub value: String,
    pub source: Source,
}

/// Final setting values in registration order, with provenance.
///
/// Read-only once built. Immediate options are not settings and never
/// appear here. Serializes as a map of setting name to value:
///
/// ```ignore
/// let json = serde_json::to_string(&settings)?;
/// // {"verbose":true,"output":"","pattern":["a","b"],...}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSettings {
    entries: Vec<ResolvedSetting>,
    index: HashMap<String, usize>,
}

impl ResolvedSettings {
    pub(crate) fn from_entries(entries: Vec<ResolvedSetting>) -> Self {
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        Self { entries, index }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entry(name).map(ResolvedSetting::value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedSetting> {
        self.entries.iter()
    }

    pub fn source(&self, name: &str) -> Option<&Source> {
        self.entry(name).map(ResolvedSetting::source)
    }

    /// Like [`get`](Self::get), but an unknown name is an error.
    pub fn value(&self, name: &str) -> Result<&Value, ClisetError> {
        self.get(name)
            .ok_or_else(|| ClisetError::UnknownSetting(name.to_string()))
    }

    /// Value of a string or choice setting.
    pub fn string(&self, name: &str) -> Result<&str, ClisetError> {
        match self.value(name)? {
            Value::String(s) => Ok(s),
            _ => Err(mismatch(name, "a string")),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool, ClisetError> {
        match self.value(name)? {
            Value::Boolean(b) => Ok(*b),
            _ => Err(mismatch(name, "a boolean")),
        }
    }

    /// Value of an integer or bytesize setting.
    pub fn integer(&self, name: &str) -> Result<i64, ClisetError> {
        match self.value(name)? {
            Value::Integer(i) => Ok(*i),
            _ => Err(mismatch(name, "an integer")),
        }
    }

    pub fn string_list(&self, name: &str) -> Result<&[String], ClisetError> {
        match self.value(name)? {
            Value::StringList(items) => Ok(items),
            _ => Err(mismatch(name, "a list of strings")),
        }
    }

    /// Fail with [`ClisetError::MissingRequired`] unless `name` has a value.
    ///
    /// A string must be non-empty and a list must have at least one item.
    /// Booleans, integers and choices always have a value, so they pass.
    pub fn require(&self, name: &str) -> Result<(), ClisetError> {
        let missing = match self.value(name)? {
            Value::String(s) => s.is_empty(),
            Value::StringList(items) => items.is_empty(),
            Value::Boolean(_) | Value::Integer(_) => false,
        };
        if missing {
            return Err(ClisetError::MissingRequired(name.to_string()));
        }
        Ok(())
    }

    /// Every setting as a `[config]` entry, in registration order.
    pub fn dump_config(&self) -> Vec<ConfigEntry> {
        self.entries
            .iter()
            .map(|e| ConfigEntry {
                section: CONFIG_SECTION.to_string(),
                key: e.name.clone(),
                value: value::format_value(&e.value),
                source: e.source.clone(),
            })
            .collect()
    }

    fn entry(&self, name: &str) -> Option<&ResolvedSetting> {
        self.index.get(name).map(|&i| &self.entries[i])
    }
}

fn mismatch(name: &str, expected: &'static str) -> ClisetError {
    ClisetError::TypeMismatch {
        setting: name.to_string(),
        expected,
    }
}

impl Serialize for ResolvedSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.value)?;
        }
        map.end()
    }
}
