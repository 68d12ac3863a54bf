//! Config file reading.
//!
//! Each path is read once, parsed into a flat `section -> key -> raw value`
//! table, and closed. The syntax is picked purely from the file name: a name
//! ending in `.toml` is parsed as TOML, anything else as INI (see
//! [`ini`](crate::ini)).
//!
//! Only the `config` section feeds settings. Other sections are parsed and
//! kept so applications can inspect them, but they carry no meaning here.
//!
//! In TOML, top-level tables are the sections. Scalars become text (so `true`
//! and `"yes"` coerce the same way) and arrays become native lists, which map
//! straight onto list settings without the comma convention.
//!
//! A path that does not exist is not an error: it is skipped. A file that
//! exists but cannot be read or parsed aborts loading, and none of its keys
//! are used.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ClisetError;
use crate::ini;
use crate::types::{ConfigSource, Source, Tier};
use crate::value::RawValue;

/// The section whose keys are settings.
pub const CONFIG_SECTION: &str = "config";

/// Config file syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Ini,
    Toml,
}

impl Syntax {
    /// Pick the syntax from the file name suffix.
    pub fn for_path(path: &Path) -> Self {
        let is_toml = path
            .file_name()
            .is_some_and(|name| name.to_string_lossy().ends_with(".toml"));
        if is_toml { Syntax::Toml } else { Syntax::Ini }
    }
}

/// A raw value with the line it was found on (0 when unknown).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub value: RawValue,
    pub line: usize,
}

/// One key from one source, before coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSourceValue {
    pub source: Source,
    pub section: String,
    pub key: String,
    pub value: RawValue,
    pub line: usize,
}

/// A parsed config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    path: PathBuf,
    tier: Tier,
    syntax: Syntax,
    sections: BTreeMap<String, BTreeMap<String, FileEntry>>,
}

impl ConfigFile {
    /// Parse already-read content. No I/O.
    pub fn parse(path: &Path, tier: Tier, content: &str) -> Result<Self, ClisetError> {
        let syntax = Syntax::for_path(path);
        let sections = match syntax {
            Syntax::Ini => parse_ini(content),
            Syntax::Toml => parse_toml(content),
        }
        .map_err(|message| ClisetError::Read {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            tier,
            syntax,
            sections,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn syntax(&self) -> Syntax {
        self.syntax
    }

    pub fn source(&self) -> Source {
        Source::File {
            path: self.path.clone(),
            tier: self.tier,
        }
    }

    pub fn section_names(&self) -> impl Iterator<Item = &str> {
        self.sections.keys().map(String::as_str)
    }

    pub fn section(&self, name: &str) -> Option<&BTreeMap<String, FileEntry>> {
        self.sections.get(name)
    }

    /// Every key of every section.
    pub fn raw_values(&self) -> impl Iterator<Item = RawSourceValue> + '_ {
        self.sections.iter().flat_map(move |(section, entries)| {
            entries.iter().map(move |(key, entry)| RawSourceValue {
                source: self.source(),
                section: section.clone(),
                key: key.clone(),
                value: entry.value.clone(),
                line: entry.line,
            })
        })
    }

    /// The keys of the `config` section only.
    pub fn config_values(&self) -> impl Iterator<Item = RawSourceValue> + '_ {
        self.raw_values()
            .filter(|raw| raw.section == CONFIG_SECTION)
    }
}

fn parse_ini(content: &str) -> Result<BTreeMap<String, BTreeMap<String, FileEntry>>, String> {
    let doc = ini::parse(content)?;
    Ok(doc
        .into_iter()
        .map(|(section, entries)| {
            let entries = entries
                .into_iter()
                .map(|(key, entry)| {
                    (
                        key,
                        FileEntry {
                            value: RawValue::Text(entry.value),
                            line: entry.line,
                        },
                    )
                })
                .collect();
            (section, entries)
        })
        .collect())
}

fn parse_toml(content: &str) -> Result<BTreeMap<String, BTreeMap<String, FileEntry>>, String> {
    let table: toml::Table = content.parse().map_err(|e: toml::de::Error| e.to_string())?;

    let mut sections = BTreeMap::new();
    for (name, value) in table {
        let toml::Value::Table(entries) = value else {
            return Err(format!("top-level key '{name}' is not a section"));
        };
        let mut converted = BTreeMap::new();
        for (key, value) in entries {
            let raw = toml_to_raw(&name, &key, value)?;
            let line = find_key_line(content, &name, &key);
            converted.insert(key, FileEntry { value: raw, line });
        }
        sections.insert(name, converted);
    }
    Ok(sections)
}

fn toml_to_raw(section: &str, key: &str, value: toml::Value) -> Result<RawValue, String> {
    match value {
        toml::Value::Array(items) => items
            .into_iter()
            .map(|item| {
                scalar_text(item)
                    .ok_or_else(|| format!("'{section}.{key}' must be a list of plain values"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(RawValue::List),
        toml::Value::Table(_) if section == CONFIG_SECTION => {
            Err(format!("'{section}.{key}' is a table, expected a value"))
        }
        table @ toml::Value::Table(_) => Ok(RawValue::Text(table.to_string())),
        scalar => scalar_text(scalar)
            .map(RawValue::Text)
            .ok_or_else(|| format!("'{section}.{key}' has an unsupported value")),
    }
}

fn scalar_text(value: toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

/// Best-effort 1-based line of `key` inside `[section]` of TOML text.
///
/// Tracks `[section]` headers while scanning and matches bare `key =`
/// assignments. Quoted keys and dotted keys are not handled. Returns 0 when
/// the key cannot be located.
fn find_key_line(content: &str, section: &str, key: &str) -> usize {
    let mut current = String::new();
    for (i, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && !trimmed.starts_with("[[") {
            current = trimmed
                .trim_start_matches('[')
                .trim_end_matches(']')
                .trim()
                .to_string();
            continue;
        }
        if current == section
            && let Some(after_key) = trimmed.strip_prefix(key)
            && after_key.trim_start().starts_with('=')
        {
            return i + 1;
        }
    }
    0
}

/// Read and parse one file. `Ok(None)` when it does not exist.
pub fn read(path: &Path, tier: Tier) -> Result<Option<ConfigFile>, ClisetError> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            debug!(path = %path.display(), %tier, "reading config file");
            ConfigFile::parse(path, tier, &content).map(Some)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            Ok(None)
        }
        Err(e) => Err(ClisetError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Read every file of a [`ConfigSource`] in precedence order, skipping
/// missing ones.
pub fn load_config_files(source: &ConfigSource) -> Result<Vec<ConfigFile>, ClisetError> {
    let mut files = Vec::new();
    for (path, tier) in source.paths() {
        if let Some(file) = read(path, tier)? {
            files.push(file);
        }
    }
    Ok(files)
}

/// Read files named explicitly (e.g. with `--config`). These must exist.
pub fn load_explicit_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<ConfigFile>, ClisetError> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            read(path, Tier::User)?.ok_or_else(|| ClisetError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        })
        .collect()
}
