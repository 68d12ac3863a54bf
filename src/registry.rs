//! The registry of setting definitions and the flag tables derived from them.
//!
//! Registration validates names, aliases and defaults up front, so the parser
//! and the merge can assume a consistent table.

use std::collections::{BTreeMap, HashMap};

use crate::error::ClisetError;
use crate::setting::{self, FlagEffect, Setting};

/// Ordered set of setting definitions, looked up by name, long flag or alias.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    settings: Vec<Setting>,
    by_name: HashMap<String, usize>,
    long_flags: BTreeMap<String, (usize, FlagEffect)>,
    short_flags: HashMap<char, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition. Fails on an invalid name, a default that does not fit
    /// the kind, an alias that is not an ASCII letter or digit, or any name,
    /// derived flag or alias already taken.
    pub fn register(&mut self, setting: Setting) -> Result<(), ClisetError> {
        if !setting::is_valid_name(setting.name()) {
            return Err(ClisetError::InvalidName(setting.name().to_string()));
        }
        setting
            .kind()
            .check(setting.default())
            .map_err(|reason| ClisetError::InvalidDefault {
                setting: setting.name().to_string(),
                reason,
            })?;

        let flags = setting.long_flags();
        for flag in &flags {
            if self.long_flags.contains_key(&flag.name) {
                return Err(ClisetError::DuplicateName(flag.name.clone()));
            }
        }
        for (i, alias) in setting.aliases().iter().enumerate() {
            if !alias.is_ascii_alphanumeric() {
                return Err(ClisetError::InvalidName(format!("-{alias}")));
            }
            if self.short_flags.contains_key(alias) || setting.aliases()[..i].contains(alias) {
                return Err(ClisetError::DuplicateName(format!("-{alias}")));
            }
        }

        let index = self.settings.len();
        for flag in flags {
            self.long_flags.insert(flag.name, (index, flag.effect));
        }
        for alias in setting.aliases() {
            self.short_flags.insert(*alias, index);
        }
        self.by_name.insert(setting.name().to_string(), index);
        self.settings.push(setting);
        Ok(())
    }

    pub fn register_all(
        &mut self,
        settings: impl IntoIterator<Item = Setting>,
    ) -> Result<(), ClisetError> {
        settings.into_iter().try_for_each(|s| self.register(s))
    }

    pub fn get(&self, name: &str) -> Option<&Setting> {
        self.index_of(name).map(|i| &self.settings[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn at(&self, index: usize) -> &Setting {
        &self.settings[index]
    }

    /// Definitions in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Setting> {
        self.settings.iter()
    }

    pub fn len(&self) -> usize {
        self.settings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }

    /// Exact long-flag lookup (without the leading `--`).
    pub fn long_flag(&self, name: &str) -> Option<(usize, FlagEffect)> {
        self.long_flags.get(name).copied()
    }

    /// All long flags starting with `prefix`, in sorted order.
    pub fn long_flags_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, usize, FlagEffect)> + 'a {
        self.long_flags
            .range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
            .take_while(move |(name, _)| name.starts_with(prefix))
            .map(|(name, (index, effect))| (name.as_str(), *index, *effect))
    }

    pub fn short_flag(&self, alias: char) -> Option<usize> {
        self.short_flags.get(&alias).copied()
    }
}
