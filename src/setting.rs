//! Setting definitions and the command-line flags derived from them.

use crate::value::{SettingKind, Value};

/// A typed setting: name, kind, default, short aliases, help text and help group.
///
/// Built with the kind-specific constructors and the chained modifiers, then
/// handed to the registry, after which it is never changed.
///
/// ```ignore
/// let verbose = Setting::boolean("verbose", "print more").alias('v');
/// let jobs = Setting::integer("jobs", "parallel jobs").default_value(4_i64).metavar("N");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Setting {
    name: String,
    kind: SettingKind,
    default: Value,
    aliases: Vec<char>,
    help: String,
    group: Option<String>,
    metavar: Option<String>,
    immediate: bool,
}

impl Setting {
    pub fn new(name: &str, kind: SettingKind, help: &str) -> Self {
        Self {
            name: name.to_string(),
            default: kind.zero(),
            kind,
            aliases: Vec::new(),
            help: help.to_string(),
            group: None,
            metavar: None,
            immediate: false,
        }
    }

    pub fn string(name: &str, help: &str) -> Self {
        Self::new(name, SettingKind::String, help)
    }

    /// A boolean setting. Gets both `--name` and `--no-name` on the command line.
    pub fn boolean(name: &str, help: &str) -> Self {
        Self::new(name, SettingKind::Boolean, help)
    }

    pub fn integer(name: &str, help: &str) -> Self {
        Self::new(name, SettingKind::Integer, help)
    }

    pub fn bytesize(name: &str, help: &str) -> Self {
        Self::new(name, SettingKind::Bytesize, help)
    }

    /// A repeatable setting. Each occurrence on the command line adds one item.
    pub fn string_list(name: &str, help: &str) -> Self {
        Self::new(name, SettingKind::StringList, help)
    }

    /// A setting restricted to `choices`; defaults to the first one.
    pub fn choice<S: Into<String>>(
        name: &str,
        choices: impl IntoIterator<Item = S>,
        help: &str,
    ) -> Self {
        let choices = choices.into_iter().map(Into::into).collect();
        Self::new(name, SettingKind::Choice(choices), help)
    }

    /// Add a single-character short alias (`-v`).
    pub fn alias(mut self, short: char) -> Self {
        self.aliases.push(short);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    pub fn group(mut self, group: &str) -> Self {
        self.group = Some(group.to_string());
        self
    }

    /// Placeholder for the argument in help output (default depends on kind).
    pub fn metavar(mut self, metavar: &str) -> Self {
        self.metavar = Some(metavar.to_string());
        self
    }

    /// Mark as an immediate option: parsing stops as soon as it is seen.
    ///
    /// Immediate options are actions rather than settings. They have no
    /// `--no-` form and do not appear among the resolved settings.
    pub fn immediate(mut self) -> Self {
        self.immediate = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &SettingKind {
        &self.kind
    }

    pub fn default(&self) -> &Value {
        &self.default
    }

    pub fn aliases(&self) -> &[char] {
        &self.aliases
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn group_name(&self) -> Option<&str> {
        self.group.as_deref()
    }

    pub fn metavar_name(&self) -> &str {
        self.metavar
            .as_deref()
            .unwrap_or_else(|| self.kind.metavar())
    }

    pub fn is_immediate(&self) -> bool {
        self.immediate
    }

    /// The long flags this setting answers to.
    ///
    /// A boolean yields an [`Enable`](FlagEffect::Enable) flag and, unless it
    /// is immediate, a [`Disable`](FlagEffect::Disable) `no-` flag. Every
    /// other kind yields one value-taking flag.
    pub fn long_flags(&self) -> Vec<LongFlag> {
        match self.kind {
            SettingKind::Boolean if self.immediate => {
                vec![LongFlag::new(&self.name, FlagEffect::Enable)]
            }
            SettingKind::Boolean => vec![
                LongFlag::new(&self.name, FlagEffect::Enable),
                LongFlag::new(&format!("no-{}", self.name), FlagEffect::Disable),
            ],
            _ => vec![LongFlag::new(&self.name, FlagEffect::Assign)],
        }
    }
}

/// What seeing a flag does to its setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagEffect {
    /// Takes an argument and assigns (or, for lists, appends) it.
    Assign,
    /// Boolean on.
    Enable,
    /// Boolean off (`--no-name`).
    Disable,
}

/// A concrete long flag derived from a setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongFlag {
    pub name: String,
    pub effect: FlagEffect,
}

impl LongFlag {
    fn new(name: &str, effect: FlagEffect) -> Self {
        Self {
            name: name.to_string(),
            effect,
        }
    }
}

/// Whether `name` is a valid setting name: two or more characters of
/// lowercase ASCII letters, digits and dashes, starting with a letter or digit.
pub fn is_valid_name(name: &str) -> bool {
    name.len() > 1
        && !name.starts_with('-')
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
