//! Value coercion: turning raw strings and lists into typed setting values,
//! and back again for `--dump-config`.
//!
//! Every setting has a [`SettingKind`]; every resolved value is a [`Value`].
//! Raw input arrives as a [`RawValue`]: INI files, environment variables and
//! command-line arguments give text, TOML files may give native lists.
//!
//! # Booleans
//!
//! Exactly `yes`, `on`, `true` and `1` mean on. The comparison is
//! case-sensitive, so `Yes` and `TRUE` are off, as is every other literal
//! (including the empty string). Booleans therefore never fail to coerce.
//!
//! # Lists in text form
//!
//! A textual list is split on commas, except inside a double-quoted span.
//! Quotes are stripped and each item is trimmed:
//!
//! ```text
//! foo, bar, foobar, "hello, world"   ->   [foo, bar, foobar, hello, world]
//!                                          (four items, the last is "hello, world")
//! ```
//!
//! A double quote cannot be escaped. Inside a quoted item the next `"` always
//! closes the quote, so an item containing a literal `"` is not representable.
//! Unquoted empty items are dropped; `""` gives an empty item.

use std::fmt;

use serde::Serialize;

/// The type of a setting. Closed set; coercion and formatting are exhaustive
/// over it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingKind {
    String,
    Boolean,
    Integer,
    /// An integer byte count written with an optional unit suffix (`10k`, `2MiB`).
    Bytesize,
    StringList,
    /// A string restricted to the given choices. The first choice is the default.
    Choice(Vec<String>),
}

impl SettingKind {
    /// Whether the option consumes an argument on the command line.
    pub fn takes_value(&self) -> bool {
        !matches!(self, SettingKind::Boolean)
    }

    /// Human description used in error messages and help.
    pub fn describe(&self) -> &'static str {
        match self {
            SettingKind::String => "a string",
            SettingKind::Boolean => "a boolean",
            SettingKind::Integer => "an integer",
            SettingKind::Bytesize => "a byte size",
            SettingKind::StringList => "a list of strings",
            SettingKind::Choice(_) => "one of a fixed set of choices",
        }
    }

    /// Placeholder shown for the argument in help output.
    pub fn metavar(&self) -> &'static str {
        match self {
            SettingKind::String | SettingKind::StringList => "STRING",
            SettingKind::Boolean => "",
            SettingKind::Integer => "INT",
            SettingKind::Bytesize => "SIZE",
            SettingKind::Choice(_) => "CHOICE",
        }
    }

    /// The value a setting of this kind has when no default is given.
    pub fn zero(&self) -> Value {
        match self {
            SettingKind::String => Value::String(String::new()),
            SettingKind::Boolean => Value::Boolean(false),
            SettingKind::Integer | SettingKind::Bytesize => Value::Integer(0),
            SettingKind::StringList => Value::StringList(Vec::new()),
            SettingKind::Choice(choices) => {
                Value::String(choices.first().cloned().unwrap_or_default())
            }
        }
    }

    /// Check that `value` is acceptable for this kind.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match (self, value) {
            (SettingKind::String, Value::String(_))
            | (SettingKind::Boolean, Value::Boolean(_))
            | (SettingKind::Integer | SettingKind::Bytesize, Value::Integer(_))
            | (SettingKind::StringList, Value::StringList(_)) => Ok(()),
            (SettingKind::Choice(choices), Value::String(s)) => {
                if choices.contains(s) {
                    Ok(())
                } else {
                    Err(choice_reason(choices))
                }
            }
            (kind, _) => Err(format!("expected {}", kind.describe())),
        }
    }
}

/// A typed setting value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Boolean(bool),
    Integer(i64),
    StringList(Vec<String>),
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<Vec<String>> for Value {
    fn from(items: Vec<String>) -> Self {
        Value::StringList(items)
    }
}

impl From<Vec<&str>> for Value {
    fn from(items: Vec<&str>) -> Self {
        Value::StringList(items.into_iter().map(String::from).collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", format_value(self))
    }
}

/// A value before coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    List(Vec<String>),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => write!(f, "{s}"),
            RawValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// Coerce a raw value into a typed one. The error is the human-readable reason.
pub fn coerce(kind: &SettingKind, raw: &RawValue) -> Result<Value, String> {
    match raw {
        RawValue::Text(text) => coerce_text(kind, text),
        RawValue::List(items) => match kind {
            SettingKind::StringList => Ok(Value::StringList(items.clone())),
            other => Err(format!("expected {}, found a list", other.describe())),
        },
    }
}

/// Coerce a single textual literal. StringList text goes through [`split_list`].
pub fn coerce_text(kind: &SettingKind, text: &str) -> Result<Value, String> {
    match kind {
        SettingKind::String => Ok(Value::String(text.to_string())),
        SettingKind::Boolean => Ok(Value::Boolean(parse_bool(text))),
        SettingKind::Integer => text
            .trim()
            .parse::<i64>()
            .map(Value::Integer)
            .map_err(|_| "expected an integer".to_string()),
        SettingKind::Bytesize => parse_bytesize(text).map(Value::Integer),
        SettingKind::StringList => Ok(Value::StringList(split_list(text))),
        SettingKind::Choice(choices) => {
            if choices.iter().any(|c| c == text) {
                Ok(Value::String(text.to_string()))
            } else {
                Err(choice_reason(choices))
            }
        }
    }
}

fn choice_reason(choices: &[String]) -> String {
    format!("expected one of: {}", choices.join(", "))
}

/// `yes`, `on`, `true` and `1` are on; everything else is off.
pub fn parse_bool(text: &str) -> bool {
    matches!(text, "yes" | "on" | "true" | "1")
}

/// Split a comma-separated list, honouring double-quoted spans.
pub fn split_list(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;
    let mut quoted = false;

    for c in text.chars() {
        match c {
            '"' => {
                in_quote = !in_quote;
                quoted = true;
            }
            ',' if !in_quote => {
                push_item(&mut items, &current, quoted);
                current.clear();
                quoted = false;
            }
            _ => current.push(c),
        }
    }
    push_item(&mut items, &current, quoted);
    items
}

fn push_item(items: &mut Vec<String>, current: &str, quoted: bool) {
    let item = current.trim();
    if quoted || !item.is_empty() {
        items.push(item.to_string());
    }
}

/// Join list items so that [`split_list`] reads them back. Items containing a
/// comma, and empty items, are quoted.
pub fn format_list(items: &[String]) -> String {
    items
        .iter()
        .map(|item| {
            if item.is_empty() || item.contains(',') {
                format!("\"{item}\"")
            } else {
                item.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a value in the INI text form read back by [`coerce_text`].
///
/// Every line after the first is indented, so a multi-line value is written
/// as INI continuation lines.
pub fn format_value(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Boolean(true) => "yes".to_string(),
        Value::Boolean(false) => "no".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::StringList(items) => format_list(items),
    };
    text.replace('\n', "\n    ")
}

/// Parse a byte size such as `123`, `1.5k`, `10 MiB` or `2gb`.
///
/// `k m g t` are powers of 1000, `ki mi gi ti` powers of 1024. A trailing `b`
/// is optional and case is ignored.
pub fn parse_bytesize(text: &str) -> Result<i64, String> {
    let invalid = || format!("expected a size such as 512, 10k or 2MiB, got '{text}'");

    let lowered = text.trim().to_ascii_lowercase();
    let split = lowered
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(lowered.len());
    let (number, unit) = lowered.split_at(split);

    let well_formed = match number.split_once('.') {
        Some((int, frac)) => {
            !int.is_empty() && !frac.is_empty() && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => !number.is_empty(),
    };
    if !well_formed {
        return Err(invalid());
    }
    let number: f64 = number.parse().map_err(|_| invalid())?;

    let unit = unit.trim_start();
    let unit = unit.strip_suffix('b').unwrap_or(unit);
    let multiplier: f64 = match unit {
        "" => 1.0,
        "k" => 1e3,
        "m" => 1e6,
        "g" => 1e9,
        "t" => 1e12,
        "ki" => 1024f64,
        "mi" => 1024f64.powi(2),
        "gi" => 1024f64.powi(3),
        "ti" => 1024f64.powi(4),
        _ => return Err(invalid()),
    };
    let bytes = number * multiplier;
    if !bytes.is_finite() || bytes >= i64::MAX as f64 {
        return Err(format!("size '{text}' is too large"));
    }
    Ok(bytes as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn canonical_on_literals() {
        for literal in ["yes", "on", "true", "1"] {
            assert!(parse_bool(literal), "{literal} should be on");
        }
    }

    #[test]
    fn everything_else_is_off() {
        for literal in ["no", "off", "false", "0", "", "Yes", "TRUE", "y", "2"] {
            assert!(!parse_bool(literal), "{literal} should be off");
        }
    }

    #[test]
    fn boolean_survives_format_and_coerce() {
        for b in [true, false] {
            let text = format_value(&Value::Boolean(b));
            assert_eq!(
                coerce_text(&SettingKind::Boolean, &text).unwrap(),
                Value::Boolean(b)
            );
        }
    }

    #[test]
    fn split_list_honours_quotes() {
        let items = split_list(r#"foo, bar, foobar, "hello, world""#);
        assert_eq!(items, strings(&["foo", "bar", "foobar", "hello, world"]));
    }

    #[test]
    fn split_list_trims_items() {
        assert_eq!(split_list("  a ,b  ,   c"), strings(&["a", "b", "c"]));
    }

    #[test]
    fn split_list_drops_unquoted_empties() {
        assert_eq!(split_list("a,,b,"), strings(&["a", "b"]));
        assert!(split_list("").is_empty());
    }

    #[test]
    fn split_list_keeps_quoted_empty() {
        assert_eq!(split_list(r#"a, "", b"#), strings(&["a", "", "b"]));
    }

    #[test]
    fn quote_inside_quoted_item_closes_it() {
        // `"say "hi", there"`: the second quote closes, the third reopens.
        let items = split_list(r#""say "hi", there""#);
        assert_eq!(items, strings(&["say hi, there"]));
    }

    #[test]
    fn format_list_quotes_commas() {
        let items = strings(&["plain", "with, comma", ""]);
        let text = format_list(&items);
        assert_eq!(text, r#"plain, "with, comma", """#);
        assert_eq!(split_list(&text), items);
    }

    #[test]
    fn multi_line_string_is_indented() {
        let value = Value::from("first\nsecond");
        assert_eq!(format_value(&value), "first\n    second");
        assert_eq!(format_value(&Value::from("one line")), "one line");
    }

    #[test]
    fn integer_coercion() {
        assert_eq!(
            coerce_text(&SettingKind::Integer, " 42 ").unwrap(),
            Value::Integer(42)
        );
        assert_eq!(
            coerce_text(&SettingKind::Integer, "-7").unwrap(),
            Value::Integer(-7)
        );
        let err = coerce_text(&SettingKind::Integer, "forty").unwrap_err();
        assert!(err.contains("integer"));
    }

    #[test]
    fn choice_coercion() {
        let kind = SettingKind::Choice(strings(&["fast", "slow"]));
        assert_eq!(coerce_text(&kind, "slow").unwrap(), Value::from("slow"));
        let err = coerce_text(&kind, "medium").unwrap_err();
        assert!(err.contains("fast, slow"));
    }

    #[test]
    fn choice_is_case_sensitive() {
        let kind = SettingKind::Choice(strings(&["fast", "slow"]));
        assert!(coerce_text(&kind, "Fast").is_err());
    }

    #[test]
    fn native_list_only_fits_string_list() {
        let raw = RawValue::List(strings(&["a,b", "c"]));
        assert_eq!(
            coerce(&SettingKind::StringList, &raw).unwrap(),
            Value::StringList(strings(&["a,b", "c"]))
        );
        assert!(coerce(&SettingKind::Integer, &raw).is_err());
    }

    #[test]
    fn bytesize_units() {
        let cases = [
            ("123", 123),
            ("123b", 123),
            ("123k", 123_000),
            ("123m", 123_000_000),
            ("123g", 123_000_000_000),
            ("123t", 123_000_000_000_000),
            ("123kib", 123 * 1024),
            ("123mib", 123 * 1024 * 1024),
            ("123gib", 123 * 1024 * 1024 * 1024),
            ("123tib", 123 * 1024i64.pow(4)),
            ("1.5k", 1500),
            ("10 MiB", 10 * 1024 * 1024),
            ("2GB", 2_000_000_000),
        ];
        for (text, expected) in cases {
            assert_eq!(parse_bytesize(text), Ok(expected), "{text}");
        }
    }

    #[test]
    fn bytesize_rejects_garbage() {
        for text in ["xyzzy", "", "k", "1.2.3", "12q", ".5k", "5.k"] {
            assert!(parse_bytesize(text).is_err(), "{text} should be rejected");
        }
    }

    #[test]
    fn bytesize_overflow_is_an_error() {
        let err = parse_bytesize("99999999999999t").unwrap_err();
        assert!(err.contains("too large"));
        assert!(parse_bytesize("9223372036854775807").is_err());
        assert!(coerce_text(&SettingKind::Bytesize, "20000000tib").is_err());
        assert_eq!(parse_bytesize("8000000t"), Ok(8_000_000_000_000_000_000));
    }

    #[test]
    fn zero_values_match_kind() {
        let kinds = [
            SettingKind::String,
            SettingKind::Boolean,
            SettingKind::Integer,
            SettingKind::Bytesize,
            SettingKind::StringList,
            SettingKind::Choice(strings(&["a", "b"])),
        ];
        for kind in kinds {
            assert!(kind.check(&kind.zero()).is_ok(), "{kind:?}");
        }
    }

    #[test]
    fn choice_zero_is_first_choice() {
        let kind = SettingKind::Choice(strings(&["info", "debug"]));
        assert_eq!(kind.zero(), Value::from("info"));
    }

    #[test]
    fn check_rejects_mismatched_kind() {
        assert!(SettingKind::Integer.check(&Value::from("3")).is_err());
        assert!(SettingKind::String.check(&Value::Boolean(true)).is_err());
    }
}
