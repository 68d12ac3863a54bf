//! A small INI reader producing `section -> key -> raw text`.
//!
//! Accepted syntax:
//!
//! - `[section]` headers; keys before the first header are an error.
//! - `key = value` or `key: value`; whitespace around the separator and the
//!   value is ignored. Keys are lowercased.
//! - Lines starting with `#` or `;` are comments; blank lines are skipped.
//! - An indented line continues the previous value, joined with a newline.
//! - A repeated key in the same section replaces the earlier value.
//!
//! Values are kept as text; list splitting happens at coercion time.

use std::collections::BTreeMap;

/// A key's value and the 1-based line it was defined on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniEntry {
    pub value: String,
    pub line: usize,
}

pub type IniSection = BTreeMap<String, IniEntry>;

/// Parse INI text. The error message names the offending line.
pub fn parse(content: &str) -> Result<BTreeMap<String, IniSection>, String> {
    let mut sections: BTreeMap<String, IniSection> = BTreeMap::new();
    let mut current: Option<String> = None;
    let mut last_key: Option<String> = None;

    for (i, line) in content.lines().enumerate() {
        let lineno = i + 1;
        let trimmed = line.trim();

        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        // Continuation of the previous value.
        if line.starts_with([' ', '\t'])
            && let (Some(section), Some(key)) = (&current, &last_key)
            && let Some(entry) = sections.get_mut(section).and_then(|s| s.get_mut(key))
        {
            if !entry.value.is_empty() {
                entry.value.push('\n');
            }
            entry.value.push_str(trimmed);
            continue;
        }

        if let Some(rest) = trimmed.strip_prefix('[') {
            let Some(name) = rest.strip_suffix(']') else {
                return Err(format!("line {lineno}: unterminated section header"));
            };
            let name = name.trim().to_string();
            sections.entry(name.clone()).or_default();
            current = Some(name);
            last_key = None;
            continue;
        }

        let Some(split) = trimmed.find(['=', ':']) else {
            return Err(format!("line {lineno}: expected 'key = value'"));
        };
        let key = trimmed[..split].trim().to_lowercase();
        let value = trimmed[split + 1..].trim().to_string();
        if key.is_empty() {
            return Err(format!("line {lineno}: missing key before separator"));
        }
        let Some(section) = &current else {
            return Err(format!("line {lineno}: key '{key}' outside of any section"));
        };

        sections.entry(section.clone()).or_default().insert(
            key.clone(),
            IniEntry {
                value,
                line: lineno,
            },
        );
        last_key = Some(key);
    }

    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value<'a>(doc: &'a BTreeMap<String, IniSection>, section: &str, key: &str) -> &'a str {
        &doc[section][key].value
    }

    #[test]
    fn sections_and_keys() {
        let doc = parse("[config]\nfoo = bar\nbaz=qux\n\n[other]\nx = 1\n").unwrap();
        assert_eq!(value(&doc, "config", "foo"), "bar");
        assert_eq!(value(&doc, "config", "baz"), "qux");
        assert_eq!(value(&doc, "other", "x"), "1");
    }

    #[test]
    fn colon_separator_and_spacing() {
        let doc = parse("[config]\n  log-level :   debug  \n").unwrap();
        assert_eq!(value(&doc, "config", "log-level"), "debug");
    }

    #[test]
    fn first_separator_splits() {
        let doc = parse("[config]\nurl = http://host:80/?a=b\n").unwrap();
        assert_eq!(value(&doc, "config", "url"), "http://host:80/?a=b");
    }

    #[test]
    fn comments_skipped() {
        let doc = parse("# top\n[config]\n; note\nfoo = 1\n").unwrap();
        assert_eq!(doc["config"].len(), 1);
    }

    #[test]
    fn keys_lowercased() {
        let doc = parse("[config]\nFoo = Bar\n").unwrap();
        assert_eq!(value(&doc, "config", "foo"), "Bar");
    }

    #[test]
    fn continuation_lines_join() {
        let doc = parse("[config]\nexclude = a,\n    b,\n    c\nnext = 1\n").unwrap();
        assert_eq!(value(&doc, "config", "exclude"), "a,\nb,\nc");
        assert_eq!(value(&doc, "config", "next"), "1");
    }

    #[test]
    fn later_key_wins() {
        let doc = parse("[config]\nfoo = 1\nfoo = 2\n").unwrap();
        assert_eq!(value(&doc, "config", "foo"), "2");
        assert_eq!(doc["config"]["foo"].line, 3);
    }

    #[test]
    fn empty_value_allowed() {
        let doc = parse("[config]\noutput =\n").unwrap();
        assert_eq!(value(&doc, "config", "output"), "");
    }

    #[test]
    fn line_numbers_recorded() {
        let doc = parse("[config]\n\n# c\nfoo = 1\n").unwrap();
        assert_eq!(doc["config"]["foo"].line, 4);
    }

    #[test]
    fn key_outside_section_is_error() {
        let err = parse("foo = 1\n").unwrap_err();
        assert!(err.contains("line 1"));
        assert!(err.contains("outside"));
    }

    #[test]
    fn line_without_separator_is_error() {
        let err = parse("[config]\njust words\n").unwrap_err();
        assert!(err.contains("line 2"));
    }

    #[test]
    fn unterminated_header_is_error() {
        assert!(parse("[config\nfoo = 1\n").is_err());
    }

    #[test]
    fn empty_sections_retained() {
        let doc = parse("[config]\n[extra]\n").unwrap();
        assert!(doc.contains_key("extra"));
        assert!(doc["config"].is_empty());
    }
}
