//! Java-style `.properties` configuration parsing.
//!
//! The packaging wrappers are driven by the same property files the build
//! scripts already produce: `key=value` (or `key: value`) lines, `#`/`!`
//! comments, later keys overriding earlier ones. Line continuations and
//! unicode escapes are not supported; none of the packaging property files
//! use them.

use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::PackError;

/// A loaded property file.
#[derive(Debug, Clone)]
pub struct Properties {
    values: HashMap<String, String>,
}

impl Properties {
    /// Load and parse a property file.
    pub fn load(path: &Path) -> Result<Self, PackError> {
        let text = fs::read_to_string(path).map_err(|e| PackError::Io {
            source: e,
            path: path.to_path_buf(),
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse property text. Unparseable lines (no separator) are ignored,
    /// matching the permissive behavior of `java.util.Properties` closely
    /// enough for the packaging files in use.
    pub fn parse(text: &str) -> Self {
        let mut values = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            let Some(separator) = line.find(['=', ':']) else {
                continue;
            };
            let key = line[..separator].trim();
            let value = line[separator + 1..].trim();
            if key.is_empty() {
                continue;
            }
            values.insert(key.to_string(), value.to_string());
        }
        Self { values }
    }

    /// A required string property.
    pub fn required(&self, key: &str) -> Result<&str, PackError> {
        self.values
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| PackError::MissingProperty {
                key: key.to_string(),
            })
    }

    /// A required path property, lexically normalized.
    pub fn required_path(&self, key: &str) -> Result<PathBuf, PackError> {
        Ok(normalize(Path::new(self.required(key)?)))
    }

    /// An optional string property.
    pub fn optional(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// Lexical path normalization: drops `.` components and resolves `..`
/// against preceding components where possible, without touching the
/// filesystem.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_equals_and_colon_separators() {
        let props = Properties::parse("a=1\nb: two\n c = spaced ");
        assert_eq!(props.required("a").unwrap(), "1");
        assert_eq!(props.required("b").unwrap(), "two");
        assert_eq!(props.required("c").unwrap(), "spaced");
    }

    #[test]
    fn skips_comments_and_blank_lines() {
        let props = Properties::parse("# comment\n! also a comment\n\nkey=value\nnonsense line\n");
        assert_eq!(props.required("key").unwrap(), "value");
        assert!(props.optional("nonsense").is_none());
    }

    #[test]
    fn later_keys_override_earlier_ones() {
        let props = Properties::parse("key=first\nkey=second");
        assert_eq!(props.required("key").unwrap(), "second");
    }

    #[test]
    fn missing_required_key_is_an_error() {
        let props = Properties::parse("");
        let err = props.required("packaging.appName").unwrap_err();
        assert!(matches!(err, PackError::MissingProperty { ref key } if key == "packaging.appName"));
    }

    #[test]
    fn value_may_contain_separator_characters() {
        let props = Properties::parse("packaging.sourceURL=https://example.com/src");
        assert_eq!(
            props.required("packaging.sourceURL").unwrap(),
            "https://example.com/src"
        );
    }

    #[test]
    fn normalize_is_lexical() {
        assert_eq!(normalize(Path::new("/a/b/../c/./d")), PathBuf::from("/a/c/d"));
        assert_eq!(normalize(Path::new("a/./b")), PathBuf::from("a/b"));
        assert_eq!(normalize(Path::new("../x")), PathBuf::from("../x"));
    }
}
