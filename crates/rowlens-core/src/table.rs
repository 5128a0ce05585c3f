//! Table identifiers and the prefix allow-list.
//!
//! A [`TableName`] can only be built through a [`TablePattern`], so any value
//! of that type is known to consist of letters, digits and underscores and to
//! carry the configured prefix. Whether the table actually exists is a
//! separate, live check performed by the table source.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors raised while validating identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("table name is empty")]
    Empty,

    #[error("table name '{0}' does not match the allowed pattern")]
    InvalidName(String),

    #[error("table prefix '{0}' may only contain letters, digits and underscores")]
    InvalidPrefix(String),
}

/// Allow-list pattern: `^<prefix>[A-Za-z0-9_]+$`.
#[derive(Debug, Clone)]
pub struct TablePattern {
    prefix: String,
    regex: Regex,
}

impl TablePattern {
    pub fn new(prefix: &str) -> Result<Self, TableError> {
        if !prefix.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(TableError::InvalidPrefix(prefix.to_string()));
        }
        let regex = Regex::new(&format!("^{}[A-Za-z0-9_]+$", regex::escape(prefix)))
            .map_err(|_| TableError::InvalidPrefix(prefix.to_string()))?;
        Ok(Self {
            prefix: prefix.to_string(),
            regex,
        })
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether `name` carries the prefix, regardless of the remaining characters.
    pub fn has_prefix(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }

    /// Validate a raw, untrusted table name.
    pub fn parse(&self, raw: &str) -> Result<TableName, TableError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(TableError::Empty);
        }
        if !self.regex.is_match(raw) {
            return Err(TableError::InvalidName(raw.to_string()));
        }
        Ok(TableName(raw.to_string()))
    }
}

/// A table name that passed the allow-list pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TableName(String);

impl TableName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a double-quoted SQL identifier.
    pub fn quoted(&self) -> String {
        quote_ident(&self.0)
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A column discovered through schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Database type name (e.g. `text`, `bigint`, `bytea`).
    pub data_type: String,
}

impl ColumnInfo {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
        }
    }

    /// Whether values of this column are raw bytes rather than text.
    pub fn is_binary(&self) -> bool {
        matches!(self.data_type.as_str(), "bytea" | "blob" | "binary" | "varbinary")
    }
}

/// Quote an identifier for interpolation into SQL, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_prefixed_names() {
        let pattern = TablePattern::new("wp_").unwrap();
        let name = pattern.parse("wp_options").unwrap();
        assert_eq!(name.as_str(), "wp_options");
        assert_eq!(name.quoted(), "\"wp_options\"");
    }

    #[test]
    fn rejects_names_outside_the_pattern() {
        let pattern = TablePattern::new("wp_").unwrap();
        assert_eq!(pattern.parse("  "), Err(TableError::Empty));
        assert!(pattern.parse("options").is_err());
        assert!(pattern.parse("wp_").is_err());
        assert!(pattern.parse("wp_options; DROP TABLE x").is_err());
        assert!(pattern.parse("wp_opt\"ions").is_err());
        assert!(pattern.parse("wp_options-2").is_err());
    }

    #[test]
    fn prefix_must_be_identifier_safe() {
        assert!(TablePattern::new("wp-").is_err());
        assert!(TablePattern::new("").is_ok());
    }

    #[test]
    fn quote_ident_doubles_quotes() {
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }
}
