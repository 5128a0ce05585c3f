//! Cell formatting.
//!
//! Every raw database value is classified into exactly one [`CellKind`] by an
//! ordered chain of checks. The order matters: a long serialized array is
//! `serialized`, not `long_text`, and a long string of control characters is
//! `long_text`, not `binary`.
//!
//! `display` is always safe HTML. `raw` and `full_text` are kept apart so the
//! renderer can escape them at expansion time without escaping twice.

mod preview;

use crate::html::{escape_html, truncate_chars};
use crate::serialized;
use serde::{Deserialize, Serialize};

pub use preview::{PREVIEW_ITEMS, PREVIEW_STRING_CHARS};

/// Default number of characters after which text is truncated.
pub const LONG_TEXT_THRESHOLD: usize = 100;

/// Share of control characters above which text is considered binary.
const BINARY_CONTROL_RATIO: f64 = 0.3;

/// A raw value as read from the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Null,
    Text(String),
    Bytes(Vec<u8>),
}

impl CellValue {
    /// The value as text, if it is text or UTF-8 bytes.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) => Some(s),
            CellValue::Bytes(b) => std::str::from_utf8(b).ok(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<Option<String>> for CellValue {
    fn from(s: Option<String>) -> Self {
        s.map(CellValue::Text).unwrap_or(CellValue::Null)
    }
}

impl From<Vec<u8>> for CellValue {
    fn from(b: Vec<u8>) -> Self {
        CellValue::Bytes(b)
    }
}

/// Inferred kind of a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Null,
    Empty,
    Serialized,
    Json,
    LongText,
    Binary,
    Text,
}

impl CellKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CellKind::Null => "null",
            CellKind::Empty => "empty",
            CellKind::Serialized => "serialized",
            CellKind::Json => "json",
            CellKind::LongText => "long_text",
            CellKind::Binary => "binary",
            CellKind::Text => "text",
        }
    }
}

/// The pre-rendered representation of one database value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattedCell {
    #[serde(rename = "type")]
    pub kind: CellKind,

    /// Safe HTML for the table cell.
    pub display: String,

    /// The unescaped original value; absent for NULL and binary cells.
    pub raw: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub expandable: bool,

    /// Escaped full text of a truncated long value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
}

impl FormattedCell {
    fn plain(kind: CellKind, display: String, raw: Option<String>) -> Self {
        Self {
            kind,
            display,
            raw,
            expandable: false,
            full_text: None,
        }
    }
}

/// Formats raw values into [`FormattedCell`]s.
#[derive(Debug, Clone, Copy)]
pub struct CellFormatter {
    long_text_threshold: usize,
}

impl Default for CellFormatter {
    fn default() -> Self {
        Self {
            long_text_threshold: LONG_TEXT_THRESHOLD,
        }
    }
}

/// Format a value with the default settings.
pub fn format_cell(value: &CellValue, column: Option<&str>) -> FormattedCell {
    CellFormatter::default().format(value, column)
}

impl CellFormatter {
    pub fn new(long_text_threshold: usize) -> Self {
        Self {
            long_text_threshold: long_text_threshold.max(1),
        }
    }

    pub fn format(&self, value: &CellValue, column: Option<&str>) -> FormattedCell {
        let text = match value {
            CellValue::Null => {
                return FormattedCell::plain(
                    CellKind::Null,
                    r#"<span class="rowlens-null-value">NULL</span>"#.to_string(),
                    None,
                );
            }
            CellValue::Bytes(bytes) if bytes.is_empty() => "",
            CellValue::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => text,
                Err(_) => return binary_cell(bytes.len()),
            },
            CellValue::Text(text) => text.as_str(),
        };

        if text.is_empty() {
            return FormattedCell::plain(
                CellKind::Empty,
                r#"<span class="rowlens-empty-value">(empty)</span>"#.to_string(),
                Some(String::new()),
            );
        }

        if serialized::looks_serialized(text) {
            match serialized::decode(text) {
                Ok(decoded) => {
                    return FormattedCell {
                        kind: CellKind::Serialized,
                        display: preview::serialized_display(&decoded),
                        raw: Some(text.to_string()),
                        expandable: true,
                        full_text: None,
                    };
                }
                Err(e) => {
                    tracing::trace!(column = column.unwrap_or(""), error = %e, "serialized signature without a valid value");
                }
            }
        }

        if let Some(json) = parse_json_container(text) {
            return FormattedCell {
                kind: CellKind::Json,
                display: preview::json_display(&json),
                raw: Some(text.to_string()),
                expandable: true,
                full_text: None,
            };
        }

        if text.chars().count() > self.long_text_threshold {
            let truncated = truncate_chars(text, self.long_text_threshold);
            return FormattedCell {
                kind: CellKind::LongText,
                display: format!(
                    r#"{}<span class="rowlens-truncated">...</span>"#,
                    escape_html(truncated)
                ),
                raw: Some(text.to_string()),
                expandable: true,
                full_text: Some(escape_html(text)),
            };
        }

        if is_binary(text) {
            return binary_cell(text.len());
        }

        FormattedCell::plain(CellKind::Text, escape_html(text), Some(text.to_string()))
    }
}

fn binary_cell(len: usize) -> FormattedCell {
    FormattedCell::plain(
        CellKind::Binary,
        format!(r#"<span class="rowlens-binary-data">[Binary data: {} bytes]</span>"#, len),
        None,
    )
}

/// Parse `text` as JSON if, trimmed, it opens an object or array.
fn parse_json_container(text: &str) -> Option<serde_json::Value> {
    let trimmed = text.trim();
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }
    serde_json::from_str(trimmed).ok()
}

/// A NUL anywhere, or more than 30% control characters other than tab, LF and CR.
pub fn is_binary(text: &str) -> bool {
    if text.contains('\0') {
        return true;
    }
    let mut total = 0usize;
    let mut control = 0usize;
    for c in text.chars() {
        total += 1;
        if (c as u32) < 32 && !matches!(c, '\t' | '\n' | '\r') {
            control += 1;
        }
    }
    total > 0 && (control as f64 / total as f64) > BINARY_CONTROL_RATIO
}
