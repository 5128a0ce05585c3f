//! One-line previews of structured values.

use crate::html::{escape_html, truncate_chars};
use crate::serialized::PhpValue;
use serde_json::Value;

/// Entries shown before the preview is cut off with `...`.
pub const PREVIEW_ITEMS: usize = 3;

/// Characters kept from a string inside a preview.
pub const PREVIEW_STRING_CHARS: usize = 20;

/// Join up to [`PREVIEW_ITEMS`] `key: value` pairs as `{k: v, ...}`.
fn braced<I>(entries: I, total: usize) -> String
where
    I: Iterator<Item = (String, String)>,
{
    let mut parts: Vec<String> = entries
        .take(PREVIEW_ITEMS)
        .map(|(k, v)| format!("{k}: {v}"))
        .collect();
    if total > PREVIEW_ITEMS {
        parts.push("...".to_string());
    }
    format!("{{{}}}", parts.join(", "))
}

fn quoted(s: &str) -> String {
    format!("\"{}\"", truncate_chars(s, PREVIEW_STRING_CHARS))
}

fn wrap(class: &str, data_type: &str, count: Option<usize>, label: &str, preview: &str) -> String {
    let count = count
        .map(|n| format!(r#" data-count="{n}""#))
        .unwrap_or_default();
    format!(
        r#"<span class="{class}" data-type="{data_type}"{count}><span class="rowlens-data-type">{}</span> <span class="rowlens-data-preview">{}</span></span>"#,
        escape_html(label),
        escape_html(preview)
    )
}

fn php_scalar(value: &PhpValue) -> String {
    match value {
        PhpValue::Str(s) => quoted(s),
        PhpValue::Int(i) => i.to_string(),
        PhpValue::Float(f) => f.to_string(),
        other => other.type_name().to_string(),
    }
}

/// Text a primitive serialized value prints as.
fn php_print(value: &PhpValue) -> String {
    match value {
        PhpValue::Null => String::new(),
        PhpValue::Bool(true) => "1".to_string(),
        PhpValue::Bool(false) => String::new(),
        PhpValue::Int(i) => i.to_string(),
        PhpValue::Float(f) => f.to_string(),
        PhpValue::Str(s) => truncate_chars(s, PREVIEW_STRING_CHARS * 5).to_string(),
        PhpValue::Enum(name) => name.clone(),
        other => other.type_name().to_string(),
    }
}

pub(super) fn serialized_display(value: &PhpValue) -> String {
    match value {
        PhpValue::Array(entries) if entries.is_empty() => {
            wrap("rowlens-serialized-data", "array", Some(0), "[Array: 0 items]", "(empty array)")
        }
        PhpValue::Array(entries) => {
            let preview = braced(
                entries.iter().map(|(k, v)| (k.to_string(), php_scalar(v))),
                entries.len(),
            );
            wrap(
                "rowlens-serialized-data",
                "array",
                Some(entries.len()),
                &format!("[Array: {} items]", entries.len()),
                &preview,
            )
        }
        PhpValue::Object { class, properties } => {
            let mut preview = format!("({} properties)", properties.len());
            if !properties.is_empty() {
                preview.push(' ');
                preview.push_str(&braced(
                    properties.iter().map(|(k, v)| (k.clone(), php_scalar(v))),
                    properties.len(),
                ));
            }
            wrap(
                "rowlens-serialized-data",
                "object",
                None,
                &format!("[Object: {class}]"),
                &preview,
            )
        }
        other => wrap(
            "rowlens-serialized-data",
            "primitive",
            None,
            "[Serialized]",
            &php_print(other),
        ),
    }
}

fn json_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => quoted(s),
        Value::Number(n) => n.to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Null => "NULL".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

pub(super) fn json_display(value: &Value) -> String {
    match value {
        Value::Object(map) if map.is_empty() => {
            wrap("rowlens-json-data", "object", Some(0), "[JSON Object: 0 properties]", "(empty object)")
        }
        Value::Object(map) => wrap(
            "rowlens-json-data",
            "object",
            Some(map.len()),
            &format!("[JSON Object: {} properties]", map.len()),
            &braced(map.iter().map(|(k, v)| (k.clone(), json_scalar(v))), map.len()),
        ),
        Value::Array(items) if items.is_empty() => {
            wrap("rowlens-json-data", "array", Some(0), "[JSON Array: 0 items]", "(empty array)")
        }
        Value::Array(items) => wrap(
            "rowlens-json-data",
            "array",
            Some(items.len()),
            &format!("[JSON Array: {} items]", items.len()),
            &braced(
                items.iter().enumerate().map(|(i, v)| (i.to_string(), json_scalar(v))),
                items.len(),
            ),
        ),
        // only containers reach here
        other => wrap("rowlens-json-data", "primitive", None, "[JSON]", &json_scalar(other)),
    }
}
