//! Chrome's `Bookmarks` file: a folder tree under `roots`.
//!
//! Folders are flattened; their names are not carried over as categories.

use chrono::{DateTime, Utc};
use pinmark_core::models::{ImportSource, ImportValidationResult, ImportedRecord};
use serde_json::{json, Map, Value};

use super::{preview_of, record_from_raw};
use crate::error::{ImportError, ImportResult};

const SOURCE: ImportSource = ImportSource::Chrome;

/// Microseconds between 1601-01-01 (Chrome's epoch) and 1970-01-01.
const WEBKIT_EPOCH_OFFSET_MICROS: i64 = 11_644_473_600_000_000;

fn roots(value: &Value) -> Result<&Map<String, Value>, String> {
    value
        .get("roots")
        .ok_or_else(|| "Missing required field: roots".to_string())?
        .as_object()
        .ok_or_else(|| "Field 'roots' must be an object".to_string())
}

/// Depth-first walk collecting every node with `type == "url"`.
fn collect_urls<'a>(node: &'a Value, out: &mut Vec<&'a Value>) {
    if node.get("type").and_then(Value::as_str) == Some("url") {
        out.push(node);
    }
    if let Some(children) = node.get("children").and_then(Value::as_array) {
        for child in children {
            collect_urls(child, out);
        }
    }
}

fn url_nodes(roots: &Map<String, Value>) -> Vec<&Value> {
    let mut out = Vec::new();
    for root in roots.values() {
        collect_urls(root, &mut out);
    }
    out
}

/// `date_added` as Unix microseconds. Chrome writes microseconds since 1601; values
/// already past that offset are shifted, smaller values are taken as Unix-based.
fn date_added_micros(node: &Value) -> Option<i64> {
    let raw = match node.get("date_added")? {
        Value::String(s) => s.trim().parse::<i64>().ok()?,
        Value::Number(n) => n.as_i64()?,
        _ => return None,
    };
    if raw <= 0 {
        return None;
    }
    if raw >= WEBKIT_EPOCH_OFFSET_MICROS {
        Some(raw - WEBKIT_EPOCH_OFFSET_MICROS)
    } else {
        Some(raw)
    }
}

fn to_raw_record(node: &Value) -> Value {
    let mut raw = json!({
        "title": node.get("name").cloned().unwrap_or(Value::Null),
        "url": node.get("url").cloned().unwrap_or(Value::Null),
    });
    if let Some(micros) = date_added_micros(node) {
        raw["bookmarkedAt"] = json!(micros);
    }
    raw
}

pub(super) fn validate(content: &str) -> ImportValidationResult {
    let value: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => return ImportValidationResult::invalid(SOURCE, format!("Invalid JSON: {}", e)),
    };
    let roots = match roots(&value) {
        Ok(r) => r,
        Err(message) => return ImportValidationResult::invalid(SOURCE, message),
    };

    let nodes = url_nodes(roots);
    let mut result = ImportValidationResult::valid(SOURCE);
    result.estimated_records = nodes.len();
    result.preview = preview_of(nodes);
    if result.estimated_records == 0 {
        result
            .warnings
            .push("No bookmarks found in any bookmark folder".to_string());
    }
    result
}

pub(super) fn parse(content: &str, now: DateTime<Utc>) -> ImportResult<Vec<ImportedRecord>> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| ImportError::parse(SOURCE, e.to_string()))?;
    let roots = roots(&value).map_err(|message| ImportError::parse(SOURCE, message))?;

    Ok(url_nodes(roots)
        .into_iter()
        .map(|node| record_from_raw(to_raw_record(node), SOURCE, now))
        .collect())
}
