//! Generic JSON: a bare list of records, or an object with a `bookmarks` list.

use chrono::{DateTime, Utc};
use pinmark_core::models::{ImportSource, ImportValidationResult, ImportedRecord};
use serde_json::Value;

use super::{bookmark_list, preview_of, record_from_raw};
use crate::error::{ImportError, ImportResult};
use crate::normalize::raw_content;

const SOURCE: ImportSource = ImportSource::Json;

/// Records inspected for a usable content field during validation.
const CONTENT_CHECK_LIMIT: usize = 10;

const SHAPE_ERROR: &str = "Expected an array of bookmarks or an object with a 'bookmarks' array";

pub(super) fn validate(content: &str) -> ImportValidationResult {
    let value: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => return ImportValidationResult::invalid(SOURCE, format!("Invalid JSON: {}", e)),
    };
    let Some(items) = bookmark_list(&value) else {
        return ImportValidationResult::invalid(SOURCE, SHAPE_ERROR);
    };

    let mut result = ImportValidationResult::valid(SOURCE);
    result.estimated_records = items.len();
    result.preview = preview_of(items);

    if items.is_empty() {
        result.warnings.push("File contains no bookmarks".to_string());
    }
    for (index, item) in items.iter().take(CONTENT_CHECK_LIMIT).enumerate() {
        if raw_content(item).is_none() {
            result.warnings.push(format!(
                "Record {} has no non-empty content, text, title or name field",
                index + 1
            ));
        }
    }
    result
}

pub(super) fn parse(content: &str, now: DateTime<Utc>) -> ImportResult<Vec<ImportedRecord>> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| ImportError::parse(SOURCE, e.to_string()))?;
    let items = bookmark_list(&value).ok_or_else(|| ImportError::parse(SOURCE, SHAPE_ERROR))?;

    Ok(items
        .iter()
        .map(|item| record_from_raw(item.clone(), SOURCE, now))
        .collect())
}
