//! Pinmark's own export: `{"metadata": {...}, "bookmarks": [...]}`.

use chrono::{DateTime, Utc};
use pinmark_core::models::{ImportSource, ImportValidationResult, ImportedRecord};
use serde_json::Value;

use super::{preview_of, record_from_raw};
use crate::error::{ImportError, ImportResult};

const SOURCE: ImportSource = ImportSource::Native;

fn bookmarks(value: &Value) -> Result<&Vec<Value>, String> {
    let obj = value
        .as_object()
        .ok_or_else(|| "Expected a JSON object at the top level".to_string())?;
    if !obj.contains_key("metadata") {
        return Err("Missing required field: metadata".to_string());
    }
    obj.get("bookmarks")
        .ok_or_else(|| "Missing required field: bookmarks".to_string())?
        .as_array()
        .ok_or_else(|| "Field 'bookmarks' must be an array".to_string())
}

pub(super) fn validate(content: &str) -> ImportValidationResult {
    let value: Value = match serde_json::from_str(content) {
        Ok(v) => v,
        Err(e) => return ImportValidationResult::invalid(SOURCE, format!("Invalid JSON: {}", e)),
    };
    let items = match bookmarks(&value) {
        Ok(items) => items,
        Err(message) => return ImportValidationResult::invalid(SOURCE, message),
    };

    let mut result = ImportValidationResult::valid(SOURCE);
    result.estimated_records = items.len();
    result.preview = preview_of(items);
    if items.is_empty() {
        result.warnings.push("Export contains no bookmarks".to_string());
    }
    result
}

pub(super) fn parse(content: &str, now: DateTime<Utc>) -> ImportResult<Vec<ImportedRecord>> {
    let value: Value =
        serde_json::from_str(content).map_err(|e| ImportError::parse(SOURCE, e.to_string()))?;
    let items = bookmarks(&value).map_err(|message| ImportError::parse(SOURCE, message))?;

    Ok(items
        .iter()
        .map(|item| record_from_raw(item.clone(), SOURCE, now))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn export() -> String {
        json!({
            "metadata": {"exportedAt": "2024-02-01T00:00:00Z", "version": "1.0", "totalBookmarks": 2},
            "bookmarks": [
                {
                    "content": "first",
                    "authorUsername": "a",
                    "authorDisplayName": "Alice",
                    "tags": ["rust"],
                    "bookmarkedAt": "2024-01-01T00:00:00Z",
                    "isArchived": true
                },
                {"content": "second", "authorUsername": "b", "bookmarkedAt": "2024-01-02T00:00:00Z"}
            ]
        })
        .to_string()
    }

    #[test]
    fn validate_counts_bookmarks() {
        let result = validate(&export());
        assert!(result.valid);
        assert_eq!(result.estimated_records, 2);
        assert_eq!(result.preview.len(), 2);
        assert!(result.errors.is_empty());
    }

    #[test]
    fn validate_requires_metadata_and_bookmarks() {
        let result = validate(r#"{"bookmarks": []}"#);
        assert!(!result.valid);
        assert!(result.errors[0].contains("metadata"));

        let result = validate(r#"{"metadata": {}}"#);
        assert!(!result.valid);
        assert!(result.errors[0].contains("bookmarks"));
    }

    #[test]
    fn parse_preserves_fields() {
        let records = parse(&export(), Utc::now()).unwrap();
        assert_eq!(records.len(), 2);
        let first = &records[0].normalized_data;
        assert_eq!(first.content, "first");
        assert_eq!(first.author_display_name, "Alice");
        assert!(first.is_archived);
        assert!(first.tags.contains("rust"));
        assert_eq!(first.import_source, ImportSource::Native);
        assert_eq!(records[0].original_data["content"], "first");
    }

    #[test]
    fn parse_rejects_non_export() {
        assert!(matches!(
            parse("[]", Utc::now()),
            Err(ImportError::Parse { .. })
        ));
    }
}
