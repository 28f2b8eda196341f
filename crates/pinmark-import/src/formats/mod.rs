//! Format validators and parsers.
//!
//! Every supported [`ImportSource`] has one module exposing `validate` and `parse`.
//! Dispatch happens here with exhaustive matches, so adding a format without both
//! halves does not compile.
//!
//! Validators are cheap pre-flight checks and never fail: problems are reported in
//! [`ImportValidationResult::errors`]. Parsers convert the whole file and only fail
//! when the file as a whole is unreadable; a single bad record becomes an
//! [`ImportedRecord`] with `status = error`.

mod chrome;
mod csv;
mod json;
mod native;
mod netscape;

use chrono::{DateTime, Utc};
use pinmark_core::constants::VALIDATION_PREVIEW_LIMIT;
use pinmark_core::models::{
    ImportSource, ImportValidationResult, ImportedRecord, NormalizedBookmark, RecordStatus,
};
use serde_json::Value;

use crate::error::ImportResult;
use crate::hash::fingerprint;
use crate::normalize::normalize;

/// Pre-flight check of raw file content for the declared format.
pub fn validate(source: ImportSource, content: &str) -> ImportValidationResult {
    let content = strip_bom(content);
    match source {
        ImportSource::Native => native::validate(content),
        ImportSource::Json => json::validate(content),
        ImportSource::Csv => csv::validate(content),
        ImportSource::Chrome => chrome::validate(content),
        ImportSource::Netscape => netscape::validate(content),
    }
}

/// Convert raw file content into records ready for resolution.
///
/// `now` is the import timestamp applied to every record.
pub fn parse(
    source: ImportSource,
    content: &str,
    now: DateTime<Utc>,
) -> ImportResult<Vec<ImportedRecord>> {
    let content = strip_bom(content);
    match source {
        ImportSource::Native => native::parse(content, now),
        ImportSource::Json => json::parse(content, now),
        ImportSource::Csv => csv::parse(content, now),
        ImportSource::Chrome => chrome::parse(content, now),
        ImportSource::Netscape => netscape::parse(content, now),
    }
}

fn strip_bom(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content)
}

/// Normalize and fingerprint one raw record. Status starts as `imported`.
pub(crate) fn record_from_raw(
    raw: Value,
    source: ImportSource,
    now: DateTime<Utc>,
) -> ImportedRecord {
    let normalized = normalize(&raw, source, now);
    let hash = fingerprint(&normalized);
    ImportedRecord {
        original_data: raw,
        normalized_data: normalized,
        status: RecordStatus::Imported,
        error: None,
        hash,
    }
}

/// A record the parser could not decode at all.
pub(crate) fn failed_record(
    raw: Value,
    source: ImportSource,
    now: DateTime<Utc>,
    message: impl Into<String>,
) -> ImportedRecord {
    let normalized = NormalizedBookmark::empty(source, now);
    let hash = fingerprint(&normalized);
    ImportedRecord {
        original_data: raw,
        normalized_data: normalized,
        status: RecordStatus::Error,
        error: Some(message.into()),
        hash,
    }
}

fn preview_of<'a>(records: impl IntoIterator<Item = &'a Value>) -> Vec<Value> {
    records
        .into_iter()
        .take(VALIDATION_PREVIEW_LIMIT)
        .cloned()
        .collect()
}

/// The `bookmarks` list of an object, or the value itself when it is a list.
fn bookmark_list(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(obj) => obj.get("bookmarks").and_then(Value::as_array),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Input that is malformed for each format must come back invalid, not panic.
    #[test]
    fn every_validator_rejects_malformed_input() {
        let cases = [
            (ImportSource::Native, "{\"metadata\": {}, \"bookmarks\": ["),
            (ImportSource::Json, "not json at all"),
            (ImportSource::Csv, "content,author\n"),
            (ImportSource::Chrome, "{\"checksum\": \"abc\"}"),
            (ImportSource::Netscape, "<html><body><a href=\"x\">x</a></body></html>"),
        ];
        for (source, input) in cases {
            let result = validate(source, input);
            assert!(!result.valid, "{} accepted malformed input", source);
            assert!(!result.errors.is_empty(), "{} reported no errors", source);
            assert_eq!(result.detected_format, source.to_string());
        }
    }

    #[test]
    fn every_validator_survives_empty_input() {
        for source in ImportSource::ALL {
            let result = validate(source, "");
            assert!(!result.valid);
            assert!(!result.errors.is_empty());
        }
    }

    #[test]
    fn byte_order_mark_is_ignored() {
        let result = validate(ImportSource::Json, "\u{feff}[{\"content\": \"x\"}]");
        assert!(result.valid);
        assert_eq!(result.estimated_records, 1);
    }

    #[test]
    fn records_start_imported_with_fingerprint() {
        let now = Utc::now();
        let record = record_from_raw(
            serde_json::json!({"content": "hi", "author": "a"}),
            ImportSource::Json,
            now,
        );
        assert_eq!(record.status, RecordStatus::Imported);
        assert_eq!(record.hash, fingerprint(&record.normalized_data));
        assert!(record.error.is_none());
    }
}
