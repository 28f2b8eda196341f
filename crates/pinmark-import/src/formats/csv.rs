//! Tabular data with a header row. Each row becomes an object keyed by header.

use chrono::{DateTime, Utc};
use pinmark_core::models::{ImportSource, ImportValidationResult, ImportedRecord};
use serde_json::{Map, Value};

use super::{failed_record, record_from_raw};
use crate::error::{ImportError, ImportResult};

const SOURCE: ImportSource = ImportSource::Csv;

/// Rows read by the validator. The estimate is extrapolated from this sample.
const SAMPLE_ROWS: usize = 100;
const ESTIMATE_MULTIPLIER: usize = 10;

/// Header fragments that suggest a usable content column.
const CONTENT_COLUMN_HINTS: &[&str] = &["content", "text", "title", "url"];

fn reader(content: &str) -> ::csv::Reader<&[u8]> {
    ::csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(content.as_bytes())
}

fn row_to_value(headers: &::csv::StringRecord, row: &::csv::StringRecord) -> Value {
    let mut obj = Map::new();
    for (header, cell) in headers.iter().zip(row.iter()) {
        if header.is_empty() {
            continue;
        }
        obj.insert(header.to_string(), Value::String(cell.to_string()));
    }
    Value::Object(obj)
}

pub(super) fn validate(content: &str) -> ImportValidationResult {
    let mut rdr = reader(content);
    let headers = match rdr.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            return ImportValidationResult::invalid(SOURCE, format!("Invalid CSV header: {}", e))
        }
    };

    let mut result = ImportValidationResult::valid(SOURCE);
    let mut sampled = 0;
    let mut bad_rows = 0;
    for row in rdr.records().take(SAMPLE_ROWS) {
        match row {
            Ok(row) => {
                if result.preview.len() < pinmark_core::constants::VALIDATION_PREVIEW_LIMIT {
                    result.preview.push(row_to_value(&headers, &row));
                }
                sampled += 1;
            }
            Err(_) => bad_rows += 1,
        }
    }

    if sampled == 0 {
        return ImportValidationResult::invalid(SOURCE, "CSV file contains no data rows");
    }

    let has_content_column = headers.iter().any(|h| {
        let h = h.to_lowercase();
        CONTENT_COLUMN_HINTS.iter().any(|hint| h.contains(hint))
    });
    if !has_content_column {
        result.warnings.push(
            "No column looks like content, text, title or url; records may import empty"
                .to_string(),
        );
    }
    if bad_rows > 0 {
        result
            .warnings
            .push(format!("{} sampled rows could not be decoded", bad_rows));
    }

    result.estimated_records = sampled * ESTIMATE_MULTIPLIER;
    result
}

pub(super) fn parse(content: &str, now: DateTime<Utc>) -> ImportResult<Vec<ImportedRecord>> {
    let mut rdr = reader(content);
    let headers = rdr
        .headers()
        .map_err(|e| ImportError::parse(SOURCE, format!("Invalid CSV header: {}", e)))?
        .clone();

    let mut records = Vec::new();
    for (index, row) in rdr.records().enumerate() {
        let record = match row {
            Ok(row) => record_from_raw(row_to_value(&headers, &row), SOURCE, now),
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(index as u64 + 2);
                failed_record(
                    serde_json::json!({ "line": line }),
                    SOURCE,
                    now,
                    format!("Row {} could not be decoded: {}", index + 1, e),
                )
            }
        };
        records.push(record);
    }

    Ok(records)
}
