//! Netscape bookmark HTML, the export format shared by Firefox, Safari and Edge.
//!
//! Every `<A HREF>` is one bookmark. `ADD_DATE` is in seconds and is converted to
//! milliseconds here so the normalizer's numeric-date rule applies. `<H3>` folder
//! headings are flattened away.

use chrono::{DateTime, Utc};
use pinmark_core::models::{
    contains_netscape_marker, ImportSource, ImportValidationResult, ImportedRecord,
    NETSCAPE_DOCTYPE,
};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::{json, Value};
use std::sync::LazyLock;

use super::record_from_raw;
use crate::error::{ImportError, ImportResult};

const SOURCE: ImportSource = ImportSource::Netscape;

/// Cheap anchor count used by the validator instead of a full parse.
static ANCHOR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<a\s[^>]*href\s*=").expect("anchor pattern is valid"));

/// Href and inner text of an anchor, for the validation preview.
static ANCHOR_PREVIEW_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
        .expect("anchor preview pattern is valid")
});

pub(super) fn validate(content: &str) -> ImportValidationResult {
    if !contains_netscape_marker(content) {
        return ImportValidationResult::invalid(
            SOURCE,
            format!("Missing {} marker", NETSCAPE_DOCTYPE),
        );
    }

    let mut result = ImportValidationResult::valid(SOURCE);
    result.estimated_records = ANCHOR_PATTERN.find_iter(content).count();
    result.preview = ANCHOR_PREVIEW_PATTERN
        .captures_iter(content)
        .take(pinmark_core::constants::VALIDATION_PREVIEW_LIMIT)
        .map(|caps| {
            json!({
                "url": caps.get(1).map(|m| m.as_str()).unwrap_or_default(),
                "title": caps.get(2).map(|m| m.as_str().trim()).unwrap_or_default(),
            })
        })
        .collect();

    if result.estimated_records == 0 {
        result
            .warnings
            .push("No bookmark links found in the file".to_string());
    }
    result
}

fn anchor_to_raw(anchor: ElementRef<'_>) -> Value {
    let attrs = anchor.value();
    let title: String = anchor.text().collect::<String>().trim().to_string();

    let mut raw = json!({
        "title": title,
        "url": attrs.attr("href").unwrap_or_default(),
    });

    if let Some(seconds) = attrs
        .attr("add_date")
        .and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|s| *s > 0)
    {
        raw["bookmarkedAt"] = json!(seconds.saturating_mul(1000));
    }
    if let Some(tags) = attrs.attr("tags").filter(|t| !t.trim().is_empty()) {
        raw["tags"] = json!(tags);
    }
    raw
}

pub(super) fn parse(content: &str, now: DateTime<Utc>) -> ImportResult<Vec<ImportedRecord>> {
    if !contains_netscape_marker(content) {
        return Err(ImportError::parse(
            SOURCE,
            format!("Missing {} marker", NETSCAPE_DOCTYPE),
        ));
    }

    let document = Html::parse_document(content);
    let selector = Selector::parse("a[href]")
        .map_err(|e| ImportError::Internal(format!("Invalid anchor selector: {}", e)))?;

    Ok(document
        .select(&selector)
        .map(|anchor| record_from_raw(anchor_to_raw(anchor), SOURCE, now))
        .collect())
}
