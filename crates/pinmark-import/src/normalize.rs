//! Field mapping shared by every parser.
//!
//! `normalize` is total: any JSON value maps to a canonical record. Missing fields
//! take the documented defaults below instead of producing an error; record validity
//! is judged later by the resolver.
//!
//! | field | source keys (first match wins) | default |
//! |---|---|---|
//! | content | `content`, `text`, `title`, `name` | `""` |
//! | author username | `authorUsername`, `author_username`, `author`, `username` | `""` |
//! | author display name | `authorDisplayName`, `author_display_name`, `authorName`, `displayName` | username |
//! | avatar | `authorAvatarUrl`, `author_avatar_url` | none |
//! | media | `mediaUrls`, `media_urls`, `media` | empty |
//! | bookmarked at | `bookmarkedAt`, `bookmarked_at`, `createdAt`, `created_at`, `date` | `now` |
//! | archived | `isArchived`, `is_archived`, `archived` | `false` |

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use pinmark_core::models::{ImportSource, NormalizedBookmark};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

const CONTENT_KEYS: &[&str] = &["content", "text", "title", "name"];
const AUTHOR_KEYS: &[&str] = &["authorUsername", "author_username", "author", "username"];
const DISPLAY_NAME_KEYS: &[&str] = &[
    "authorDisplayName",
    "author_display_name",
    "authorName",
    "displayName",
];
const AVATAR_KEYS: &[&str] = &["authorAvatarUrl", "author_avatar_url"];
const MEDIA_KEYS: &[&str] = &["mediaUrls", "media_urls", "media"];
const DATE_KEYS: &[&str] = &[
    "bookmarkedAt",
    "bookmarked_at",
    "createdAt",
    "created_at",
    "date",
];
const ARCHIVED_KEYS: &[&str] = &["isArchived", "is_archived", "archived"];

/// Convert one raw record into the canonical shape.
///
/// `now` stamps `importedAt` and is the fallback for absent or unparseable dates.
pub fn normalize(raw: &Value, source: ImportSource, now: DateTime<Utc>) -> NormalizedBookmark {
    let mut record = NormalizedBookmark::empty(source, now);
    let Some(obj) = raw.as_object() else {
        return record;
    };

    record.content = first_string(obj, CONTENT_KEYS).unwrap_or_default();
    record.author_username = first_string(obj, AUTHOR_KEYS).unwrap_or_default();
    record.author_display_name = first_string(obj, DISPLAY_NAME_KEYS)
        .unwrap_or_else(|| record.author_username.clone());
    record.author_avatar_url = first_string(obj, AVATAR_KEYS);

    record.media_urls = first_value(obj, MEDIA_KEYS)
        .map(string_set)
        .unwrap_or_default();
    record.links = obj.get("links").map(string_set).unwrap_or_default();
    record.hashtags = obj.get("hashtags").map(string_set).unwrap_or_default();
    record.mentions = obj.get("mentions").map(string_set).unwrap_or_default();
    record.tags = obj.get("tags").map(string_set).unwrap_or_default();

    if let Some(url) = obj.get("url").and_then(scalar_string) {
        record.links.insert(url);
    }

    record.bookmarked_at = first_value(obj, DATE_KEYS)
        .and_then(|v| parse_date(v, source))
        .unwrap_or(now);
    record.is_archived = first_value(obj, ARCHIVED_KEYS)
        .map(parse_bool)
        .unwrap_or(false);

    record
}

fn first_value<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find(|v| !v.is_null())
}

/// First key holding a non-empty scalar, trimmed.
/// The content a raw record would normalize to, if any.
pub(crate) fn raw_content(raw: &Value) -> Option<String> {
    first_string(raw.as_object()?, CONTENT_KEYS)
}

fn first_string(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(scalar_string)
}

fn scalar_string(value: &Value) -> Option<String> {
    let s = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!s.is_empty()).then_some(s)
}

/// A list, or a comma/semicolon separated string, as a set of trimmed non-empty entries.
pub fn string_set(value: &Value) -> BTreeSet<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_string).collect(),
        Value::String(s) => s
            .split([',', ';'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => BTreeSet::new(),
    }
}

/// Numeric epochs are milliseconds, except Chrome exports which use microseconds.
fn from_epoch(value: i64, source: ImportSource) -> Option<DateTime<Utc>> {
    match source {
        ImportSource::Chrome => DateTime::from_timestamp_micros(value),
        _ => DateTime::from_timestamp_millis(value),
    }
}

pub fn parse_date(value: &Value, source: ImportSource) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(n) => {
            let epoch = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            from_epoch(epoch, source)
        }
        Value::String(s) => {
            let s = s.trim();
            if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) {
                return s.parse::<i64>().ok().and_then(|v| from_epoch(v, source));
            }
            parse_date_str(s)
        }
        _ => None,
    }
}

fn parse_date_str(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn parse_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => matches!(s.trim().to_lowercase().as_str(), "true" | "1" | "yes"),
        _ => false,
    }
}
