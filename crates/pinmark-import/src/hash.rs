//! Content fingerprint used as a cheap duplicate hint.

use chrono::SecondsFormat;
use pinmark_core::models::NormalizedBookmark;
use sha2::{Digest, Sha256};

/// Hex characters kept from the SHA-256 digest.
pub const FINGERPRINT_LEN: usize = 16;

/// SHA-256 over `content|authorUsername|bookmarkedAt`, truncated to 16 hex characters.
///
/// `bookmarkedAt` is rendered at whatever precision it carries, down to the
/// microseconds of a Chrome export.
///
/// Only those three fields contribute, so the same bookmark hashes identically no
/// matter which format it arrived in.
pub fn fingerprint(record: &NormalizedBookmark) -> String {
    let mut hasher = Sha256::new();
    hasher.update(record.content.as_bytes());
    hasher.update(b"|");
    hasher.update(record.author_username.as_bytes());
    hasher.update(b"|");
    hasher.update(
        record
            .bookmarked_at
            .to_rfc3339_opts(SecondsFormat::AutoSi, true)
            .as_bytes(),
    );
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use pinmark_core::models::ImportSource;

    fn record(content: &str, author: &str) -> NormalizedBookmark {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut r = NormalizedBookmark::empty(ImportSource::Json, at);
        r.content = content.to_string();
        r.author_username = author.to_string();
        r
    }

    #[test]
    fn fingerprint_is_sixteen_hex_chars() {
        let h = fingerprint(&record("hello", "a"));
        assert_eq!(h.len(), FINGERPRINT_LEN);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn identity_fields_alone_determine_fingerprint() {
        let a = record("hello", "a");
        let mut b = record("hello", "a");
        b.import_source = ImportSource::Netscape;
        b.tags.insert("extra".to_string());
        b.imported_at = b.imported_at + Duration::days(3);
        assert_eq!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn changing_any_identity_field_changes_fingerprint() {
        let base = record("hello", "a");
        let base_hash = fingerprint(&base);

        assert_ne!(fingerprint(&record("hello!", "a")), base_hash);
        assert_ne!(fingerprint(&record("hello", "b")), base_hash);

        let mut later = record("hello", "a");
        later.bookmarked_at = later.bookmarked_at + Duration::milliseconds(1);
        assert_ne!(fingerprint(&later), base_hash);

        let mut micro = record("hello", "a");
        micro.bookmarked_at = micro.bookmarked_at + Duration::microseconds(1);
        assert_ne!(fingerprint(&micro), base_hash);
    }

    #[test]
    fn whole_second_and_millisecond_dates_keep_their_fingerprint_shape() {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(
            at.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            "2024-01-01T00:00:00Z"
        );
        let ms = at + Duration::milliseconds(5);
        assert_eq!(
            ms.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            "2024-01-01T00:00:00.005Z"
        );
    }
}
