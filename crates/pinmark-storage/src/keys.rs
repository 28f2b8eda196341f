//! Shared key generation for storage backends.
//!
//! Key format: `imports/{user_id}/{job_id}/{filename}`.

use pinmark_core::constants::IMPORT_KEY_PREFIX;
use uuid::Uuid;

/// Generate the staging key for an uploaded import file.
///
/// Only the final path component of `filename` is kept, and characters outside
/// `[A-Za-z0-9._-]` are replaced with `_`, so the key can never escape its job prefix.
pub fn import_staging_key(user_id: Uuid, job_id: Uuid, filename: &str) -> String {
    format!(
        "{}/{}/{}/{}",
        IMPORT_KEY_PREFIX,
        user_id,
        job_id,
        sanitize_filename(filename)
    )
}

fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_namespaced_by_user_and_job() {
        let user = Uuid::new_v4();
        let job = Uuid::new_v4();
        assert_eq!(
            import_staging_key(user, job, "bookmarks.html"),
            format!("imports/{}/{}/bookmarks.html", user, job)
        );
    }

    #[test]
    fn filename_cannot_escape_prefix() {
        let user = Uuid::new_v4();
        let job = Uuid::new_v4();
        let key = import_staging_key(user, job, "../../etc/passwd");
        assert_eq!(key, format!("imports/{}/{}/passwd", user, job));

        let key = import_staging_key(user, job, "..");
        assert!(key.ends_with("/upload"));
        assert!(!key.contains(".."));
    }

    #[test]
    fn unsafe_characters_are_replaced() {
        let key = import_staging_key(Uuid::nil(), Uuid::nil(), "my export (1).csv");
        assert!(key.ends_with("/my_export__1_.csv"));
    }
}
