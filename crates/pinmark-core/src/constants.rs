//! Pipeline-wide constants.

/// Number of records resolved between two progress writes.
pub const IMPORT_BATCH_SIZE: usize = 50;

/// Maximum number of human-readable warnings kept on a job result.
pub const MAX_IMPORT_WARNINGS: usize = 50;

/// Number of jobs kept in a user's import history.
pub const IMPORT_HISTORY_LIMIT: usize = 20;

/// Number of raw records returned in a validation preview.
pub const VALIDATION_PREVIEW_LIMIT: usize = 5;

/// Upper bound on bookmark content length, in characters.
pub const MAX_CONTENT_LENGTH: usize = 2000;

/// Default retention window for job status entries.
pub const DEFAULT_STATUS_TTL_SECS: i64 = 24 * 60 * 60;

/// Progress percentage reached once the staged file is retrieved and parsed.
pub const PARSE_PROGRESS_PERCENT: u8 = 10;

/// Prefix of every staged upload key.
pub const IMPORT_KEY_PREFIX: &str = "imports";
