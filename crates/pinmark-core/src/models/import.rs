use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;
use std::str::FromStr;

/// Document-type marker every Netscape bookmark export starts with.
pub const NETSCAPE_DOCTYPE: &str = "<!DOCTYPE NETSCAPE-Bookmark-file-1>";

/// Supported import formats
///
/// Closed set: validators and parsers match on it exhaustively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    /// Pinmark's own export format
    Native,
    /// A bare JSON list, or an object holding a `bookmarks` list
    Json,
    Csv,
    /// Chrome's `Bookmarks` JSON file
    Chrome,
    /// Netscape bookmark HTML, exported by Firefox, Safari and most browsers
    Netscape,
}

impl ImportSource {
    pub const ALL: [ImportSource; 5] = [
        ImportSource::Native,
        ImportSource::Json,
        ImportSource::Csv,
        ImportSource::Chrome,
        ImportSource::Netscape,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportSource::Native => "native",
            ImportSource::Json => "json",
            ImportSource::Csv => "csv",
            ImportSource::Chrome => "chrome",
            ImportSource::Netscape => "netscape",
        }
    }

    /// Format implied by an upload's file extension.
    ///
    /// `.json` maps to the generic JSON format; native and Chrome files share the
    /// extension and are told apart by [`ImportSource::detect`].
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())?;
        match ext.as_str() {
            "json" => Some(ImportSource::Json),
            "csv" => Some(ImportSource::Csv),
            "html" | "htm" => Some(ImportSource::Netscape),
            _ => None,
        }
    }

    /// Sniff the format from file content.
    pub fn detect(content: &str) -> Self {
        let trimmed = content.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
                if let Some(obj) = value.as_object() {
                    if obj.contains_key("metadata") && obj.contains_key("bookmarks") {
                        return ImportSource::Native;
                    }
                    if obj.contains_key("roots") {
                        return ImportSource::Chrome;
                    }
                }
                return ImportSource::Json;
            }
        }
        if contains_netscape_marker(trimmed) {
            return ImportSource::Netscape;
        }
        ImportSource::Csv
    }
}

/// Case-insensitive check for the Netscape document-type marker.
pub fn contains_netscape_marker(content: &str) -> bool {
    content
        .to_ascii_uppercase()
        .contains(&NETSCAPE_DOCTYPE.to_ascii_uppercase())
}

impl Display for ImportSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportSource {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(ImportSource::Native),
            "json" => Ok(ImportSource::Json),
            "csv" => Ok(ImportSource::Csv),
            "chrome" => Ok(ImportSource::Chrome),
            "netscape" | "html" => Ok(ImportSource::Netscape),
            _ => Err(anyhow::anyhow!("Invalid import source: {}", s)),
        }
    }
}

/// What to do when an incoming record matches an existing bookmark
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateStrategy {
    #[default]
    Skip,
    Update,
    CreateDuplicate,
}

impl Display for DuplicateStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DuplicateStrategy::Skip => write!(f, "skip"),
            DuplicateStrategy::Update => write!(f, "update"),
            DuplicateStrategy::CreateDuplicate => write!(f, "create_duplicate"),
        }
    }
}

impl FromStr for DuplicateStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(DuplicateStrategy::Skip),
            "update" => Ok(DuplicateStrategy::Update),
            "create_duplicate" => Ok(DuplicateStrategy::CreateDuplicate),
            _ => Err(anyhow::anyhow!("Invalid duplicate strategy: {}", s)),
        }
    }
}

/// Job configuration, fixed at submission time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOptions {
    pub source: ImportSource,
    #[serde(default)]
    pub duplicate_strategy: DuplicateStrategy,
    #[serde(default)]
    pub default_category: Option<String>,
    /// Soft-validate only.
    #[serde(default)]
    pub validate: bool,
    /// Run resolution without persisting anything.
    #[serde(default)]
    pub dry_run: bool,
}

impl ImportOptions {
    pub fn new(source: ImportSource) -> Self {
        Self {
            source,
            duplicate_strategy: DuplicateStrategy::default(),
            default_category: None,
            validate: false,
            dry_run: false,
        }
    }

    pub fn with_strategy(mut self, strategy: DuplicateStrategy) -> Self {
        self.duplicate_strategy = strategy;
        self
    }

    pub fn with_default_category(mut self, category: impl Into<String>) -> Self {
        self.default_category = Some(category.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Advisory pre-flight result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub estimated_records: usize,
    pub detected_format: String,
    pub preview: Vec<serde_json::Value>,
}

impl ImportValidationResult {
    pub fn valid(detected_format: ImportSource) -> Self {
        Self {
            valid: true,
            detected_format: detected_format.to_string(),
            ..Default::default()
        }
    }

    pub fn invalid(detected_format: ImportSource, error: impl Into<String>) -> Self {
        Self {
            valid: false,
            errors: vec![error.into()],
            detected_format: detected_format.to_string(),
            ..Default::default()
        }
    }
}

/// Canonical bookmark shape every source format converges to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedBookmark {
    pub content: String,
    pub author_username: String,
    pub author_display_name: String,
    pub author_avatar_url: Option<String>,
    pub media_urls: BTreeSet<String>,
    pub links: BTreeSet<String>,
    pub hashtags: BTreeSet<String>,
    pub mentions: BTreeSet<String>,
    pub tags: BTreeSet<String>,
    pub bookmarked_at: DateTime<Utc>,
    pub is_archived: bool,
    pub import_source: ImportSource,
    pub imported_at: DateTime<Utc>,
}

impl NormalizedBookmark {
    /// Record with every field at its default, stamped with `now`.
    pub fn empty(import_source: ImportSource, now: DateTime<Utc>) -> Self {
        Self {
            content: String::new(),
            author_username: String::new(),
            author_display_name: String::new(),
            author_avatar_url: None,
            media_urls: BTreeSet::new(),
            links: BTreeSet::new(),
            hashtags: BTreeSet::new(),
            mentions: BTreeSet::new(),
            tags: BTreeSet::new(),
            bookmarked_at: now,
            is_archived: false,
            import_source,
            imported_at: now,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Imported,
    Skipped,
    Error,
}

/// One record's working state during a job run. Never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportedRecord {
    pub original_data: serde_json::Value,
    pub normalized_data: NormalizedBookmark,
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub hash: String,
}

impl ImportedRecord {
    pub fn mark_skipped(&mut self) {
        self.status = RecordStatus::Skipped;
    }

    pub fn mark_error(&mut self, message: impl Into<String>) {
        self.status = RecordStatus::Error;
        self.error = Some(message.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_source_from_filename() {
        assert_eq!(
            ImportSource::from_filename("export.JSON"),
            Some(ImportSource::Json)
        );
        assert_eq!(
            ImportSource::from_filename("pins.csv"),
            Some(ImportSource::Csv)
        );
        assert_eq!(
            ImportSource::from_filename("bookmarks.htm"),
            Some(ImportSource::Netscape)
        );
        assert_eq!(ImportSource::from_filename("bookmarks.xml"), None);
        assert_eq!(ImportSource::from_filename("Bookmarks"), None);
    }

    #[test]
    fn test_import_source_detect() {
        assert_eq!(
            ImportSource::detect(r#"{"metadata":{},"bookmarks":[]}"#),
            ImportSource::Native
        );
        assert_eq!(
            ImportSource::detect(r#"{"roots":{"bookmark_bar":{}}}"#),
            ImportSource::Chrome
        );
        assert_eq!(ImportSource::detect(r#"[{"text":"x"}]"#), ImportSource::Json);
        assert_eq!(
            ImportSource::detect("<!doctype netscape-bookmark-file-1>\n<DL>"),
            ImportSource::Netscape
        );
        assert_eq!(ImportSource::detect("content,author\nx,y"), ImportSource::Csv);
    }

    #[test]
    fn test_import_source_round_trips_through_str() {
        for source in ImportSource::ALL {
            assert_eq!(source.to_string().parse::<ImportSource>().unwrap(), source);
        }
        assert!("xml".parse::<ImportSource>().is_err());
    }

    #[test]
    fn test_options_deserialize_camel_case_with_defaults() {
        let options: ImportOptions = serde_json::from_value(serde_json::json!({
            "source": "csv",
            "duplicateStrategy": "create_duplicate",
            "dryRun": true
        }))
        .unwrap();
        assert_eq!(options.source, ImportSource::Csv);
        assert_eq!(options.duplicate_strategy, DuplicateStrategy::CreateDuplicate);
        assert!(options.dry_run);
        assert!(!options.validate);
        assert_eq!(options.default_category, None);
    }

    #[test]
    fn test_validation_result_serializes_camel_case() {
        let result = ImportValidationResult::invalid(ImportSource::Csv, "no rows");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["valid"], false);
        assert_eq!(json["estimatedRecords"], 0);
        assert_eq!(json["detectedFormat"], "csv");
        assert_eq!(json["errors"][0], "no rows");
    }
}
