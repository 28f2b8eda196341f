//! End-to-end import pipeline tests.
//!
//! Run with: `cargo test -p pinmark-import --test pipeline_test`

mod helpers;

use async_trait::async_trait;
use helpers::{json_records, native_export, new_bookmark, setup_test_pipeline};
use pinmark_core::models::{DuplicateStrategy, ImportOptions, ImportSource, JobState};
use pinmark_import::{BatchExecutor, JobStatusStore};
use pinmark_storage::{LocalStorage, Storage, StorageError, StorageResult, StoredFile};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Local storage that refuses every delete.
struct UndeletableStorage(Arc<LocalStorage>);

#[async_trait]
impl Storage for UndeletableStorage {
    async fn upload_file(
        &self,
        storage_key: &str,
        local_path: &Path,
        metadata: &HashMap<String, String>,
    ) -> StorageResult<StoredFile> {
        self.0.upload_file(storage_key, local_path, metadata).await
    }

    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        self.0.upload_with_key(storage_key, data, content_type).await
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        self.0.download(storage_key).await
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        Err(StorageError::DeleteFailed(format!(
            "{}: permission denied",
            storage_key
        )))
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        self.0.exists(storage_key).await
    }
}

#[tokio::test]
async fn test_example_json_import() {
    let pipeline = setup_test_pipeline().await;
    let user = Uuid::new_v4();

    let (payload, result) = pipeline
        .run(
            user,
            "bookmarks.json",
            r#"[{"content":"hello","authorUsername":"a","bookmarkedAt":"2024-01-01T00:00:00Z"}]"#,
            ImportOptions::new(ImportSource::Json).with_strategy(DuplicateStrategy::Skip),
        )
        .await;

    let result = result.unwrap();
    assert_eq!(result.total_processed, 1);
    assert_eq!(result.imported, 1);
    assert_eq!(result.skipped, 0);
    assert_eq!(result.errors, 0);

    let status = pipeline.statuses.get(payload.job_id).await.unwrap().unwrap();
    assert_eq!(status.status, JobState::Completed);
    assert_eq!(status.progress.percentage, 100);
    assert_eq!(status.result, Some(result));
    assert!(status.completed_at.is_some());

    let stored = pipeline.bookmarks.bookmarks_for(user);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].content, "hello");
    assert_eq!(stored[0].import_source.as_deref(), Some("json"));
}

#[tokio::test]
async fn test_native_round_trip_skips_everything() {
    let pipeline = setup_test_pipeline().await;
    let user = Uuid::new_v4();
    for i in 0..7 {
        pipeline
            .bookmarks
            .seed(new_bookmark(user, &format!("saved {}", i), "alice"));
    }
    let export = native_export(&pipeline.bookmarks.bookmarks_for(user));

    let (_, result) = pipeline
        .run(
            user,
            "pinmark-export.json",
            &export,
            ImportOptions::new(ImportSource::Native),
        )
        .await;

    let result = result.unwrap();
    assert_eq!(result.total_processed, 7);
    assert_eq!(result.skipped, result.total_processed);
    assert_eq!(result.imported, 0);
    assert_eq!(pipeline.bookmarks.bookmarks_for(user).len(), 7);
}

#[tokio::test]
async fn test_one_bad_record_does_not_fail_the_batch() {
    let pipeline = setup_test_pipeline().await;
    let user = Uuid::new_v4();
    let mut records = json_records(50);
    records[25] = json!({"content": "", "authorUsername": "a"});

    let (payload, result) = pipeline
        .run(
            user,
            "bookmarks.json",
            &Value::Array(records).to_string(),
            ImportOptions::new(ImportSource::Json),
        )
        .await;

    let result = result.unwrap();
    assert_eq!(result.total_processed, 50);
    assert_eq!(result.imported + result.skipped, 49);
    assert_eq!(result.errors, 1);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].starts_with("Record 26"));

    let status = pipeline.statuses.get(payload.job_id).await.unwrap().unwrap();
    assert_eq!(status.status, JobState::Completed);
    assert_eq!(pipeline.bookmarks.bookmarks_for(user).len(), 49);
}

#[tokio::test]
async fn test_store_failure_is_isolated_to_its_record() {
    let pipeline = setup_test_pipeline().await;
    let user = Uuid::new_v4();
    pipeline.bookmarks.fail_writes_for("bookmark 3");

    let (_, result) = pipeline
        .run(
            user,
            "bookmarks.json",
            &Value::Array(json_records(10)).to_string(),
            ImportOptions::new(ImportSource::Json),
        )
        .await;

    let result = result.unwrap();
    assert_eq!(result.imported, 9);
    assert_eq!(result.errors, 1);
    assert!(result.warnings[0].contains("simulated write failure"));
}

#[tokio::test]
async fn test_warnings_are_capped_at_fifty() {
    let pipeline = setup_test_pipeline().await;
    let records: Vec<Value> = (0..80).map(|_| json!({"url": "https://x.dev"})).collect();

    let (_, result) = pipeline
        .run(
            Uuid::new_v4(),
            "bookmarks.json",
            &Value::Array(records).to_string(),
            ImportOptions::new(ImportSource::Json),
        )
        .await;

    let result = result.unwrap();
    assert_eq!(result.errors, 80);
    assert_eq!(result.warnings.len(), 50);
}

#[tokio::test]
async fn test_duplicates_within_one_file_see_earlier_records() {
    let pipeline = setup_test_pipeline().await;
    let user = Uuid::new_v4();
    let record = json!({"content": "same", "authorUsername": "a"});

    let (_, result) = pipeline
        .run(
            user,
            "bookmarks.json",
            &json!([record, record]).to_string(),
            ImportOptions::new(ImportSource::Json),
        )
        .await;

    let result = result.unwrap();
    assert_eq!(result.imported, 1);
    assert_eq!(result.skipped, 1);
    assert_eq!(pipeline.bookmarks.bookmarks_for(user).len(), 1);
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let pipeline = setup_test_pipeline().await;
    let user = Uuid::new_v4();
    pipeline.bookmarks.seed(new_bookmark(user, "bookmark 0", "a"));
    let mut records = json_records(4);
    records.push(json!({"content": "   "}));

    let (_, result) = pipeline
        .run(
            user,
            "bookmarks.json",
            &Value::Array(records).to_string(),
            ImportOptions::new(ImportSource::Json).dry_run(true),
        )
        .await;

    let result = result.unwrap();
    assert_eq!(result.total_processed, 5);
    // validity only: the existing duplicate still counts as imported
    assert_eq!(result.imported, 4);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.errors, 0);
    assert_eq!(pipeline.bookmarks.bookmarks_for(user).len(), 1);
}

#[tokio::test]
async fn test_default_category_is_applied() {
    let pipeline = setup_test_pipeline().await;
    let user = Uuid::new_v4();
    let category = pipeline.bookmarks.add_category(user, "Imported");

    let (_, result) = pipeline
        .run(
            user,
            "bookmarks.json",
            &Value::Array(json_records(3)).to_string(),
            ImportOptions::new(ImportSource::Json).with_default_category("Imported"),
        )
        .await;

    let result = result.unwrap();
    assert!(result.warnings.is_empty());
    assert!(pipeline
        .bookmarks
        .bookmarks_for(user)
        .iter()
        .all(|b| b.category_id == Some(category.id)));
}

#[tokio::test]
async fn test_missing_default_category_is_a_warning() {
    let pipeline = setup_test_pipeline().await;
    let user = Uuid::new_v4();

    let (_, result) = pipeline
        .run(
            user,
            "bookmarks.json",
            &Value::Array(json_records(2)).to_string(),
            ImportOptions::new(ImportSource::Json).with_default_category("Nope"),
        )
        .await;

    let result = result.unwrap();
    assert_eq!(result.imported, 2);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("Nope"));
    assert!(pipeline
        .bookmarks
        .bookmarks_for(user)
        .iter()
        .all(|b| b.category_id.is_none()));
}

#[tokio::test]
async fn test_staged_file_is_cleaned_up() {
    let pipeline = setup_test_pipeline().await;

    let (payload, result) = pipeline
        .run(
            Uuid::new_v4(),
            "bookmarks.json",
            &Value::Array(json_records(2)).to_string(),
            ImportOptions::new(ImportSource::Json),
        )
        .await;

    result.unwrap();
    assert!(!pipeline.storage.exists(&payload.storage_key).await.unwrap());
    let scratch = pipeline.dir.path().join("scratch");
    let leftovers = std::fs::read_dir(&scratch)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

#[tokio::test]
async fn test_cleanup_failure_does_not_fail_the_job() {
    let pipeline = setup_test_pipeline().await;
    let user = Uuid::new_v4();
    let (_, payload) = pipeline
        .submit(
            user,
            "bookmarks.json",
            &Value::Array(json_records(3)).to_string(),
            ImportOptions::new(ImportSource::Json),
        )
        .await;

    let executor = BatchExecutor::new(
        Arc::new(UndeletableStorage(pipeline.storage.clone())),
        Arc::new(pipeline.bookmarks.clone()),
        Arc::new(pipeline.statuses.clone()),
        pipeline.dir.path().join("scratch"),
    );
    let result = executor.execute(&payload).await.unwrap();
    assert_eq!(result.imported, 3);

    let status = pipeline.statuses.get(payload.job_id).await.unwrap().unwrap();
    assert_eq!(status.status, JobState::Completed);
    assert!(status.error.is_none());
    assert!(pipeline.storage.exists(&payload.storage_key).await.unwrap());
    assert_eq!(pipeline.bookmarks.bookmarks_for(user).len(), 3);
}

#[tokio::test]
async fn test_unparseable_file_fails_the_job() {
    let pipeline = setup_test_pipeline().await;
    let user = Uuid::new_v4();
    let (_, payload) = pipeline
        .submit(
            user,
            "bookmarks.json",
            r#"[{"content":"ok"}]"#,
            ImportOptions::new(ImportSource::Json),
        )
        .await;
    // Replace the staged content after validation passed
    pipeline
        .storage
        .upload_with_key(&payload.storage_key, b"{not json".to_vec(), "application/json")
        .await
        .unwrap();

    let err = pipeline.state.executor().execute(&payload).await.unwrap_err();
    assert!(!err.is_recoverable());

    let status = pipeline.statuses.get(payload.job_id).await.unwrap().unwrap();
    assert_eq!(status.status, JobState::Failed);
    assert!(status.error.unwrap().contains("json"));
    assert!(status.result.is_none());
    assert!(!pipeline.storage.exists(&payload.storage_key).await.unwrap());

    let history = pipeline.state.service().history(user, None).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, JobState::Failed);
}

#[tokio::test]
async fn test_history_lists_newest_first() {
    let pipeline = setup_test_pipeline().await;
    let user = Uuid::new_v4();

    let mut job_ids = Vec::new();
    for _ in 0..3 {
        let (payload, result) = pipeline
            .run(
                user,
                "bookmarks.json",
                &Value::Array(json_records(1)).to_string(),
                ImportOptions::new(ImportSource::Json),
            )
            .await;
        result.unwrap();
        job_ids.push(payload.job_id);
    }

    let history = pipeline.state.service().history(user, Some(2)).await.unwrap();
    let got: Vec<_> = history.iter().map(|s| s.job_id).collect();
    assert_eq!(got, vec![job_ids[2], job_ids[1]]);
}

#[tokio::test]
async fn test_every_format_imports_through_the_task_handler() {
    let pipeline = setup_test_pipeline().await;
    let user = Uuid::new_v4();

    let netscape = "<!DOCTYPE NETSCAPE-Bookmark-file-1>\n<DL><p>\n\
        <DT><A HREF=\"https://www.rust-lang.org\" ADD_DATE=\"1704067200\">Rust</A>\n</DL><p>\n";
    let chrome = json!({
        "roots": {"bookmark_bar": {"type": "folder", "name": "Bar", "children": [
            {"type": "url", "name": "Tokio", "url": "https://tokio.rs", "date_added": "13348540800000000"}
        ]}}
    })
    .to_string();
    let cases = [
        (ImportSource::Netscape, "bookmarks.html", netscape.to_string()),
        (ImportSource::Chrome, "Bookmarks.json", chrome),
        (ImportSource::Csv, "pins.csv", "title,url\nDocs,https://docs.rs\n".to_string()),
    ];

    for (source, filename, content) in cases {
        let (_, result) = pipeline
            .run_task(user, filename, &content, ImportOptions::new(source))
            .await;
        let value = result.unwrap();
        assert_eq!(value["imported"], 1, "{} import", source);
    }

    let stored = pipeline.bookmarks.bookmarks_for(user);
    assert_eq!(stored.len(), 3);
    assert!(stored
        .iter()
        .any(|b| b.links.contains(&"https://tokio.rs".to_string())));
}
