//! Shared setup for import pipeline integration tests.
//!
//! Every test gets its own temp directory, a `LocalStorage` inside it, an in-memory
//! bookmark store and an in-memory job status store.

#![allow(dead_code)]

use chrono::Utc;
use pinmark_core::models::{
    Bookmark, ImportBookmarksPayload, ImportOptions, JobResult, NewBookmark, Task,
};
use pinmark_db::test_helpers::InMemoryBookmarkStore;
use pinmark_import::{
    ImportResult, ImportState, ImportTaskHandler, InMemoryJobStatusStore, SubmitImport,
    TaskHandler,
};
use pinmark_storage::LocalStorage;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

pub struct TestPipeline {
    pub dir: TempDir,
    pub state: Arc<ImportState>,
    pub storage: Arc<LocalStorage>,
    pub bookmarks: InMemoryBookmarkStore,
    pub statuses: InMemoryJobStatusStore,
}

pub async fn setup_test_pipeline() -> TestPipeline {
    let dir = TempDir::new().expect("temp dir");
    let storage = Arc::new(
        LocalStorage::new(dir.path().join("store"), "http://localhost/files".to_string())
            .await
            .expect("local storage"),
    );
    let bookmarks = InMemoryBookmarkStore::new();
    let statuses = InMemoryJobStatusStore::default();
    let state = Arc::new(ImportState {
        storage: storage.clone(),
        bookmarks: Arc::new(bookmarks.clone()),
        statuses: Arc::new(statuses.clone()),
        scratch_dir: dir.path().join("scratch"),
        max_file_size_bytes: 50 * 1024 * 1024,
        history_limit: 20,
    });

    TestPipeline {
        dir,
        state,
        storage,
        bookmarks,
        statuses,
    }
}

impl TestPipeline {
    /// Validate, stage and submit a file the way the route layer would.
    pub async fn submit(
        &self,
        user_id: Uuid,
        filename: &str,
        content: &str,
        options: ImportOptions,
    ) -> (Task, ImportBookmarksPayload) {
        let service = self.state.service();
        let job_id = Uuid::new_v4();

        let local = self.dir.path().join(format!("upload-{}", job_id));
        tokio::fs::write(&local, content).await.expect("write upload");

        let validation = service.validate(content, options.source);
        let staged = service
            .stage(user_id, job_id, &local, filename)
            .await
            .expect("stage upload");
        let task = service
            .submit(SubmitImport {
                job_id,
                user_id,
                staged,
                filename: filename.to_string(),
                options,
                validation,
            })
            .await
            .expect("submit import");
        let payload = task
            .payload_as::<ImportBookmarksPayload>()
            .expect("import payload");
        (task, payload)
    }

    /// Submit and run the executor inline.
    pub async fn run(
        &self,
        user_id: Uuid,
        filename: &str,
        content: &str,
        options: ImportOptions,
    ) -> (ImportBookmarksPayload, ImportResult<JobResult>) {
        let (_, payload) = self.submit(user_id, filename, content, options).await;
        let result = self.state.executor().execute(&payload).await;
        (payload, result)
    }

    /// Submit and run through the task handler, as the worker would.
    pub async fn run_task(
        &self,
        user_id: Uuid,
        filename: &str,
        content: &str,
        options: ImportOptions,
    ) -> (ImportBookmarksPayload, anyhow::Result<Value>) {
        let (task, payload) = self.submit(user_id, filename, content, options).await;
        let result = ImportTaskHandler.process(&task, self.state.clone()).await;
        (payload, result)
    }
}

pub fn new_bookmark(user_id: Uuid, content: &str, author: &str) -> NewBookmark {
    let now = Utc::now();
    NewBookmark {
        user_id,
        content: content.to_string(),
        author_username: author.to_string(),
        author_display_name: author.to_string(),
        author_avatar_url: None,
        media_urls: vec![],
        links: vec![],
        hashtags: vec![],
        mentions: vec![],
        tags: vec![],
        category_id: None,
        bookmarked_at: now,
        is_archived: false,
        import_source: "native".to_string(),
        imported_at: now,
    }
}

/// The collection in Pinmark's own export format.
pub fn native_export(bookmarks: &[Bookmark]) -> String {
    let records: Vec<Value> = bookmarks
        .iter()
        .map(|b| {
            json!({
                "content": b.content,
                "authorUsername": b.author_username,
                "authorDisplayName": b.author_display_name,
                "authorAvatarUrl": b.author_avatar_url,
                "mediaUrls": b.media_urls,
                "links": b.links,
                "hashtags": b.hashtags,
                "mentions": b.mentions,
                "tags": b.tags,
                "bookmarkedAt": b.bookmarked_at.to_rfc3339(),
                "isArchived": b.is_archived,
            })
        })
        .collect();

    json!({
        "metadata": {
            "exportedAt": Utc::now().to_rfc3339(),
            "version": "1.0",
            "totalBookmarks": records.len(),
        },
        "bookmarks": records,
    })
    .to_string()
}

/// A JSON list of `count` distinct records by author `a`.
pub fn json_records(count: usize) -> Vec<Value> {
    (0..count)
        .map(|i| {
            json!({
                "content": format!("bookmark {}", i),
                "authorUsername": "a",
                "bookmarkedAt": "2024-01-01T00:00:00Z",
            })
        })
        .collect()
}
