//! Submission and query surface of the import pipeline
//!
//! The route layer (out of scope here) calls these in order: `validate` the
//! uploaded content, `stage` the file, `submit` the job, then poll `status`.

use pinmark_core::models::{
    ImportBookmarksPayload, ImportJobStatus, ImportOptions, ImportSource, ImportValidationResult,
    Task,
};
use pinmark_storage::{import_staging_key, Storage, StoredFile};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ImportError, ImportResult};
use crate::formats;
use crate::status::JobStatusStore;

/// A staged upload that passed validation and is ready to queue.
#[derive(Debug, Clone)]
pub struct SubmitImport {
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub staged: StoredFile,
    pub filename: String,
    pub options: ImportOptions,
    pub validation: ImportValidationResult,
}

pub struct ImportService {
    storage: Arc<dyn Storage>,
    statuses: Arc<dyn JobStatusStore>,
    max_file_size_bytes: u64,
    history_limit: usize,
}

impl ImportService {
    pub fn new(
        storage: Arc<dyn Storage>,
        statuses: Arc<dyn JobStatusStore>,
        max_file_size_bytes: u64,
        history_limit: usize,
    ) -> Self {
        Self {
            storage,
            statuses,
            max_file_size_bytes,
            history_limit,
        }
    }

    /// Synchronous pre-flight check. Never fails.
    pub fn validate(&self, content: &str, source: ImportSource) -> ImportValidationResult {
        formats::validate(source, content)
    }

    /// Upload a local file to `imports/{user_id}/{job_id}/{filename}`.
    #[tracing::instrument(skip(self, local_path), fields(user.id = %user_id, job.id = %job_id))]
    pub async fn stage(
        &self,
        user_id: Uuid,
        job_id: Uuid,
        local_path: &Path,
        filename: &str,
    ) -> ImportResult<StoredFile> {
        let size = tokio::fs::metadata(local_path).await?.len();
        if size > self.max_file_size_bytes {
            return Err(ImportError::FileTooLarge {
                size,
                limit: self.max_file_size_bytes,
            });
        }
        if ImportSource::from_filename(filename).is_none() {
            return Err(ImportError::UnsupportedFormat(filename.to_string()));
        }

        let key = import_staging_key(user_id, job_id, filename);
        let metadata = HashMap::from([
            ("user-id".to_string(), user_id.to_string()),
            ("job-id".to_string(), job_id.to_string()),
            ("original-filename".to_string(), filename.to_string()),
        ]);

        let stored = self.storage.upload_file(&key, local_path, &metadata).await?;
        tracing::info!(storage.key = %stored.key, size_bytes = stored.size_bytes, "Import file staged");
        Ok(stored)
    }

    /// Record the job as pending and build the task for the external queue.
    ///
    /// A submission whose validation failed is refused.
    #[tracing::instrument(skip(self, request), fields(job.id = %request.job_id, user.id = %request.user_id))]
    pub async fn submit(&self, request: SubmitImport) -> ImportResult<Task> {
        if !request.validation.valid {
            return Err(ImportError::ValidationFailed(
                request.validation.errors.join("; "),
            ));
        }

        self.statuses
            .create(ImportJobStatus::pending(
                request.job_id,
                request.user_id,
                request.validation.estimated_records,
            ))
            .await?;

        let payload = ImportBookmarksPayload {
            job_id: request.job_id,
            user_id: request.user_id,
            storage_key: request.staged.key,
            filename: request.filename,
            options: request.options,
        };
        let task = Task::new(request.user_id, &payload);

        tracing::info!(
            task.id = %task.id,
            estimated_records = request.validation.estimated_records,
            "Import job submitted"
        );
        Ok(task)
    }

    /// Current status, or `None` when the job is unknown or past its retention window.
    pub async fn status(&self, job_id: Uuid) -> ImportResult<Option<ImportJobStatus>> {
        self.statuses.get(job_id).await
    }

    pub async fn history(
        &self,
        user_id: Uuid,
        limit: Option<usize>,
    ) -> ImportResult<Vec<ImportJobStatus>> {
        let limit = limit
            .unwrap_or(self.history_limit)
            .min(self.history_limit);
        self.statuses.history(user_id, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::InMemoryJobStatusStore;
    use pinmark_core::constants::IMPORT_HISTORY_LIMIT;
    use pinmark_core::models::{JobState, TaskType};
    use pinmark_storage::LocalStorage;
    use tempfile::TempDir;

    async fn service(dir: &TempDir, max_size: u64) -> (ImportService, Arc<LocalStorage>) {
        let storage = Arc::new(
            LocalStorage::new(dir.path().join("store"), "http://localhost/files".to_string())
                .await
                .unwrap(),
        );
        let service = ImportService::new(
            storage.clone(),
            Arc::new(InMemoryJobStatusStore::default()),
            max_size,
            IMPORT_HISTORY_LIMIT,
        );
        (service, storage)
    }

    async fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        tokio::fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn stage_uploads_under_job_prefix() {
        let dir = TempDir::new().unwrap();
        let (service, storage) = service(&dir, 1024).await;
        let path = write(&dir, "pins.csv", "content\nhello\n").await;
        let (user, job) = (Uuid::new_v4(), Uuid::new_v4());

        let stored = service.stage(user, job, &path, "pins.csv").await.unwrap();
        assert_eq!(stored.key, format!("imports/{}/{}/pins.csv", user, job));
        assert!(storage.exists(&stored.key).await.unwrap());
    }

    #[tokio::test]
    async fn stage_enforces_size_cap() {
        let dir = TempDir::new().unwrap();
        let (service, _) = service(&dir, 4).await;
        let path = write(&dir, "pins.csv", "content\nhello\n").await;

        let err = service
            .stage(Uuid::new_v4(), Uuid::new_v4(), &path, "pins.csv")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::FileTooLarge { limit: 4, .. }));
    }

    #[tokio::test]
    async fn stage_rejects_unknown_extensions() {
        let dir = TempDir::new().unwrap();
        let (service, _) = service(&dir, 1024).await;
        let path = write(&dir, "pins.xml", "<xml/>").await;

        let err = service
            .stage(Uuid::new_v4(), Uuid::new_v4(), &path, "pins.xml")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }

    fn request(validation: ImportValidationResult) -> SubmitImport {
        let (user_id, job_id) = (Uuid::new_v4(), Uuid::new_v4());
        SubmitImport {
            job_id,
            user_id,
            staged: StoredFile {
                key: format!("imports/{}/{}/a.json", user_id, job_id),
                url: "http://localhost/files/a.json".to_string(),
                size_bytes: 2,
            },
            filename: "a.json".to_string(),
            options: ImportOptions::new(ImportSource::Json),
            validation,
        }
    }

    #[tokio::test]
    async fn submit_writes_pending_status() {
        let dir = TempDir::new().unwrap();
        let (service, _) = service(&dir, 1024).await;
        let validation = service.validate(r#"[{"content":"a"},{"content":"b"}]"#, ImportSource::Json);
        let req = request(validation);
        let job_id = req.job_id;

        let task = service.submit(req).await.unwrap();
        assert_eq!(task.task_type, TaskType::BookmarkImport);
        let payload = task.payload_as::<ImportBookmarksPayload>().unwrap();
        assert_eq!(payload.job_id, job_id);

        let status = service.status(job_id).await.unwrap().unwrap();
        assert_eq!(status.status, JobState::Pending);
        assert_eq!(status.progress.total, 2);
        assert_eq!(status.progress.current_step, "Queued");
    }

    #[tokio::test]
    async fn submit_refuses_invalid_validation() {
        let dir = TempDir::new().unwrap();
        let (service, _) = service(&dir, 1024).await;
        let validation = service.validate("not json", ImportSource::Json);
        let req = request(validation);
        let job_id = req.job_id;

        let err = service.submit(req).await.unwrap_err();
        assert!(matches!(err, ImportError::ValidationFailed(_)));
        assert!(service.status(job_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unknown_job_has_no_status() {
        let dir = TempDir::new().unwrap();
        let (service, _) = service(&dir, 1024).await;
        assert!(service.status(Uuid::new_v4()).await.unwrap().is_none());
        assert!(service
            .history(Uuid::new_v4(), None)
            .await
            .unwrap()
            .is_empty());
    }
}
