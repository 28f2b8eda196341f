//! Batch executor: the body of one import job.
//!
//! ```text
//! pending -> processing -> completed | failed
//! ```
//!
//! The job moves to `processing` when execution starts. Retrieval and parsing are
//! worth the first 10% of progress. Records are then resolved in fixed-size batches,
//! strictly in order, and progress is written after every batch. A record that fails
//! is counted and the loop moves on; only a failure outside the record loop fails
//! the job. Cleanup runs in both cases.

use chrono::Utc;
use pinmark_core::constants::{IMPORT_BATCH_SIZE, PARSE_PROGRESS_PERCENT};
use pinmark_core::models::{
    ImportBookmarksPayload, ImportJobStatus, ImportSource, ImportedRecord, JobProgress,
    JobResult, JobState, JobStatusUpdate, RecordStatus,
};
use pinmark_db::BookmarkStore;
use pinmark_storage::Storage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

use crate::cleanup::cleanup_import;
use crate::error::{ImportError, ImportResult};
use crate::formats;
use crate::resolver::DuplicateResolver;
use crate::status::JobStatusStore;

/// `10 + round(completed / total * 90)`, capped at 100.
pub fn batch_progress_percent(completed_batches: usize, total_batches: usize) -> u8 {
    if total_batches == 0 {
        return 100;
    }
    let span = f64::from(100 - PARSE_PROGRESS_PERCENT);
    let done = completed_batches.min(total_batches) as f64 / total_batches as f64;
    PARSE_PROGRESS_PERCENT + (done * span).round() as u8
}

pub struct BatchExecutor {
    storage: Arc<dyn Storage>,
    bookmarks: Arc<dyn BookmarkStore>,
    statuses: Arc<dyn JobStatusStore>,
    scratch_dir: PathBuf,
}

impl BatchExecutor {
    pub fn new(
        storage: Arc<dyn Storage>,
        bookmarks: Arc<dyn BookmarkStore>,
        statuses: Arc<dyn JobStatusStore>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            storage,
            bookmarks,
            statuses,
            scratch_dir: scratch_dir.into(),
        }
    }

    fn scratch_path(&self, job_id: Uuid) -> PathBuf {
        self.scratch_dir.join(format!("{}.upload", job_id))
    }

    /// Run one job to completion or failure.
    ///
    /// The returned error is the job-level failure already recorded on the status.
    #[tracing::instrument(
        skip(self, payload),
        fields(
            job.id = %payload.job_id,
            user.id = %payload.user_id,
            import.source = %payload.options.source,
            import.strategy = %payload.options.duplicate_strategy,
        )
    )]
    pub async fn execute(&self, payload: &ImportBookmarksPayload) -> ImportResult<JobResult> {
        let started = std::time::Instant::now();
        self.begin(payload).await?;

        let scratch_path = self.scratch_path(payload.job_id);
        let outcome = self.run(payload, &scratch_path).await;

        let cleanup = cleanup_import(
            self.storage.as_ref(),
            &payload.storage_key,
            Some(&scratch_path),
        )
        .await;

        match outcome {
            Ok(result) => {
                tracing::info!(
                    total_processed = result.total_processed,
                    imported = result.imported,
                    skipped = result.skipped,
                    errors = result.errors,
                    cleanup_clean = cleanup.is_clean(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "Import job completed"
                );
                self.finish(
                    payload.job_id,
                    JobStatusUpdate::default()
                        .status(JobState::Completed)
                        .progress(JobProgress::new(
                            result.total_processed,
                            result.total_processed,
                            100,
                            "Completed",
                        ))
                        .result(result.clone())
                        .completed_now(),
                )
                .await?;
                Ok(result)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    recoverable = e.is_recoverable(),
                    cleanup_clean = cleanup.is_clean(),
                    "Import job failed"
                );
                self.finish(
                    payload.job_id,
                    JobStatusUpdate::default()
                        .status(JobState::Failed)
                        .error(e.to_string())
                        .completed_now(),
                )
                .await?;
                Err(e)
            }
        }
    }

    /// Mark the job as processing, recreating the status if it expired while queued.
    ///
    /// The estimated total recorded at submission stays until parsing replaces it.
    async fn begin(&self, payload: &ImportBookmarksPayload) -> ImportResult<()> {
        let estimated_total = match self.statuses.get(payload.job_id).await? {
            Some(status) => status.progress.total,
            None => {
                tracing::debug!("No status for job, creating one");
                self.statuses
                    .create(ImportJobStatus::pending(
                        payload.job_id,
                        payload.user_id,
                        0,
                    ))
                    .await?;
                0
            }
        };
        self.statuses
            .update(
                payload.job_id,
                JobStatusUpdate::default()
                    .status(JobState::Processing)
                    .progress(JobProgress::new(0, estimated_total, 0, "Downloading file")),
            )
            .await?;
        Ok(())
    }

    async fn finish(&self, job_id: Uuid, update: JobStatusUpdate) -> ImportResult<()> {
        if let Some(status) = self.statuses.update(job_id, update).await? {
            self.statuses.push_history(status).await?;
        }
        Ok(())
    }

    async fn report_progress(&self, job_id: Uuid, progress: JobProgress) -> ImportResult<()> {
        self.statuses
            .update(job_id, JobStatusUpdate::default().progress(progress))
            .await?;
        Ok(())
    }

    async fn run(
        &self,
        payload: &ImportBookmarksPayload,
        scratch_path: &Path,
    ) -> ImportResult<JobResult> {
        let options = &payload.options;
        let mut records = self
            .fetch_and_parse(&payload.storage_key, scratch_path, options.source)
            .await?;
        let total = records.len();

        self.report_progress(
            payload.job_id,
            JobProgress::new(
                0,
                total,
                PARSE_PROGRESS_PERCENT,
                format!("Parsed {} records", total),
            ),
        )
        .await?;

        let mut result = JobResult::default();
        let category_id = match options.default_category.as_deref() {
            Some(name) => {
                let found = self
                    .bookmarks
                    .find_category_by_name(payload.user_id, name)
                    .await?;
                if found.is_none() {
                    tracing::warn!(category = %name, "Default category not found");
                    result.push_warning(format!(
                        "Default category '{}' not found; bookmarks were imported without a category",
                        name
                    ));
                }
                found.map(|c| c.id)
            }
            None => None,
        };

        let resolver = DuplicateResolver::new(
            self.bookmarks.clone(),
            payload.user_id,
            options.duplicate_strategy,
        )
        .dry_run(options.dry_run || options.validate)
        .with_category(category_id);

        let total_batches = total.div_ceil(IMPORT_BATCH_SIZE);
        let mut processed = 0;
        for (batch_index, batch) in records.chunks_mut(IMPORT_BATCH_SIZE).enumerate() {
            for record in batch.iter_mut() {
                processed += 1;
                self.resolve_record(&resolver, record, processed, &mut result)
                    .await;
            }

            let completed = batch_index + 1;
            tracing::debug!(batch = completed, total_batches, "Import batch processed");
            self.report_progress(
                payload.job_id,
                JobProgress::new(
                    processed,
                    total,
                    batch_progress_percent(completed, total_batches),
                    format!("Processed batch {}/{}", completed, total_batches),
                ),
            )
            .await?;
        }

        result.total_processed = total;
        Ok(result)
    }

    async fn fetch_and_parse(
        &self,
        storage_key: &str,
        scratch_path: &Path,
        source: ImportSource,
    ) -> ImportResult<Vec<ImportedRecord>> {
        let size = self
            .storage
            .download_to_path(storage_key, scratch_path)
            .await?;
        tracing::debug!(size_bytes = size, "Staged import file downloaded");

        let bytes = tokio::fs::read(scratch_path).await?;
        let content = String::from_utf8(bytes)
            .map_err(|_| ImportError::parse(source, "File is not valid UTF-8"))?;

        let now = Utc::now();
        tokio::task::spawn_blocking(move || formats::parse(source, &content, now))
            .await
            .map_err(|e| ImportError::Internal(format!("Parser task failed: {}", e)))?
    }

    /// Resolve one record and count it exactly once.
    async fn resolve_record(
        &self,
        resolver: &DuplicateResolver,
        record: &mut ImportedRecord,
        position: usize,
        result: &mut JobResult,
    ) {
        if record.status == RecordStatus::Error {
            let message = record.error.clone().unwrap_or_default();
            tracing::warn!(record = position, error = %message, "Import record unreadable");
            result.errors += 1;
            result.push_warning(format!("Record {}: {}", position, message));
            return;
        }

        match resolver.resolve(&record.normalized_data).await {
            Ok(resolution) if resolution.is_imported() => result.imported += 1,
            Ok(_) => {
                record.mark_skipped();
                result.skipped += 1;
            }
            Err(e) => {
                tracing::warn!(record = position, hash = %record.hash, error = %e, "Import record failed");
                record.mark_error(e.to_string());
                result.errors += 1;
                result.push_warning(format!("Record {}: {}", position, e));
            }
        }
    }
}
