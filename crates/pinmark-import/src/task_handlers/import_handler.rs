use super::TaskHandler;
use crate::state::ImportState;
use anyhow::Result;
use async_trait::async_trait;
use pinmark_core::models::{ImportBookmarksPayload, Task};
use pinmark_core::TaskError;
use serde_json::json;
use std::sync::Arc;

pub struct ImportTaskHandler;

#[async_trait]
impl TaskHandler for ImportTaskHandler {
    #[tracing::instrument(skip(self, task, state), fields(task.id = %task.id, job.id = tracing::field::Empty))]
    async fn process(&self, task: &Task, state: Arc<ImportState>) -> Result<serde_json::Value> {
        // A payload that does not decode will not decode on retry either
        let payload: ImportBookmarksPayload = task.try_payload_as().map_err(|e| {
            TaskError::unrecoverable(
                anyhow::Error::new(e).context("Failed to parse bookmark import payload"),
            )
        })?;

        tracing::Span::current().record("job.id", payload.job_id.to_string());
        tracing::info!(
            job_id = %payload.job_id,
            source = %payload.options.source,
            dry_run = payload.options.dry_run,
            "Processing bookmark import task"
        );

        // The job status is terminal once the executor returns, so a retry could not
        // report progress. Job-level failures are never retried by the queue.
        let result = state.executor().execute(&payload).await.map_err(|e| {
            TaskError::unrecoverable(anyhow::Error::new(e).context("Bookmark import failed"))
        })?;

        Ok(json!({
            "status": "success",
            "job_id": payload.job_id,
            "total_processed": result.total_processed,
            "imported": result.imported,
            "skipped": result.skipped,
            "errors": result.errors,
        }))
    }
}
