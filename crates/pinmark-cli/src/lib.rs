//! Building blocks of the `pinmark` binary, kept here so they can be tested
//! without a database.

use anyhow::{bail, Context, Result};
use pinmark_core::models::{ImportJobStatus, ImportOptions, ImportSource};
use pinmark_core::{AppError, ErrorMetadata};
use pinmark_import::{ImportError, ImportState, SubmitImport};
use pinmark_worker::{run_task, TaskHandlerContext, TaskOutcome};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

/// Explicit `--source`, or the format sniffed from the content.
pub fn resolve_source(explicit: Option<ImportSource>, content: &str) -> ImportSource {
    explicit.unwrap_or_else(|| ImportSource::detect(content))
}

/// Surface a service failure as an `AppError`, logged with its code.
fn service_error(err: ImportError) -> anyhow::Error {
    let err = AppError::from(err);
    tracing::error!(
        code = err.error_code(),
        recoverable = err.is_recoverable(),
        error = %err,
        "Import request rejected"
    );
    err.into()
}

/// Validate, stage, submit and run one import inline, then return its final status.
pub async fn run_import(
    state: Arc<ImportState>,
    user_id: Uuid,
    file: &Path,
    options: ImportOptions,
) -> Result<ImportJobStatus> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let filename = file
        .file_name()
        .and_then(|n| n.to_str())
        .context("Import file has no usable file name")?
        .to_string();

    let service = state.service();
    let validation = service.validate(&content, options.source);
    if !validation.valid {
        bail!(
            "{} file failed validation: {}",
            options.source,
            validation.errors.join("; ")
        );
    }
    for warning in &validation.warnings {
        tracing::warn!(%warning, "Validation warning");
    }

    let job_id = Uuid::new_v4();
    let staged = service
        .stage(user_id, job_id, file, &filename)
        .await
        .map_err(service_error)?;
    let task = service
        .submit(SubmitImport {
            job_id,
            user_id,
            staged,
            filename,
            options,
            validation,
        })
        .await
        .map_err(service_error)?;

    let context: Arc<dyn TaskHandlerContext> = state.clone();
    match run_task(&Arc::downgrade(&context), &task).await? {
        TaskOutcome::Completed(_) => {}
        TaskOutcome::Retry { error, .. } => tracing::warn!(%error, "Import task would be retried"),
        TaskOutcome::Failed { result } => tracing::error!(%result, "Import task failed"),
    }

    service
        .status(job_id)
        .await
        .map_err(service_error)?
        .context("Import job status is no longer available")
}
