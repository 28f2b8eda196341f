//! Post-job cleanup of the staged upload and the local scratch copy.
//!
//! Cleanup never fails a job. Problems are collected into a [`CleanupReport`] and
//! logged at warn level.

use pinmark_storage::Storage;
use std::path::Path;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleanupReport {
    pub staged_object_deleted: bool,
    pub scratch_file_deleted: bool,
    pub failures: Vec<String>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Delete the staged object and, when given, the downloaded scratch file.
#[tracing::instrument(skip(storage, scratch_path), fields(storage.key = %storage_key))]
pub async fn cleanup_import(
    storage: &dyn Storage,
    storage_key: &str,
    scratch_path: Option<&Path>,
) -> CleanupReport {
    let mut report = CleanupReport::default();

    match storage.delete(storage_key).await {
        Ok(()) => report.staged_object_deleted = true,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to delete staged import file");
            report
                .failures
                .push(format!("staged object {}: {}", storage_key, e));
        }
    }

    if let Some(path) = scratch_path {
        match tokio::fs::remove_file(path).await {
            Ok(()) => report.scratch_file_deleted = true,
            // Never downloaded, nothing to remove.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %path.display(),
                    "Failed to delete import scratch file"
                );
                report
                    .failures
                    .push(format!("scratch file {}: {}", path.display(), e));
            }
        }
    }

    if report.is_clean() {
        tracing::debug!("Import cleanup finished");
    }
    report
}
