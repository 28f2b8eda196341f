//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Information about an uploaded object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub key: String,
    pub url: String,
    pub size_bytes: u64,
}

/// Storage abstraction trait
///
/// The import pipeline stages uploads through this trait and never talks to a
/// backend directly. Keys follow `imports/{user_id}/{job_id}/{filename}`; see
/// [`crate::keys`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a local file under `storage_key`, attaching user metadata.
    async fn upload_file(
        &self,
        storage_key: &str,
        local_path: &Path,
        metadata: &HashMap<String, String>,
    ) -> StorageResult<StoredFile>;

    /// Upload in-memory data to a specific storage key.
    /// Returns the URL for the uploaded file.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Download a file into `dest`, creating parent directories. Returns bytes written.
    async fn download_to_path(&self, storage_key: &str, dest: &Path) -> StorageResult<u64> {
        let data = self.download(storage_key).await?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &data).await.map_err(|e| {
            StorageError::DownloadFailed(format!(
                "Failed to write {}: {}",
                dest.display(),
                e
            ))
        })?;
        Ok(data.len() as u64)
    }

    /// Delete a file by its storage key. Deleting a missing key is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;
}
