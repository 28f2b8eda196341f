//! Pipeline error type.

use pinmark_core::models::ImportSource;
use pinmark_core::AppError;
use pinmark_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to parse {source_format} file: {message}")]
    Parse {
        source_format: ImportSource,
        message: String,
    },

    #[error("Unsupported import format: {0}")]
    UnsupportedFormat(String),

    #[error("Import file is {size} bytes, limit is {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Import validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Bookmark store error: {0}")]
    Store(#[from] AppError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ImportResult<T> = Result<T, ImportError>;

impl ImportError {
    pub fn parse(source_format: ImportSource, message: impl Into<String>) -> Self {
        ImportError::Parse {
            source_format,
            message: message.into(),
        }
    }

    /// Whether retrying the whole job could succeed.
    ///
    /// Bad input never improves on retry. Infrastructure failures might, except a
    /// staged file that no longer exists.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ImportError::Parse { .. }
            | ImportError::UnsupportedFormat(_)
            | ImportError::FileTooLarge { .. }
            | ImportError::ValidationFailed(_)
            | ImportError::InvalidRecord(_) => false,
            ImportError::Storage(StorageError::NotFound(_))
            | ImportError::Storage(StorageError::InvalidKey(_)) => false,
            ImportError::Storage(_) | ImportError::Io(_) | ImportError::Internal(_) => true,
            ImportError::Store(e) => pinmark_core::ErrorMetadata::is_recoverable(e),
        }
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Parse { .. }
            | ImportError::ValidationFailed(_)
            | ImportError::InvalidRecord(_) => AppError::InvalidInput(err.to_string()),
            ImportError::UnsupportedFormat(format) => AppError::UnsupportedFormat(format),
            ImportError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            ImportError::Storage(StorageError::NotFound(key)) => {
                AppError::NotFound(format!("Staged file {} not found", key))
            }
            ImportError::Storage(e) => AppError::Storage(e.to_string()),
            ImportError::Store(e) => e,
            ImportError::Io(e) => AppError::from(e),
            ImportError::Internal(msg) => AppError::Internal(msg),
        }
    }
}
