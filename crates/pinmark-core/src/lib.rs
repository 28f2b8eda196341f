//! Pinmark Core Library
//!
//! This crate provides the domain models, error types, and configuration shared by
//! every Pinmark component: the canonical bookmark shape, the import job types,
//! and the task envelope handed to the external worker pool.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod task_error;

// Re-export commonly used types
pub use config::ImportConfig;
pub use error::{AppError, ErrorMetadata};
pub use storage_types::StorageBackend;
pub use task_error::TaskError;
