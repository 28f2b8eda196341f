//! Pinmark Storage Library
//!
//! Staging storage for uploaded import files. Provides the `Storage` trait plus
//! S3 (object_store) and local filesystem implementations.
//!
//! # Storage key format
//!
//! Every staged upload lives under `imports/{user_id}/{job_id}/{filename}`. Keys must
//! not contain `..` or a leading `/`. Key generation is centralized in the `keys`
//! module so all backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::import_staging_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use pinmark_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredFile};
