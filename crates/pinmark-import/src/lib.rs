//! Pinmark bookmark import pipeline
//!
//! Ingests a user's bookmark collection from one of five external formats and
//! merges it into their existing collection:
//!
//! 1. [`formats::validate`] runs a cheap pre-flight check before a job is queued.
//! 2. [`ImportService`] stages the upload and records the job as pending.
//! 3. The external worker runs [`ImportTaskHandler`], which drives the
//!    [`BatchExecutor`]: download, [`formats::parse`], then duplicate resolution in
//!    batches of 50 with per-record error isolation.
//! 4. Polling clients read the [`JobStatusStore`].

pub mod cleanup;
pub mod error;
pub mod executor;
pub mod formats;
pub mod hash;
pub mod normalize;
pub mod resolver;
pub mod service;
pub mod state;
pub mod status;
pub mod task_handlers;

pub use cleanup::{cleanup_import, CleanupReport};
pub use error::{ImportError, ImportResult};
pub use executor::BatchExecutor;
pub use hash::fingerprint;
pub use normalize::normalize;
pub use resolver::{DuplicateResolver, Resolution};
pub use service::{ImportService, SubmitImport};
pub use state::ImportState;
pub use status::{InMemoryJobStatusStore, JobStatusStore};
pub use task_handlers::{ImportTaskHandler, TaskHandler};
