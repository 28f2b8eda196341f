//! Pinmark Worker – the seam between the import pipeline and the external job queue.
//!
//! The queue itself (claiming, scheduling, persistence of task rows) lives outside
//! this workspace. This crate provides the `TaskHandlerContext` trait the queue calls
//! into, its implementation for `ImportState`, and the outcome classification the
//! queue uses to decide between completing, retrying and failing a task.

mod context;
mod dispatch;
mod runner;

pub use context::TaskHandlerContext;
pub use runner::{compute_retry_backoff_seconds, run_task, TaskOutcome, MAX_RETRY_BACKOFF_SECS};
