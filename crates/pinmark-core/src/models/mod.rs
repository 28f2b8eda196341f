//! Data models for the import pipeline
//!
//! Each sub-module represents one feature area: persisted bookmarks, the import
//! request/record types, job lifecycle tracking, and the worker task envelope.

mod bookmark;
mod import;
mod job;
mod task;

pub use bookmark::*;
pub use import::*;
pub use job::*;
pub use task::*;
