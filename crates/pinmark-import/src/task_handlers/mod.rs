mod import_handler;

pub use import_handler::ImportTaskHandler;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use crate::state::ImportState;
use pinmark_core::models::Task;

/// Trait for task handlers.
///
/// **CPU-bound work:** parsing and other CPU-heavy steps must run inside
/// `tokio::task::spawn_blocking` so they do not block the async runtime:
///
/// ```ignore
/// let records = tokio::task::spawn_blocking(move || {
///     formats::parse(source, &content, now)
/// }).await??;
/// ```
#[async_trait]
pub trait TaskHandler {
    async fn process(&self, task: &Task, state: Arc<ImportState>) -> Result<serde_json::Value>;
}
