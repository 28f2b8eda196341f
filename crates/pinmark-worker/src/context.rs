//! Task handler context trait
//!
//! `ImportState` implements this trait. The external queue calls `dispatch_task`
//! when processing a task; the implementation matches on task type and invokes the
//! appropriate handler.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use pinmark_core::models::Task;

/// Context for task dispatch.
///
/// The queue holds a weak reference and calls `dispatch_task` when processing a
/// claimed task.
#[async_trait]
pub trait TaskHandlerContext: Send + Sync {
    /// Dispatch a task to the appropriate handler and return the result.
    async fn dispatch_task(self: Arc<Self>, task: &Task) -> Result<serde_json::Value>;
}
