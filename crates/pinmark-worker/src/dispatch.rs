//! TaskHandlerContext implementation for ImportState.
//!
//! Dispatches tasks to the appropriate handler based on task type.

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

use pinmark_core::models::{Task, TaskType};
use pinmark_import::{ImportState, ImportTaskHandler, TaskHandler};

use crate::context::TaskHandlerContext;

#[async_trait]
impl TaskHandlerContext for ImportState {
    async fn dispatch_task(self: Arc<Self>, task: &Task) -> Result<serde_json::Value> {
        match task.task_type {
            TaskType::BookmarkImport => {
                let handler = ImportTaskHandler;
                handler.process(task, self).await
            }
        }
    }
}
