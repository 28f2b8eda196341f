//! Run one claimed task and classify the result for the external queue.

use anyhow::Result;
use serde_json::json;
use std::sync::Weak;

use pinmark_core::models::Task;
use pinmark_core::TaskError;

use crate::context::TaskHandlerContext;

/// Maximum delay in seconds before retrying a failed task. Caps exponential backoff
/// so that high retry counts do not produce excessively long delays.
pub const MAX_RETRY_BACKOFF_SECS: u64 = 300;

/// Computes backoff in seconds for a given retry count (exponential with cap).
#[inline]
pub fn compute_retry_backoff_seconds(retry_count: i32) -> u64 {
    2_u64
        .saturating_pow(retry_count.max(0) as u32)
        .min(MAX_RETRY_BACKOFF_SECS)
}

/// What the queue should do with a task after one attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// Mark completed and store the handler's result.
    Completed(serde_json::Value),
    /// Schedule another attempt after the backoff.
    Retry { backoff_seconds: u64, error: String },
    /// Mark failed and store `result`.
    Failed { result: serde_json::Value },
}

/// Dispatch `task` through `context` and classify the outcome.
///
/// Errors wrapped in an unrecoverable [`TaskError`] are failed immediately. Other
/// errors are retried while the task has retries left. The only error returned is
/// a context that has already been dropped.
#[tracing::instrument(skip(context, task), fields(task.id = %task.id, task.type = %task.task_type))]
pub async fn run_task(context: &Weak<dyn TaskHandlerContext>, task: &Task) -> Result<TaskOutcome> {
    let ctx = context
        .upgrade()
        .ok_or_else(|| anyhow::anyhow!("TaskHandlerContext was dropped, cannot process task"))?;

    match ctx.dispatch_task(task).await {
        Ok(task_result) => {
            tracing::info!(task_id = %task.id, task_type = %task.task_type, "Task completed successfully");
            Ok(TaskOutcome::Completed(task_result))
        }
        Err(e) => {
            let is_unrecoverable = e
                .downcast_ref::<TaskError>()
                .map(|te| !te.is_recoverable())
                .unwrap_or(false);

            tracing::error!(
                task_id = %task.id,
                error = %e,
                retry_count = task.retry_count,
                max_retries = task.max_retries,
                unrecoverable = is_unrecoverable,
                "Task execution failed"
            );

            if is_unrecoverable {
                tracing::error!(
                    task_id = %task.id,
                    "Task failed with unrecoverable error, will not retry"
                );
                return Ok(TaskOutcome::Failed {
                    result: json!({
                        "error": e.to_string(),
                        "retry_count": task.retry_count,
                        "unrecoverable": true,
                        "reason": "Task failed with unrecoverable error (e.g., unreadable import file)"
                    }),
                });
            }

            if task.can_retry() {
                let backoff_seconds = compute_retry_backoff_seconds(task.retry_count);
                tracing::info!(
                    task_id = %task.id,
                    retry_count = task.retry_count + 1,
                    backoff_seconds = backoff_seconds,
                    "Scheduling task retry"
                );
                Ok(TaskOutcome::Retry {
                    backoff_seconds,
                    error: e.to_string(),
                })
            } else {
                tracing::error!(task_id = %task.id, "Task failed after max retries");
                Ok(TaskOutcome::Failed {
                    result: json!({
                        "error": e.to_string(),
                        "retry_count": task.retry_count,
                        "reason": "Task failed after maximum retries"
                    }),
                })
            }
        }
    }
}
