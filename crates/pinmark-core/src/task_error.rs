//! Retry classification for task failures.
//!
//! Task handlers return `anyhow::Result`. Wrapping the error in `TaskError` lets the
//! worker queue decide whether a failed task is worth another attempt: the queue
//! downcasts to `TaskError` and skips retries for unrecoverable failures. Errors that
//! are not wrapped are treated as recoverable.

use std::fmt;

#[derive(Debug)]
pub struct TaskError {
    source: anyhow::Error,
    recoverable: bool,
}

impl TaskError {
    /// A transient failure (storage hiccup, database connection loss).
    pub fn recoverable(source: anyhow::Error) -> Self {
        Self {
            source,
            recoverable: true,
        }
    }

    /// A failure that will not go away on retry (unparseable file, unknown format).
    pub fn unrecoverable(source: anyhow::Error) -> Self {
        Self {
            source,
            recoverable: false,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.recoverable
    }
}

impl fmt::Display for TaskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.source)
    }
}

impl std::error::Error for TaskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.source()
    }
}
