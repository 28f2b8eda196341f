use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use uuid::Uuid;

use crate::constants::MAX_IMPORT_WARNINGS;

/// Import job lifecycle: pending -> processing -> completed | failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobState {
    fn rank(self) -> u8 {
        match self {
            JobState::Pending => 0,
            JobState::Processing => 1,
            JobState::Completed | JobState::Failed => 2,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed)
    }

    /// Forward-only transitions. Terminal states accept nothing.
    pub fn can_transition_to(self, next: JobState) -> bool {
        if self.is_terminal() {
            return self == next;
        }
        next.rank() >= self.rank()
    }
}

impl Display for JobState {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JobState::Pending => write!(f, "pending"),
            JobState::Processing => write!(f, "processing"),
            JobState::Completed => write!(f, "completed"),
            JobState::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgress {
    pub current: usize,
    pub total: usize,
    pub percentage: u8,
    pub current_step: String,
}

impl JobProgress {
    pub fn new(current: usize, total: usize, percentage: u8, step: impl Into<String>) -> Self {
        Self {
            current,
            total,
            percentage: percentage.min(100),
            current_step: step.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResult {
    pub total_processed: usize,
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
    pub warnings: Vec<String>,
}

impl JobResult {
    /// Append a warning unless the list is already full.
    pub fn push_warning(&mut self, warning: impl Into<String>) {
        if self.warnings.len() < MAX_IMPORT_WARNINGS {
            self.warnings.push(warning.into());
        }
    }
}

/// Lifecycle aggregate read by polling clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportJobStatus {
    pub job_id: Uuid,
    pub user_id: Uuid,
    pub status: JobState,
    pub progress: JobProgress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<JobResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ImportJobStatus {
    pub fn pending(job_id: Uuid, user_id: Uuid, estimated_records: usize) -> Self {
        Self {
            job_id,
            user_id,
            status: JobState::Pending,
            progress: JobProgress::new(0, estimated_records, 0, "Queued"),
            result: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Shallow-merge a partial update.
    ///
    /// The status only moves forward and the percentage never decreases; a
    /// completed job always reports 100%.
    pub fn merge(&mut self, update: JobStatusUpdate) {
        if let Some(next) = update.status {
            if self.status.can_transition_to(next) {
                self.status = next;
            }
        }
        if let Some(progress) = update.progress {
            let floor = self.progress.percentage;
            self.progress = progress;
            self.progress.percentage = self.progress.percentage.max(floor);
        }
        if let Some(result) = update.result {
            self.result = Some(result);
        }
        if let Some(error) = update.error {
            self.error = Some(error);
        }
        if let Some(completed_at) = update.completed_at {
            self.completed_at = Some(completed_at);
        }
        if self.status == JobState::Completed {
            self.progress.percentage = 100;
        }
    }
}

/// Partial update applied by [`ImportJobStatus::merge`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobStatusUpdate {
    pub status: Option<JobState>,
    pub progress: Option<JobProgress>,
    pub result: Option<JobResult>,
    pub error: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl JobStatusUpdate {
    pub fn status(mut self, status: JobState) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: JobProgress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn result(mut self, result: JobResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn completed_now(mut self) -> Self {
        self.completed_at = Some(Utc::now());
        self
    }
}
