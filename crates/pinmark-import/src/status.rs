//! Job status store
//!
//! Two keyed views per the polling contract:
//! - `status:{job_id}`: one job's lifecycle record, rewritten throughout execution.
//! - `history:{user_id}`: the user's most recent jobs, newest first, bounded.
//!
//! Entries carry a retention window (TTL) that is refreshed on every write. Expired
//! entries read as absent, so callers must treat `None` as "unknown or expired".
//! Updates are merges (see [`ImportJobStatus::merge`]), never replacements.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use pinmark_core::constants::{DEFAULT_STATUS_TTL_SECS, IMPORT_HISTORY_LIMIT};
use pinmark_core::models::{ImportJobStatus, JobStatusUpdate};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::error::ImportResult;

pub fn status_key(job_id: Uuid) -> String {
    format!("status:{}", job_id)
}

pub fn history_key(user_id: Uuid) -> String {
    format!("history:{}", user_id)
}

#[async_trait]
pub trait JobStatusStore: Send + Sync {
    /// Write a fresh status, replacing any previous entry for the job.
    async fn create(&self, status: ImportJobStatus) -> ImportResult<()>;

    /// Merge `update` into the stored status. Returns the merged status, or `None`
    /// when the job is unknown or expired.
    async fn update(
        &self,
        job_id: Uuid,
        update: JobStatusUpdate,
    ) -> ImportResult<Option<ImportJobStatus>>;

    async fn get(&self, job_id: Uuid) -> ImportResult<Option<ImportJobStatus>>;

    /// Record a finished job at the front of its user's history.
    async fn push_history(&self, status: ImportJobStatus) -> ImportResult<()>;

    /// Up to `limit` most recent jobs of `user_id`, newest first.
    async fn history(&self, user_id: Uuid, limit: usize) -> ImportResult<Vec<ImportJobStatus>>;
}

#[derive(Debug, Clone)]
struct Expiring<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

impl<T> Expiring<T> {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Default)]
struct Entries {
    statuses: HashMap<String, Expiring<ImportJobStatus>>,
    histories: HashMap<String, Expiring<Vec<ImportJobStatus>>>,
}

/// Process-local store. Expiry is lazy on read, plus [`Self::purge_expired`].
#[derive(Clone)]
pub struct InMemoryJobStatusStore {
    entries: Arc<Mutex<Entries>>,
    ttl: Duration,
    history_limit: usize,
}

impl Default for InMemoryJobStatusStore {
    fn default() -> Self {
        Self::new(Duration::seconds(DEFAULT_STATUS_TTL_SECS), IMPORT_HISTORY_LIMIT)
    }
}

impl InMemoryJobStatusStore {
    pub fn new(ttl: Duration, history_limit: usize) -> Self {
        Self {
            entries: Arc::new(Mutex::new(Entries::default())),
            ttl,
            history_limit,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expires_at(&self) -> DateTime<Utc> {
        Utc::now() + self.ttl
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.lock();
        let before = entries.statuses.len() + entries.histories.len();
        entries.statuses.retain(|_, e| !e.is_expired(now));
        entries.histories.retain(|_, e| !e.is_expired(now));
        let removed = before - (entries.statuses.len() + entries.histories.len());
        if removed > 0 {
            tracing::debug!(removed, "Purged expired job status entries");
        }
        removed
    }
}

#[async_trait]
impl JobStatusStore for InMemoryJobStatusStore {
    async fn create(&self, status: ImportJobStatus) -> ImportResult<()> {
        let key = status_key(status.job_id);
        let expires_at = self.expires_at();
        self.lock().statuses.insert(
            key,
            Expiring {
                value: status,
                expires_at,
            },
        );
        Ok(())
    }

    async fn update(
        &self,
        job_id: Uuid,
        update: JobStatusUpdate,
    ) -> ImportResult<Option<ImportJobStatus>> {
        let key = status_key(job_id);
        let now = Utc::now();
        let expires_at = self.expires_at();
        let mut entries = self.lock();

        if entries.statuses.get(&key).is_some_and(|e| e.is_expired(now)) {
            entries.statuses.remove(&key);
        }
        Ok(entries.statuses.get_mut(&key).map(|entry| {
            entry.value.merge(update);
            entry.expires_at = expires_at;
            entry.value.clone()
        }))
    }

    async fn get(&self, job_id: Uuid) -> ImportResult<Option<ImportJobStatus>> {
        let key = status_key(job_id);
        let now = Utc::now();
        let mut entries = self.lock();
        match entries.statuses.get(&key) {
            Some(entry) if entry.is_expired(now) => {
                entries.statuses.remove(&key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn push_history(&self, status: ImportJobStatus) -> ImportResult<()> {
        let key = history_key(status.user_id);
        let now = Utc::now();
        let expires_at = self.expires_at();
        let limit = self.history_limit;
        let mut entries = self.lock();

        let entry = entries.histories.entry(key).or_insert_with(|| Expiring {
            value: Vec::new(),
            expires_at,
        });
        if entry.is_expired(now) {
            entry.value.clear();
        }
        entry.value.retain(|s| s.job_id != status.job_id);
        entry.value.insert(0, status);
        entry.value.truncate(limit);
        entry.expires_at = expires_at;
        Ok(())
    }

    async fn history(&self, user_id: Uuid, limit: usize) -> ImportResult<Vec<ImportJobStatus>> {
        let key = history_key(user_id);
        let now = Utc::now();
        let mut entries = self.lock();
        match entries.histories.get(&key) {
            Some(entry) if entry.is_expired(now) => {
                entries.histories.remove(&key);
                Ok(Vec::new())
            }
            Some(entry) => Ok(entry.value.iter().take(limit).cloned().collect()),
            None => Ok(Vec::new()),
        }
    }
}
