use pinmark_core::ImportConfig;
use pinmark_db::BookmarkStore;
use pinmark_storage::Storage;
use std::path::PathBuf;
use std::sync::Arc;

use crate::executor::BatchExecutor;
use crate::service::ImportService;
use crate::status::JobStatusStore;

/// Collaborators shared by the import service and the import task handler
#[derive(Clone)]
pub struct ImportState {
    pub storage: Arc<dyn Storage>,
    pub bookmarks: Arc<dyn BookmarkStore>,
    pub statuses: Arc<dyn JobStatusStore>,
    pub scratch_dir: PathBuf,
    pub max_file_size_bytes: u64,
    pub history_limit: usize,
}

impl ImportState {
    pub fn new(
        config: &ImportConfig,
        storage: Arc<dyn Storage>,
        bookmarks: Arc<dyn BookmarkStore>,
        statuses: Arc<dyn JobStatusStore>,
    ) -> Self {
        Self {
            storage,
            bookmarks,
            statuses,
            scratch_dir: config.scratch_dir.clone(),
            max_file_size_bytes: config.max_file_size_bytes,
            history_limit: config.history_limit,
        }
    }

    pub fn service(&self) -> ImportService {
        ImportService::new(
            self.storage.clone(),
            self.statuses.clone(),
            self.max_file_size_bytes,
            self.history_limit,
        )
    }

    pub fn executor(&self) -> BatchExecutor {
        BatchExecutor::new(
            self.storage.clone(),
            self.bookmarks.clone(),
            self.statuses.clone(),
            self.scratch_dir.clone(),
        )
    }
}
