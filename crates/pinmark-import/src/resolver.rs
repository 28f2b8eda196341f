//! Duplicate resolution and the conflict policy.
//!
//! The authoritative duplicate check queries the store by value, exact match on
//! `(content, author_username)` within the user's collection. The record fingerprint
//! is not consulted here.

use pinmark_core::constants::MAX_CONTENT_LENGTH;
use pinmark_core::models::{BookmarkUpdate, DuplicateStrategy, NewBookmark, NormalizedBookmark};
use pinmark_db::BookmarkStore;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ImportError, ImportResult};

/// What the resolver did with one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// No match existed; a new bookmark was written.
    Created(Uuid),
    /// A match existed and its mutable fields were overwritten.
    Updated(Uuid),
    /// A match existed and a second bookmark was written next to it.
    CreatedDuplicate(Uuid),
    /// A match existed and nothing was written.
    Skipped { existing: Uuid },
    /// Dry run: the record passed the validity check.
    WouldImport,
    /// Dry run: the record failed the validity check.
    WouldSkip,
}

impl Resolution {
    /// Whether the outcome counts toward `imported` rather than `skipped`.
    pub fn is_imported(&self) -> bool {
        match self {
            Resolution::Created(_)
            | Resolution::Updated(_)
            | Resolution::CreatedDuplicate(_)
            | Resolution::WouldImport => true,
            Resolution::Skipped { .. } | Resolution::WouldSkip => false,
        }
    }
}

/// Content must be non-empty after trimming and at most [`MAX_CONTENT_LENGTH`] chars.
pub fn check_validity(record: &NormalizedBookmark) -> Result<(), String> {
    if record.content.trim().is_empty() {
        return Err("Content is empty".to_string());
    }
    let length = record.content.chars().count();
    if length > MAX_CONTENT_LENGTH {
        return Err(format!(
            "Content is {} characters, limit is {}",
            length, MAX_CONTENT_LENGTH
        ));
    }
    Ok(())
}

/// Applies one job's duplicate strategy against a user's collection.
pub struct DuplicateResolver {
    store: Arc<dyn BookmarkStore>,
    user_id: Uuid,
    strategy: DuplicateStrategy,
    dry_run: bool,
    category_id: Option<Uuid>,
}

impl DuplicateResolver {
    pub fn new(store: Arc<dyn BookmarkStore>, user_id: Uuid, strategy: DuplicateStrategy) -> Self {
        Self {
            store,
            user_id,
            strategy,
            dry_run: false,
            category_id: None,
        }
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Category assigned to every bookmark this resolver creates.
    pub fn with_category(mut self, category_id: Option<Uuid>) -> Self {
        self.category_id = category_id;
        self
    }

    pub async fn resolve(&self, record: &NormalizedBookmark) -> ImportResult<Resolution> {
        if self.dry_run {
            return Ok(match check_validity(record) {
                Ok(()) => Resolution::WouldImport,
                Err(_) => Resolution::WouldSkip,
            });
        }

        check_validity(record).map_err(ImportError::InvalidRecord)?;

        let existing = self
            .store
            .find_duplicate(self.user_id, &record.content, &record.author_username)
            .await?;

        let Some(existing) = existing else {
            let created = self.store.insert(self.new_bookmark(record)).await?;
            return Ok(Resolution::Created(created.id));
        };

        match self.strategy {
            DuplicateStrategy::Skip => Ok(Resolution::Skipped {
                existing: existing.id,
            }),
            DuplicateStrategy::Update => {
                let updated = self
                    .store
                    .update_fields(self.user_id, existing.id, BookmarkUpdate::from(record))
                    .await?;
                Ok(Resolution::Updated(updated.id))
            }
            DuplicateStrategy::CreateDuplicate => {
                let created = self.store.insert(self.new_bookmark(record)).await?;
                Ok(Resolution::CreatedDuplicate(created.id))
            }
        }
    }

    fn new_bookmark(&self, record: &NormalizedBookmark) -> NewBookmark {
        NewBookmark::from_normalized(self.user_id, record, self.category_id)
    }
}
