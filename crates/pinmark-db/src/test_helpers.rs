//! In-memory `BookmarkStore` for testing
//!
//! Lets the import pipeline run without a database. Enabled with the
//! `test-helpers` feature.

use async_trait::async_trait;
use chrono::Utc;
use pinmark_core::models::{Bookmark, BookmarkUpdate, Category, NewBookmark};
use pinmark_core::AppError;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

use crate::db::BookmarkStore;

#[derive(Clone, Default)]
pub struct InMemoryBookmarkStore {
    bookmarks: Arc<Mutex<Vec<Bookmark>>>,
    categories: Arc<Mutex<Vec<Category>>>,
    failing_contents: Arc<Mutex<HashSet<String>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryBookmarkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing bookmark, as if it had been saved before the import.
    pub fn seed(&self, bookmark: NewBookmark) -> Bookmark {
        let stored = Self::materialize(bookmark);
        lock(&self.bookmarks).push(stored.clone());
        stored
    }

    pub fn add_category(&self, user_id: Uuid, name: &str) -> Category {
        let category = Category {
            id: Uuid::new_v4(),
            user_id,
            name: name.to_string(),
            created_at: Utc::now(),
        };
        lock(&self.categories).push(category.clone());
        category
    }

    /// Make every insert or update whose content equals `content` fail.
    pub fn fail_writes_for(&self, content: &str) {
        lock(&self.failing_contents).insert(content.to_string());
    }

    pub fn bookmarks_for(&self, user_id: Uuid) -> Vec<Bookmark> {
        lock(&self.bookmarks)
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        lock(&self.bookmarks).len()
    }

    fn materialize(bookmark: NewBookmark) -> Bookmark {
        let now = Utc::now();
        Bookmark {
            id: Uuid::new_v4(),
            user_id: bookmark.user_id,
            content: bookmark.content,
            author_username: bookmark.author_username,
            author_display_name: bookmark.author_display_name,
            author_avatar_url: bookmark.author_avatar_url,
            media_urls: bookmark.media_urls,
            links: bookmark.links,
            hashtags: bookmark.hashtags,
            mentions: bookmark.mentions,
            tags: bookmark.tags,
            category_id: bookmark.category_id,
            bookmarked_at: bookmark.bookmarked_at,
            is_archived: bookmark.is_archived,
            import_source: Some(bookmark.import_source),
            imported_at: Some(bookmark.imported_at),
            created_at: now,
            updated_at: now,
        }
    }

    fn check_writable(&self, content: &str) -> Result<(), AppError> {
        if lock(&self.failing_contents).contains(content) {
            return Err(AppError::Internal(format!(
                "simulated write failure for {:?}",
                content
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl BookmarkStore for InMemoryBookmarkStore {
    async fn find_duplicate(
        &self,
        user_id: Uuid,
        content: &str,
        author_username: &str,
    ) -> Result<Option<Bookmark>, AppError> {
        Ok(lock(&self.bookmarks)
            .iter()
            .find(|b| {
                b.user_id == user_id && b.content == content && b.author_username == author_username
            })
            .cloned())
    }

    async fn insert(&self, bookmark: NewBookmark) -> Result<Bookmark, AppError> {
        self.check_writable(&bookmark.content)?;
        let stored = Self::materialize(bookmark);
        lock(&self.bookmarks).push(stored.clone());
        Ok(stored)
    }

    async fn update_fields(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: BookmarkUpdate,
    ) -> Result<Bookmark, AppError> {
        self.check_writable(&update.content)?;
        let mut bookmarks = lock(&self.bookmarks);
        let existing = bookmarks
            .iter_mut()
            .find(|b| b.user_id == user_id && b.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Bookmark {} not found", id)))?;

        existing.content = update.content;
        existing.media_urls = update.media_urls;
        existing.links = update.links;
        existing.hashtags = update.hashtags;
        existing.mentions = update.mentions;
        existing.tags = update.tags;
        existing.updated_at = Utc::now();

        Ok(existing.clone())
    }

    async fn find_category_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<Category>, AppError> {
        Ok(lock(&self.categories)
            .iter()
            .find(|c| c.user_id == user_id && c.name == name)
            .cloned())
    }
}
