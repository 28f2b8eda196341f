//! Repository trait for the bookmark collection.
//!
//! The import pipeline only needs four calls against the relational store. Keeping
//! them behind a trait lets the pipeline run against the Postgres repository in
//! production and an in-memory store in tests.

use async_trait::async_trait;
use pinmark_core::models::{Bookmark, BookmarkUpdate, Category, NewBookmark};
use pinmark_core::AppError;
use uuid::Uuid;

#[async_trait]
pub trait BookmarkStore: Send + Sync {
    /// Oldest bookmark of `user_id` whose content and author match exactly.
    async fn find_duplicate(
        &self,
        user_id: Uuid,
        content: &str,
        author_username: &str,
    ) -> Result<Option<Bookmark>, AppError>;

    async fn insert(&self, bookmark: NewBookmark) -> Result<Bookmark, AppError>;

    /// Overwrite the mutable fields of an existing bookmark.
    async fn update_fields(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: BookmarkUpdate,
    ) -> Result<Bookmark, AppError>;

    async fn find_category_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<Category>, AppError>;
}
