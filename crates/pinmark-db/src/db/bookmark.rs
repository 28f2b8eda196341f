use async_trait::async_trait;
use pinmark_core::{
    models::{Bookmark, BookmarkUpdate, Category, NewBookmark},
    AppError,
};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

use super::traits::BookmarkStore;

const BOOKMARK_COLUMNS: &str = "id, user_id, content, author_username, author_display_name, \
    author_avatar_url, media_urls, links, hashtags, mentions, tags, category_id, bookmarked_at, \
    is_archived, import_source, imported_at, created_at, updated_at";

/// Repository for a user's bookmarks and categories
#[derive(Clone)]
pub struct BookmarkRepository {
    pool: PgPool,
}

impl BookmarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count a user's bookmarks
    #[tracing::instrument(skip(self), fields(db.table = "bookmarks", db.operation = "select"))]
    pub async fn count_for_user(&self, user_id: Uuid) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<Postgres, i64>(
            "SELECT COUNT(*) FROM bookmarks WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[async_trait]
impl BookmarkStore for BookmarkRepository {
    #[tracing::instrument(
        skip(self, content),
        fields(db.table = "bookmarks", db.operation = "select", user_id = %user_id)
    )]
    async fn find_duplicate(
        &self,
        user_id: Uuid,
        content: &str,
        author_username: &str,
    ) -> Result<Option<Bookmark>, AppError> {
        let query = format!(
            "SELECT {} FROM bookmarks \
             WHERE user_id = $1 AND author_username = $2 AND md5(content) = md5($3) AND content = $3 \
             ORDER BY created_at ASC LIMIT 1",
            BOOKMARK_COLUMNS
        );
        let bookmark = sqlx::query_as::<Postgres, Bookmark>(&query)
            .bind(user_id)
            .bind(author_username)
            .bind(content)
            .fetch_optional(&self.pool)
            .await?;

        Ok(bookmark)
    }

    #[tracing::instrument(
        skip(self, bookmark),
        fields(db.table = "bookmarks", db.operation = "insert", user_id = %bookmark.user_id)
    )]
    async fn insert(&self, bookmark: NewBookmark) -> Result<Bookmark, AppError> {
        let query = format!(
            r#"
            INSERT INTO bookmarks (
                user_id, content, author_username, author_display_name, author_avatar_url,
                media_urls, links, hashtags, mentions, tags, category_id, bookmarked_at,
                is_archived, import_source, imported_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {}
            "#,
            BOOKMARK_COLUMNS
        );
        let created = sqlx::query_as::<Postgres, Bookmark>(&query)
            .bind(bookmark.user_id)
            .bind(&bookmark.content)
            .bind(&bookmark.author_username)
            .bind(&bookmark.author_display_name)
            .bind(&bookmark.author_avatar_url)
            .bind(&bookmark.media_urls)
            .bind(&bookmark.links)
            .bind(&bookmark.hashtags)
            .bind(&bookmark.mentions)
            .bind(&bookmark.tags)
            .bind(bookmark.category_id)
            .bind(bookmark.bookmarked_at)
            .bind(bookmark.is_archived)
            .bind(&bookmark.import_source)
            .bind(bookmark.imported_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    #[tracing::instrument(
        skip(self, update),
        fields(db.table = "bookmarks", db.operation = "update", db.record_id = %id)
    )]
    async fn update_fields(
        &self,
        user_id: Uuid,
        id: Uuid,
        update: BookmarkUpdate,
    ) -> Result<Bookmark, AppError> {
        let query = format!(
            r#"
            UPDATE bookmarks
            SET content = $3, media_urls = $4, links = $5, hashtags = $6, mentions = $7,
                tags = $8, updated_at = NOW()
            WHERE user_id = $1 AND id = $2
            RETURNING {}
            "#,
            BOOKMARK_COLUMNS
        );
        let updated = sqlx::query_as::<Postgres, Bookmark>(&query)
            .bind(user_id)
            .bind(id)
            .bind(&update.content)
            .bind(&update.media_urls)
            .bind(&update.links)
            .bind(&update.hashtags)
            .bind(&update.mentions)
            .bind(&update.tags)
            .fetch_optional(&self.pool)
            .await?;

        updated.ok_or_else(|| AppError::NotFound(format!("Bookmark {} not found", id)))
    }

    #[tracing::instrument(skip(self), fields(db.table = "categories", db.operation = "select"))]
    async fn find_category_by_name(
        &self,
        user_id: Uuid,
        name: &str,
    ) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<Postgres, Category>(
            "SELECT id, user_id, name, created_at FROM categories WHERE user_id = $1 AND name = $2",
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }
}
