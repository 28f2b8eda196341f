use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::import::NormalizedBookmark;

/// Bookmark row as stored in the user's collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Bookmark {
    pub id: Uuid,
    pub user_id: Uuid,
    pub content: String,
    pub author_username: String,
    pub author_display_name: String,
    pub author_avatar_url: Option<String>,
    pub media_urls: Vec<String>,
    pub links: Vec<String>,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub tags: Vec<String>,
    pub category_id: Option<Uuid>,
    pub bookmarked_at: DateTime<Utc>,
    pub is_archived: bool,
    pub import_source: Option<String>,
    pub imported_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload produced from a canonical record
#[derive(Debug, Clone)]
pub struct NewBookmark {
    pub user_id: Uuid,
    pub content: String,
    pub author_username: String,
    pub author_display_name: String,
    pub author_avatar_url: Option<String>,
    pub media_urls: Vec<String>,
    pub links: Vec<String>,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub tags: Vec<String>,
    pub category_id: Option<Uuid>,
    pub bookmarked_at: DateTime<Utc>,
    pub is_archived: bool,
    pub import_source: String,
    pub imported_at: DateTime<Utc>,
}

impl NewBookmark {
    pub fn from_normalized(
        user_id: Uuid,
        record: &NormalizedBookmark,
        category_id: Option<Uuid>,
    ) -> Self {
        Self {
            user_id,
            content: record.content.clone(),
            author_username: record.author_username.clone(),
            author_display_name: record.author_display_name.clone(),
            author_avatar_url: record.author_avatar_url.clone(),
            media_urls: record.media_urls.iter().cloned().collect(),
            links: record.links.iter().cloned().collect(),
            hashtags: record.hashtags.iter().cloned().collect(),
            mentions: record.mentions.iter().cloned().collect(),
            tags: record.tags.iter().cloned().collect(),
            category_id,
            bookmarked_at: record.bookmarked_at,
            is_archived: record.is_archived,
            import_source: record.import_source.to_string(),
            imported_at: record.imported_at,
        }
    }
}

/// Mutable fields overwritten by the `update` duplicate strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkUpdate {
    pub content: String,
    pub media_urls: Vec<String>,
    pub links: Vec<String>,
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub tags: Vec<String>,
}

impl From<&NormalizedBookmark> for BookmarkUpdate {
    fn from(record: &NormalizedBookmark) -> Self {
        Self {
            content: record.content.clone(),
            media_urls: record.media_urls.iter().cloned().collect(),
            links: record.links.iter().cloned().collect(),
            hashtags: record.hashtags.iter().cloned().collect(),
            mentions: record.mentions.iter().cloned().collect(),
            tags: record.tags.iter().cloned().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Category {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
