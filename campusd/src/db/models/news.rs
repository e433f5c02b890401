//! Database models for news articles.

use crate::types::{NewsId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// News category stored as TEXT in database
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Hash, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    Events,
    Announcements,
    Academics,
    Sports,
    Entertainment,
    General,
}

impl NewsCategory {
    pub const ALL: [NewsCategory; 6] = [
        NewsCategory::Events,
        NewsCategory::Announcements,
        NewsCategory::Academics,
        NewsCategory::Sports,
        NewsCategory::Entertainment,
        NewsCategory::General,
    ];
}

/// Database request for creating a news article
#[derive(Debug, Clone)]
pub struct NewsCreateDBRequest {
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: NewsCategory,
    pub image_url: Option<String>,
    pub author: String,
    pub author_id: Option<UserId>,
    pub is_published: bool,
    pub tags: Vec<String>,
}

/// Database request for updating a news article
#[derive(Debug, Clone, Default)]
pub struct NewsUpdateDBRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<NewsCategory>,
    pub image_url: Option<String>,
    pub is_published: Option<bool>,
    pub tags: Option<Vec<String>>,
}

/// Database response for a news row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NewsDBResponse {
    pub id: NewsId,
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: NewsCategory,
    pub image_url: Option<String>,
    pub author: String,
    pub author_id: Option<UserId>,
    pub published_at: DateTime<Utc>,
    pub is_published: bool,
    pub views: i64,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter for the published news listing
#[derive(Debug, Clone, Default)]
pub struct NewsFilter {
    pub category: Option<NewsCategory>,
    pub search: Option<String>,
    pub skip: i64,
    pub limit: i64,
}
