//! API request/response models for news.

use crate::db::models::news::{NewsCategory, NewsDBResponse};
use crate::types::NewsId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::pagination::Pagination;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsCreate {
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: NewsCategory,
    pub image_url: Option<String>,
    /// Display name of the author; defaults to the caller's name
    pub author: Option<String>,
    pub is_published: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub category: Option<NewsCategory>,
    pub image_url: Option<String>,
    pub is_published: Option<bool>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewsResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: NewsId,
    pub title: String,
    pub description: String,
    pub content: String,
    pub category: NewsCategory,
    pub image_url: Option<String>,
    pub author: String,
    pub published_at: DateTime<Utc>,
    pub is_published: bool,
    pub views: i64,
    pub tags: Vec<String>,
}

impl From<NewsDBResponse> for NewsResponse {
    fn from(db: NewsDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            description: db.description,
            content: db.content,
            category: db.category,
            image_url: db.image_url,
            author: db.author,
            published_at: db.published_at,
            is_published: db.is_published,
            views: db.views,
            tags: db.tags,
        }
    }
}

/// Query parameters for the news listing
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListNewsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    pub category: Option<NewsCategory>,

    /// Case-insensitive substring match over title and content
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryCount {
    pub category: NewsCategory,
    pub count: i64,
}
