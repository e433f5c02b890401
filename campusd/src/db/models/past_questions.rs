//! Database models for the past question catalog.

use crate::types::{QuestionId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Academic semester stored as TEXT in database
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text")]
pub enum Semester {
    First,
    Second,
    Summer,
}

/// Uploaded file type stored as TEXT in database
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Pdf,
    Doc,
    Docx,
    Image,
}

/// Database request for creating a past question
#[derive(Debug, Clone)]
pub struct PastQuestionCreateDBRequest {
    pub title: String,
    pub course_name: String,
    pub course_code: String,
    pub semester: Semester,
    pub level: String,
    pub year: Option<String>,
    pub tags: Vec<String>,
    pub file_url: String,
    pub file_type: FileType,
    pub file_size: i64,
    pub is_paid: bool,
    pub price: Decimal,
    pub uploaded_by: UserId,
}

/// Database response for a past question row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PastQuestionDBResponse {
    pub id: QuestionId,
    pub title: String,
    pub course_name: String,
    pub course_code: String,
    pub semester: Semester,
    pub level: String,
    pub year: Option<String>,
    pub tags: Vec<String>,
    pub file_url: String,
    pub file_type: FileType,
    pub file_size: i64,
    pub is_paid: bool,
    pub price: Decimal,
    pub downloads: i64,
    pub rating: Decimal,
    pub rating_count: i64,
    pub uploaded_by: UserId,
    pub is_approved: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter for listing past questions
#[derive(Debug, Clone, Default)]
pub struct PastQuestionFilter {
    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub semester: Option<Semester>,
    pub level: Option<String>,
    pub is_paid: Option<bool>,
    pub search: Option<String>,
    pub sort_by: PastQuestionSort,
    pub descending: bool,
    pub skip: i64,
    pub limit: i64,
}

/// Whitelisted sort columns for the catalog listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PastQuestionSort {
    #[default]
    CreatedAt,
    Downloads,
    Rating,
    Price,
}

impl PastQuestionSort {
    pub fn column(self) -> &'static str {
        match self {
            PastQuestionSort::CreatedAt => "created_at",
            PastQuestionSort::Downloads => "downloads",
            PastQuestionSort::Rating => "rating",
            PastQuestionSort::Price => "price",
        }
    }
}
