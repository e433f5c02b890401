//! API request/response models for past questions.

use crate::db::models::{
    downloads::DownloadDBResponse,
    past_questions::{FileType, PastQuestionDBResponse, PastQuestionSort, Semester},
};
use crate::types::{DownloadId, QuestionId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::pagination::Pagination;

/// Upload request. File storage is handled elsewhere; the request carries the
/// stored file's URL and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PastQuestionCreate {
    /// Defaults to "<course_code> - <semester> Semester <year>" when omitted
    pub title: Option<String>,
    pub course_name: String,
    pub course_code: String,
    pub semester: Semester,
    pub level: String,
    pub year: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub file_url: String,
    pub file_type: Option<FileType>,
    pub file_size: Option<i64>,
    #[serde(default)]
    pub is_paid: bool,
    #[schema(value_type = f64)]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PastQuestionResponse {
    #[schema(value_type = String, format = "uuid")]
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
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub downloads: i64,
    #[schema(value_type = f64)]
    pub rating: Decimal,
    pub rating_count: i64,
    #[schema(value_type = String, format = "uuid")]
    pub uploaded_by: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<PastQuestionDBResponse> for PastQuestionResponse {
    fn from(db: PastQuestionDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            course_name: db.course_name,
            course_code: db.course_code,
            semester: db.semester,
            level: db.level,
            year: db.year,
            tags: db.tags,
            file_url: db.file_url,
            file_type: db.file_type,
            file_size: db.file_size,
            is_paid: db.is_paid,
            price: db.price,
            downloads: db.downloads,
            rating: db.rating,
            rating_count: db.rating_count,
            uploaded_by: db.uploaded_by,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for the catalog listing
#[serde_with::serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListPastQuestionsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    pub course_code: Option<String>,
    pub course_name: Option<String>,
    pub semester: Option<Semester>,
    pub level: Option<String>,
    // Query values arrive as strings; parsed rather than deserialized since
    // the flattened pagination forces string buffering
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    pub is_paid: Option<bool>,

    /// Case-insensitive substring match over title, course name and code
    pub search: Option<String>,

    /// Sort column (default: created_at)
    pub sort_by: Option<PastQuestionSort>,

    /// Sort order, "asc" or "desc" (default: desc)
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownloadReceiptResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: DownloadId,
    #[schema(value_type = String, format = "uuid")]
    pub past_question_id: QuestionId,
    pub is_purchased: bool,
    #[schema(value_type = f64)]
    pub amount_paid: Decimal,
    pub created_at: DateTime<Utc>,
}

impl From<DownloadDBResponse> for DownloadReceiptResponse {
    fn from(db: DownloadDBResponse) -> Self {
        Self {
            id: db.id,
            past_question_id: db.past_question_id,
            is_purchased: db.is_purchased,
            amount_paid: db.amount_paid,
            created_at: db.created_at,
        }
    }
}

/// Result of a download/purchase request. `already_purchased` marks the
/// idempotent re-entry path where no charge occurred.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DownloadResponse {
    pub file_url: String,
    pub already_purchased: bool,
    pub download: DownloadReceiptResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RateRequest {
    /// Rating between 1 and 5
    pub rating: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RatingResponse {
    #[schema(value_type = f64)]
    pub rating: Decimal,
    pub rating_count: i64,
}
