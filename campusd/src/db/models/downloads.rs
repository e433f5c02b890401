//! Database models for download receipts.
//!
//! A download receipt records that a user has obtained a past question. The
//! (user, question) pair is unique for all time: the first settlement creates
//! the row, every later attempt is an idempotent read.

use crate::types::{DownloadId, QuestionId, UserId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database request for creating a download receipt
#[derive(Debug, Clone)]
pub struct DownloadCreateDBRequest {
    pub user_id: UserId,
    pub past_question_id: QuestionId,
    pub is_purchased: bool,
    pub amount_paid: Decimal,
}

/// Database response for a download receipt row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DownloadDBResponse {
    pub id: DownloadId,
    pub user_id: UserId,
    pub past_question_id: QuestionId,
    pub is_purchased: bool,
    pub amount_paid: Decimal,
    pub created_at: DateTime<Utc>,
}
