//! Database repository for download receipts.

use crate::{
    db::{
        errors::Result,
        models::downloads::{DownloadCreateDBRequest, DownloadDBResponse},
    },
    types::{QuestionId, UserId},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Downloads<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Downloads<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get_for_user_question(&mut self, user_id: UserId, question_id: QuestionId) -> Result<Option<DownloadDBResponse>> {
        let download =
            sqlx::query_as::<_, DownloadDBResponse>("SELECT * FROM downloads WHERE user_id = $1 AND past_question_id = $2")
                .bind(user_id)
                .bind(question_id)
                .fetch_optional(&mut *self.db)
                .await?;
        Ok(download)
    }

    /// Insert the receipt. The unique (user, question) constraint guarantees
    /// at most one row per pair; a concurrent duplicate surfaces as a unique
    /// violation rather than a second charge.
    #[instrument(skip(self, request), err)]
    pub async fn create(&mut self, request: &DownloadCreateDBRequest) -> Result<DownloadDBResponse> {
        let download = sqlx::query_as::<_, DownloadDBResponse>(
            r#"
            INSERT INTO downloads (user_id, past_question_id, is_purchased, amount_paid)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(request.past_question_id)
        .bind(request.is_purchased)
        .bind(request.amount_paid)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(download)
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_user(&mut self, user_id: UserId, skip: i64, limit: i64) -> Result<Vec<DownloadDBResponse>> {
        let downloads = sqlx::query_as::<_, DownloadDBResponse>(
            "SELECT * FROM downloads WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(limit)
        .bind(skip)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(downloads)
    }
}
