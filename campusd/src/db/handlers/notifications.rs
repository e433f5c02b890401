//! Database repository for in-app notifications.

use crate::{
    db::{
        errors::Result,
        models::notifications::{NotificationCreateDBRequest, NotificationDBResponse},
    },
    types::{NotificationId, UserId},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Notifications<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Notifications<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), err)]
    pub async fn create(&mut self, request: &NotificationCreateDBRequest) -> Result<NotificationDBResponse> {
        let notification = sqlx::query_as::<_, NotificationDBResponse>(
            r#"
            INSERT INTO notifications (user_id, title, message, kind, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.title)
        .bind(&request.message)
        .bind(request.kind)
        .bind(request.category)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(notification)
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_user(
        &mut self,
        user_id: UserId,
        unread_only: bool,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<NotificationDBResponse>> {
        let mut query = String::from("SELECT * FROM notifications WHERE user_id = $1 AND is_active = TRUE");
        if unread_only {
            query.push_str(" AND is_read = FALSE");
        }
        query.push_str(&format!(" ORDER BY created_at DESC LIMIT {limit} OFFSET {skip}"));

        let notifications = sqlx::query_as::<_, NotificationDBResponse>(&query)
            .bind(user_id)
            .fetch_all(&mut *self.db)
            .await?;
        Ok(notifications)
    }

    #[instrument(skip(self), err)]
    pub async fn count_for_user(&mut self, user_id: UserId, unread_only: bool) -> Result<i64> {
        let mut query = String::from("SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND is_active = TRUE");
        if unread_only {
            query.push_str(" AND is_read = FALSE");
        }

        let count = sqlx::query_scalar::<_, i64>(&query).bind(user_id).fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    /// Mark one notification read. Scoped to the owner so a user cannot
    /// touch someone else's rows.
    #[instrument(skip(self), err)]
    pub async fn mark_read(&mut self, id: NotificationId, user_id: UserId) -> Result<Option<NotificationDBResponse>> {
        let notification = sqlx::query_as::<_, NotificationDBResponse>(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW() WHERE id = $1 AND user_id = $2 AND is_active = TRUE RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(notification)
    }

    #[instrument(skip(self), err)]
    pub async fn mark_all_read(&mut self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE notifications SET is_read = TRUE, read_at = NOW() WHERE user_id = $1 AND is_read = FALSE AND is_active = TRUE",
        )
        .bind(user_id)
        .execute(&mut *self.db)
        .await?;
        Ok(result.rows_affected())
    }

    #[instrument(skip(self), err)]
    pub async fn delete(&mut self, id: NotificationId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    pub async fn clear_all(&mut self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM notifications WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
