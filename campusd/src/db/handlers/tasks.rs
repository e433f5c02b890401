//! Database repository for tasks.

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::tasks::{TaskCreateDBRequest, TaskDBResponse, TaskFilter, TaskUpdateDBRequest},
    },
    types::{TaskId, UserId},
};
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Tasks<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Tasks<'c> {
    type CreateRequest = TaskCreateDBRequest;
    type UpdateRequest = TaskUpdateDBRequest;
    type Response = TaskDBResponse;
    type Id = TaskId;
    type Filter = TaskFilter;

    #[instrument(skip(self, request), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let task = sqlx::query_as::<_, TaskDBResponse>(
            r#"
            INSERT INTO tasks (user_id, title, description, due_date, due_time, priority, category, course)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.due_date)
        .bind(&request.due_time)
        .bind(request.priority)
        .bind(request.category)
        .bind(&request.course)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(task)
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let task = sqlx::query_as::<_, TaskDBResponse>("SELECT * FROM tasks WHERE id = $1 AND is_active = TRUE")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(task)
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let mut query = String::from("SELECT * FROM tasks WHERE user_id = $1 AND is_active = TRUE");
        let mut idx = 1;

        if filter.status.is_some() {
            idx += 1;
            query.push_str(&format!(" AND status = ${idx}"));
        }
        if filter.priority.is_some() {
            idx += 1;
            query.push_str(&format!(" AND priority = ${idx}"));
        }
        if filter.category.is_some() {
            idx += 1;
            query.push_str(&format!(" AND category = ${idx}"));
        }
        if filter.due_on.is_some() {
            // Whole UTC day window
            query.push_str(&format!(" AND due_date >= ${} AND due_date < ${}", idx + 1, idx + 2));
        }

        query.push_str(&format!(
            " ORDER BY due_date ASC NULLS LAST, created_at DESC LIMIT {} OFFSET {}",
            filter.limit, filter.skip
        ));

        let mut sql_query = sqlx::query_as::<_, TaskDBResponse>(&query).bind(filter.user_id);
        if let Some(status) = filter.status {
            sql_query = sql_query.bind(status);
        }
        if let Some(priority) = filter.priority {
            sql_query = sql_query.bind(priority);
        }
        if let Some(category) = filter.category {
            sql_query = sql_query.bind(category);
        }
        if let Some(due_on) = filter.due_on {
            let start = due_on.and_hms_opt(0, 0, 0).unwrap().and_utc();
            let end = start + chrono::Duration::days(1);
            sql_query = sql_query.bind(start).bind(end);
        }

        let tasks = sql_query.fetch_all(&mut *self.db).await?;
        Ok(tasks)
    }

    /// Soft delete; the row survives for history but disappears from every
    /// listing.
    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("UPDATE tasks SET is_active = FALSE, updated_at = NOW() WHERE id = $1 AND is_active = TRUE")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let task = sqlx::query_as::<_, TaskDBResponse>(
            r#"
            UPDATE tasks SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                due_date = COALESCE($4, due_date),
                due_time = COALESCE($5, due_time),
                priority = COALESCE($6, priority),
                status = COALESCE($7, status),
                category = COALESCE($8, category),
                course = COALESCE($9, course),
                completed_at = COALESCE($10, completed_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(request.due_date)
        .bind(&request.due_time)
        .bind(request.priority)
        .bind(request.status)
        .bind(request.category)
        .bind(&request.course)
        .bind(request.completed_at)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(task)
    }
}

impl<'c> Tasks<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &TaskFilter) -> Result<i64> {
        let mut query = String::from("SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND is_active = TRUE");
        let mut idx = 1;

        if filter.status.is_some() {
            idx += 1;
            query.push_str(&format!(" AND status = ${idx}"));
        }
        if filter.priority.is_some() {
            idx += 1;
            query.push_str(&format!(" AND priority = ${idx}"));
        }
        if filter.category.is_some() {
            idx += 1;
            query.push_str(&format!(" AND category = ${idx}"));
        }
        if filter.due_on.is_some() {
            query.push_str(&format!(" AND due_date >= ${} AND due_date < ${}", idx + 1, idx + 2));
        }

        let mut sql_query = sqlx::query_scalar::<_, i64>(&query).bind(filter.user_id);
        if let Some(status) = filter.status {
            sql_query = sql_query.bind(status);
        }
        if let Some(priority) = filter.priority {
            sql_query = sql_query.bind(priority);
        }
        if let Some(category) = filter.category {
            sql_query = sql_query.bind(category);
        }
        if let Some(due_on) = filter.due_on {
            let start = due_on.and_hms_opt(0, 0, 0).unwrap().and_utc();
            let end = start + chrono::Duration::days(1);
            sql_query = sql_query.bind(start).bind(end);
        }

        let count = sql_query.fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn count_due_between(&mut self, user_id: UserId, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND is_active = TRUE AND due_date >= $2 AND due_date < $3",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn count_completed_between(&mut self, user_id: UserId, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND is_active = TRUE AND status = 'completed' \
             AND completed_at >= $2 AND completed_at < $3",
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn count_open(&mut self, user_id: UserId) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND is_active = TRUE AND status IN ('pending', 'in_progress')",
        )
        .bind(user_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(count)
    }

    /// Unfinished tasks due inside the window, soonest first.
    #[instrument(skip(self), err)]
    pub async fn upcoming(&mut self, user_id: UserId, until: DateTime<Utc>, limit: i64) -> Result<Vec<TaskDBResponse>> {
        let tasks = sqlx::query_as::<_, TaskDBResponse>(
            "SELECT * FROM tasks WHERE user_id = $1 AND is_active = TRUE AND status != 'completed' \
             AND due_date >= NOW() AND due_date <= $2 ORDER BY due_date ASC LIMIT $3",
        )
        .bind(user_id)
        .bind(until)
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(tasks)
    }
}
