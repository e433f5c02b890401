//! Database repository for study statistics.
//!
//! Day comparisons for the streak use UTC throughout; `last_study_date` is a
//! plain DATE column keyed on the UTC day.

use crate::{
    db::{
        errors::Result,
        models::study_stats::{StudySessionDBResponse, StudyStatsDBResponse, next_streak},
    },
    types::UserId,
};
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::instrument;

pub struct StudyStats<'c> {
    db: &'c mut PgConnection,
}

impl<'c> StudyStats<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_user(&mut self, user_id: UserId) -> Result<Option<StudyStatsDBResponse>> {
        let stats = sqlx::query_as::<_, StudyStatsDBResponse>("SELECT * FROM study_stats WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(stats)
    }

    /// Stats rows are created lazily with zeroed counters.
    #[instrument(skip(self), err)]
    pub async fn get_or_create(&mut self, user_id: UserId) -> Result<StudyStatsDBResponse> {
        if let Some(stats) = self.get_by_user(user_id).await? {
            return Ok(stats);
        }

        sqlx::query("INSERT INTO study_stats (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        let stats = sqlx::query_as::<_, StudyStatsDBResponse>("SELECT * FROM study_stats WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(stats)
    }

    /// Append a study session, accumulate the minutes and advance the streak.
    #[instrument(skip(self, subject), err)]
    pub async fn log_session(&mut self, user_id: UserId, duration_minutes: i32, subject: Option<String>) -> Result<StudyStatsDBResponse> {
        let stats = self.get_or_create(user_id).await?;

        sqlx::query("INSERT INTO study_sessions (stats_id, duration_minutes, subject) VALUES ($1, $2, $3)")
            .bind(stats.id)
            .bind(duration_minutes)
            .bind(&subject)
            .execute(&mut *self.db)
            .await?;

        let today = Utc::now().date_naive();
        let streak = next_streak(stats.last_study_date, today, stats.study_streak);
        let longest = stats.longest_streak.max(streak);

        let stats = sqlx::query_as::<_, StudyStatsDBResponse>(
            r#"
            UPDATE study_stats SET
                study_streak = $2,
                longest_streak = $3,
                last_study_date = $4,
                total_minutes_studied = total_minutes_studied + $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(stats.id)
        .bind(streak)
        .bind(longest)
        .bind(today)
        .bind(i64::from(duration_minutes))
        .fetch_one(&mut *self.db)
        .await?;

        Ok(stats)
    }

    /// Task-completion counter, fed by the task handler.
    #[instrument(skip(self), err)]
    pub async fn record_task_completed(&mut self, user_id: UserId) -> Result<()> {
        let stats = self.get_or_create(user_id).await?;
        sqlx::query("UPDATE study_stats SET total_tasks_completed = total_tasks_completed + 1, updated_at = NOW() WHERE id = $1")
            .bind(stats.id)
            .execute(&mut *self.db)
            .await?;
        Ok(())
    }

    /// Download counter, fed by settlement.
    #[instrument(skip(self), err)]
    pub async fn record_download(&mut self, user_id: UserId) -> Result<()> {
        let stats = self.get_or_create(user_id).await?;
        sqlx::query("UPDATE study_stats SET total_downloads = total_downloads + 1, updated_at = NOW() WHERE id = $1")
            .bind(stats.id)
            .execute(&mut *self.db)
            .await?;
        Ok(())
    }

    /// Sessions logged since the given instant, newest first.
    #[instrument(skip(self), err)]
    pub async fn sessions_since(&mut self, user_id: UserId, since: DateTime<Utc>) -> Result<Vec<StudySessionDBResponse>> {
        let sessions = sqlx::query_as::<_, StudySessionDBResponse>(
            r#"
            SELECT s.* FROM study_sessions s
            JOIN study_stats st ON st.id = s.stats_id
            WHERE st.user_id = $1 AND s.session_date >= $2
            ORDER BY s.session_date DESC
            "#,
        )
        .bind(user_id)
        .bind(since)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(sessions)
    }
}
