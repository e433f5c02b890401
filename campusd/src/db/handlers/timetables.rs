//! Database repository for timetable entries.

use crate::{
    db::{
        errors::Result,
        models::timetables::{Day, TimetableEntryCreateDBRequest, TimetableEntryDBResponse, TimetableEntryUpdateDBRequest},
    },
    types::{TimetableEntryId, UserId},
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct Timetables<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Timetables<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), err)]
    pub async fn add_entry(&mut self, request: &TimetableEntryCreateDBRequest) -> Result<TimetableEntryDBResponse> {
        let entry = sqlx::query_as::<_, TimetableEntryDBResponse>(
            r#"
            INSERT INTO timetable_entries
                (user_id, day, start_time, end_time, course, course_code, venue, lecturer, kind, color, notes)
            VALUES ($1, $2, $3, $4, $5, upper($6), COALESCE($7, 'TBA'), COALESCE($8, 'TBA'), $9, COALESCE($10, '#4A90A4'), $11)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(request.day)
        .bind(&request.start_time)
        .bind(&request.end_time)
        .bind(&request.course)
        .bind(&request.course_code)
        .bind(&request.venue)
        .bind(&request.lecturer)
        .bind(request.kind)
        .bind(&request.color)
        .bind(&request.notes)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(entry)
    }

    #[instrument(skip(self), err)]
    pub async fn get_entry(&mut self, id: TimetableEntryId) -> Result<Option<TimetableEntryDBResponse>> {
        let entry = sqlx::query_as::<_, TimetableEntryDBResponse>("SELECT * FROM timetable_entries WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(entry)
    }

    /// The whole weekly schedule, ordered by weekday then start time.
    #[instrument(skip(self), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<TimetableEntryDBResponse>> {
        let entries = sqlx::query_as::<_, TimetableEntryDBResponse>(
            r#"
            SELECT * FROM timetable_entries WHERE user_id = $1
            ORDER BY array_position(ARRAY['Monday','Tuesday','Wednesday','Thursday','Friday','Saturday','Sunday'], day), start_time
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(entries)
    }

    #[instrument(skip(self), err)]
    pub async fn list_for_day(&mut self, user_id: UserId, day: Day) -> Result<Vec<TimetableEntryDBResponse>> {
        let entries = sqlx::query_as::<_, TimetableEntryDBResponse>(
            "SELECT * FROM timetable_entries WHERE user_id = $1 AND day = $2 ORDER BY start_time",
        )
        .bind(user_id)
        .bind(day)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(entries)
    }

    #[instrument(skip(self), err)]
    pub async fn count_for_day(&mut self, user_id: UserId, day: Day) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM timetable_entries WHERE user_id = $1 AND day = $2")
            .bind(user_id)
            .bind(day)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self, request), err)]
    pub async fn update_entry(&mut self, id: TimetableEntryId, request: &TimetableEntryUpdateDBRequest) -> Result<TimetableEntryDBResponse> {
        let entry = sqlx::query_as::<_, TimetableEntryDBResponse>(
            r#"
            UPDATE timetable_entries SET
                day = COALESCE($2, day),
                start_time = COALESCE($3, start_time),
                end_time = COALESCE($4, end_time),
                course = COALESCE($5, course),
                course_code = COALESCE(upper($6), course_code),
                venue = COALESCE($7, venue),
                lecturer = COALESCE($8, lecturer),
                kind = COALESCE($9, kind),
                color = COALESCE($10, color),
                notes = COALESCE($11, notes),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.day)
        .bind(&request.start_time)
        .bind(&request.end_time)
        .bind(&request.course)
        .bind(&request.course_code)
        .bind(&request.venue)
        .bind(&request.lecturer)
        .bind(request.kind)
        .bind(&request.color)
        .bind(&request.notes)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(entry)
    }

    #[instrument(skip(self), err)]
    pub async fn delete_entry(&mut self, id: TimetableEntryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM timetable_entries WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Replace the whole schedule in one sweep. Runs inside the caller's
    /// transaction so a failed insert leaves the previous schedule intact.
    #[instrument(skip(self, entries), fields(count = entries.len()), err)]
    pub async fn replace_schedule(
        &mut self,
        user_id: UserId,
        entries: &[TimetableEntryCreateDBRequest],
    ) -> Result<Vec<TimetableEntryDBResponse>> {
        sqlx::query("DELETE FROM timetable_entries WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        let mut created = Vec::with_capacity(entries.len());
        for entry in entries {
            created.push(self.add_entry(entry).await?);
        }
        Ok(created)
    }
}
