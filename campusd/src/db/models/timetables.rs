//! Database models for the weekly timetable.

use crate::types::{TimetableEntryId, UserId};
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Day of the week stored as TEXT in database
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    /// Today's day name in UTC.
    pub fn today() -> Self {
        Self::from(Utc::now().weekday())
    }
}

impl From<chrono::Weekday> for Day {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Day::Monday,
            chrono::Weekday::Tue => Day::Tuesday,
            chrono::Weekday::Wed => Day::Wednesday,
            chrono::Weekday::Thu => Day::Thursday,
            chrono::Weekday::Fri => Day::Friday,
            chrono::Weekday::Sat => Day::Saturday,
            chrono::Weekday::Sun => Day::Sunday,
        }
    }
}

/// Kind of scheduled session stored as TEXT in database
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Lecture,
    Tutorial,
    Lab,
    Seminar,
    Exam,
    Other,
}

/// Database request for creating a timetable entry
#[derive(Debug, Clone)]
pub struct TimetableEntryCreateDBRequest {
    pub user_id: UserId,
    pub day: Day,
    pub start_time: String,
    pub end_time: Option<String>,
    pub course: String,
    pub course_code: Option<String>,
    pub venue: Option<String>,
    pub lecturer: Option<String>,
    pub kind: EntryKind,
    pub color: Option<String>,
    pub notes: Option<String>,
}

/// Database request for updating a timetable entry
#[derive(Debug, Clone, Default)]
pub struct TimetableEntryUpdateDBRequest {
    pub day: Option<Day>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub course: Option<String>,
    pub course_code: Option<String>,
    pub venue: Option<String>,
    pub lecturer: Option<String>,
    pub kind: Option<EntryKind>,
    pub color: Option<String>,
    pub notes: Option<String>,
}

/// Database response for a timetable entry row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TimetableEntryDBResponse {
    pub id: TimetableEntryId,
    pub user_id: UserId,
    pub day: Day,
    pub start_time: String,
    pub end_time: Option<String>,
    pub course: String,
    pub course_code: Option<String>,
    pub venue: String,
    pub lecturer: String,
    pub kind: EntryKind,
    pub color: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
