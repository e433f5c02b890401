//! API request/response models for the timetable.

use crate::db::models::timetables::{Day, EntryKind, TimetableEntryDBResponse};
use crate::types::TimetableEntryId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimetableEntryCreate {
    pub day: Day,
    pub start_time: String,
    pub end_time: Option<String>,
    pub course: String,
    pub course_code: Option<String>,
    pub venue: Option<String>,
    pub lecturer: Option<String>,
    pub kind: Option<EntryKind>,
    pub color: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimetableEntryUpdate {
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

/// Full-schedule replacement payload.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimetableReplace {
    pub schedule: Vec<TimetableEntryCreate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimetableEntryResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: TimetableEntryId,
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
}

impl From<TimetableEntryDBResponse> for TimetableEntryResponse {
    fn from(db: TimetableEntryDBResponse) -> Self {
        Self {
            id: db.id,
            day: db.day,
            start_time: db.start_time,
            end_time: db.end_time,
            course: db.course,
            course_code: db.course_code,
            venue: db.venue,
            lecturer: db.lecturer,
            kind: db.kind,
            color: db.color,
            notes: db.notes,
        }
    }
}

/// The weekly schedule.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimetableResponse {
    pub schedule: Vec<TimetableEntryResponse>,
}

/// Today's classes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodayScheduleResponse {
    pub day: Day,
    pub classes: Vec<TimetableEntryResponse>,
}
