//! Database models for tasks.

use crate::types::{TaskId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskCategory {
    Study,
    Assignment,
    Exam,
    Project,
    Personal,
    Other,
}

/// Database request for creating a task
#[derive(Debug, Clone)]
pub struct TaskCreateDBRequest {
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub due_time: Option<String>,
    pub priority: TaskPriority,
    pub category: TaskCategory,
    pub course: Option<String>,
}

/// Database request for updating a task. `None` fields are left untouched;
/// `completed_at` is set by the handler when the status transitions to
/// completed.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdateDBRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub due_time: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub category: Option<TaskCategory>,
    pub course: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Database response for a task row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskDBResponse {
    pub id: TaskId,
    pub user_id: UserId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub due_time: Option<String>,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub category: TaskCategory,
    pub course: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter for listing a user's tasks
#[derive(Debug, Clone)]
pub struct TaskFilter {
    pub user_id: UserId,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub category: Option<TaskCategory>,
    pub due_on: Option<chrono::NaiveDate>,
    pub skip: i64,
    pub limit: i64,
}
