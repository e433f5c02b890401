//! Database models for user accounts.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub full_name: String,
    pub email: String,
    pub student_id: String,
    pub password_hash: Option<String>,
    pub university: Option<String>,
    pub department: Option<String>,
    pub level: Option<String>,
    pub is_admin: bool,
}

/// Database request for updating a user profile. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub university: Option<String>,
    pub department: Option<String>,
    pub level: Option<String>,
}

/// Database response for a user row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub student_id: String,
    pub password_hash: Option<String>,
    pub avatar_url: Option<String>,
    pub university: Option<String>,
    pub department: Option<String>,
    pub level: Option<String>,
    pub is_admin: bool,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
