//! API request/response models for notifications.

use crate::db::models::notifications::{NotificationCategory, NotificationDBResponse, NotificationKind};
use crate::types::NotificationId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::pagination::Pagination;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: NotificationId,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub category: NotificationCategory,
    pub is_read: bool,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<NotificationDBResponse> for NotificationResponse {
    fn from(db: NotificationDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            message: db.message,
            kind: db.kind,
            category: db.category,
            is_read: db.is_read,
            read_at: db.read_at,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for the notification listing
#[serde_with::serde_as]
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListNotificationsQuery {
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,

    /// Only unread notifications
    #[serde_as(as = "Option<serde_with::DisplayFromStr>")]
    pub unread_only: Option<bool>,
}

impl ListNotificationsQuery {
    pub fn unread_only(&self) -> bool {
        self.unread_only.unwrap_or(false)
    }
}

/// Notification listing with the unread count alongside.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationListResponse {
    pub notifications: Vec<NotificationResponse>,
    pub total_count: i64,
    pub unread_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}
