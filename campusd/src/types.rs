//! Common type definitions and permission system types.
//!
//! All entity IDs are UUIDs wrapped in type aliases:
//!
//! - [`UserId`]: user account identifier
//! - [`WalletId`]: wallet identifier
//! - [`QuestionId`]: past question identifier
//! - [`DownloadId`]: download receipt identifier
//! - [`TaskId`], [`TimetableEntryId`], [`NewsId`], [`NotificationId`]
//!
//! The permission system combines a [`Resource`] (what is accessed) with an
//! [`Operation`] (what is done to it). Operations come in two flavors:
//! **All** (unrestricted) and **Own** (restricted to the caller's own rows).

use std::fmt;
use uuid::Uuid;

// Type aliases for IDs
pub type UserId = Uuid;
pub type WalletId = Uuid;
pub type QuestionId = Uuid;
pub type DownloadId = Uuid;
pub type TaskId = Uuid;
pub type TimetableEntryId = Uuid;
pub type NewsId = Uuid;
pub type NotificationId = Uuid;

/// The system user that owns the platform wallet. Seeded by the initial
/// migration.
pub fn system_user_id() -> UserId {
    Uuid::nil()
}

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

// Operations that can be performed on resources
// *-All means unrestricted access, *-Own means restricted to own resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAll,
    CreateOwn,
    ReadAll,
    ReadOwn,
    UpdateAll,
    UpdateOwn,
    DeleteAll,
    DeleteOwn,
}

impl Operation {
    /// Whether this operation is scoped to the caller's own rows.
    pub fn is_own(self) -> bool {
        matches!(
            self,
            Operation::CreateOwn | Operation::ReadOwn | Operation::UpdateOwn | Operation::DeleteOwn
        )
    }
}

// Resources that can be operated on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Wallets,
    PastQuestions,
    Downloads,
    Subscriptions,
    Tasks,
    Timetables,
    News,
    Notifications,
    Dashboard,
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Users => "users",
            Resource::Wallets => "wallets",
            Resource::PastQuestions => "past questions",
            Resource::Downloads => "downloads",
            Resource::Subscriptions => "subscriptions",
            Resource::Tasks => "tasks",
            Resource::Timetables => "timetables",
            Resource::News => "news",
            Resource::Notifications => "notifications",
            Resource::Dashboard => "dashboard",
        };
        write!(f, "{name}")
    }
}

// Permission types for authorization
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    /// Simple permission: (Resource, Operation)
    Allow(Resource, Operation),
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateAll | Operation::CreateOwn => write!(f, "Create"),
            Operation::ReadAll | Operation::ReadOwn => write!(f, "Read"),
            Operation::UpdateAll | Operation::UpdateOwn => write!(f, "Update"),
            Operation::DeleteAll | Operation::DeleteOwn => write!(f, "Delete"),
        }
    }
}
