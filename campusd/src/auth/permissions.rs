//! Permission checking and the `RequiresPermission` extractor.
//!
//! A handler states its requirement in the signature:
//!
//! ```ignore
//! async fn create_news(
//!     State(state): State<AppState>,
//!     perm: RequiresPermission<resource::News, operation::CreateAll>,
//! ) -> Result<...> { ... }
//! ```
//!
//! Extraction authenticates the caller and checks the (resource, operation)
//! pair against their role. Admins hold every permission; students hold the
//! *Own-scoped operations plus unrestricted reads of public resources.

use std::marker::PhantomData;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{
    AppState,
    api::models::users::CurrentUser,
    errors::Error,
    types::{Operation, Permission, Resource},
};

/// Marker type mapping to a [`Resource`] variant.
pub trait ResourceType: Send + Sync {
    const RESOURCE: Resource;
}

/// Marker type mapping to an [`Operation`] variant.
pub trait OperationType: Send + Sync {
    const OPERATION: Operation;
}

macro_rules! resource_markers {
    ($($name:ident),* $(,)?) => {
        /// Zero-sized resource markers for [`RequiresPermission`].
        pub mod resource {
            $(
                pub struct $name;
                impl super::ResourceType for $name {
                    const RESOURCE: super::Resource = super::Resource::$name;
                }
            )*
        }
    };
}

macro_rules! operation_markers {
    ($($name:ident),* $(,)?) => {
        /// Zero-sized operation markers for [`RequiresPermission`].
        pub mod operation {
            $(
                pub struct $name;
                impl super::OperationType for $name {
                    const OPERATION: super::Operation = super::Operation::$name;
                }
            )*
        }
    };
}

resource_markers!(Users, Wallets, PastQuestions, Downloads, Subscriptions, Tasks, Timetables, News, Notifications, Dashboard);
operation_markers!(CreateAll, CreateOwn, ReadAll, ReadOwn, UpdateAll, UpdateOwn, DeleteAll, DeleteOwn);

/// Whether the user's role grants the (resource, operation) pair.
pub fn role_allows(user: &CurrentUser, resource: Resource, operation: Operation) -> bool {
    if user.is_admin {
        return true;
    }

    // Students may do anything scoped to their own rows
    if operation.is_own() {
        return true;
    }

    // The only unrestricted operations students hold are reads of the public
    // catalog and the news feed
    matches!(
        (resource, operation),
        (Resource::PastQuestions, Operation::ReadAll) | (Resource::News, Operation::ReadAll)
    )
}

/// Typed permission requirement, checked at extraction time.
pub struct RequiresPermission<R: ResourceType, O: OperationType> {
    pub user: CurrentUser,
    _marker: PhantomData<fn() -> (R, O)>,
}

impl<R, O> FromRequestParts<AppState> for RequiresPermission<R, O>
where
    R: ResourceType,
    O: OperationType,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !role_allows(&user, R::RESOURCE, O::OPERATION) {
            return Err(Error::InsufficientPermissions {
                required: Permission::Allow(R::RESOURCE, O::OPERATION),
                action: O::OPERATION,
                resource: R::RESOURCE.to_string(),
            });
        }

        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(is_admin: bool) -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            email: "student@example.com".to_string(),
            full_name: "Student".to_string(),
            is_admin,
        }
    }

    #[test]
    fn admin_holds_everything() {
        let admin = user(true);
        assert!(role_allows(&admin, Resource::News, Operation::CreateAll));
        assert!(role_allows(&admin, Resource::Wallets, Operation::ReadAll));
    }

    #[test]
    fn student_holds_own_operations() {
        let student = user(false);
        assert!(role_allows(&student, Resource::Wallets, Operation::ReadOwn));
        assert!(role_allows(&student, Resource::Tasks, Operation::DeleteOwn));
        assert!(role_allows(&student, Resource::PastQuestions, Operation::CreateOwn));
    }

    #[test]
    fn student_cannot_write_news() {
        let student = user(false);
        assert!(!role_allows(&student, Resource::News, Operation::CreateAll));
        assert!(!role_allows(&student, Resource::News, Operation::UpdateAll));
        assert!(!role_allows(&student, Resource::News, Operation::DeleteAll));
    }

    #[test]
    fn student_reads_public_resources() {
        let student = user(false);
        assert!(role_allows(&student, Resource::News, Operation::ReadAll));
        assert!(role_allows(&student, Resource::PastQuestions, Operation::ReadAll));
        assert!(!role_allows(&student, Resource::Wallets, Operation::ReadAll));
    }
}
