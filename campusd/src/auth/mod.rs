//! Authentication and authorization.
//!
//! Authentication is JWT-based: `/auth/login` verifies the password with
//! Argon2 and returns a signed bearer token; handlers require it through the
//! [`CurrentUser`](crate::api::models::users::CurrentUser) extractor.
//! Authorization is role-based through
//! [`permissions::RequiresPermission`], a typed extractor pairing a resource
//! marker with an operation marker.
//!
//! # Modules
//!
//! - [`current_user`]: extractor for the authenticated user
//! - [`password`]: password hashing and verification using Argon2
//! - [`permissions`]: permission checking and access control
//! - [`session`]: JWT session token creation and verification

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
