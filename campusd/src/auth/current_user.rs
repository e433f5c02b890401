//! Extractor for the authenticated user.
//!
//! Handlers take a [`CurrentUser`] argument to require authentication. The
//! extractor reads the `Authorization: Bearer <token>` header and verifies
//! the JWT session token against the configured secret. Claims carry
//! everything the handlers need, so extraction never hits the database.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{AppState, api::models::users::CurrentUser, auth::session, errors::Error};

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(Error::Unauthenticated { message: None })?;

        let token = header.strip_prefix("Bearer ").ok_or(Error::Unauthenticated {
            message: Some("Expected a bearer token".to_string()),
        })?;

        session::verify_session_token(token, &state.config)
    }
}
