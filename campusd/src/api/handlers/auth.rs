//! Registration and login.

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        users::{CurrentUser, UserResponse},
    },
    auth::{password, session},
    db::{handlers::Users, models::users::UserCreateDBRequest},
    errors::{Error, Result},
};
use axum::{extract::State, http::StatusCode, response::Json};

const MIN_PASSWORD_LENGTH: usize = 6;

/// Register a new student account
#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    summary = "Register a new account",
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid registration data"),
        (status = 409, description = "Email or student ID already registered"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn register(State(state): State<AppState>, Json(data): Json<RegisterRequest>) -> Result<(StatusCode, Json<AuthResponse>)> {
    if data.full_name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Please provide your full name".to_string(),
        });
    }
    if !data.email.contains('@') {
        return Err(Error::BadRequest {
            message: "Please provide a valid email".to_string(),
        });
    }
    if data.student_id.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Please provide your student ID".to_string(),
        });
    }
    if data.password.len() < MIN_PASSWORD_LENGTH {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {MIN_PASSWORD_LENGTH} characters"),
        });
    }

    let password_hash = password::hash_string(&data.password)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users
        .create(&UserCreateDBRequest {
            full_name: data.full_name.trim().to_string(),
            email: data.email.trim().to_lowercase(),
            student_id: data.student_id.trim().to_uppercase(),
            password_hash: Some(password_hash),
            university: data.university,
            department: data.department,
            level: data.level,
            is_admin: false,
        })
        .await?;

    let token = session::create_session_token(&CurrentUser::from(&user), &state.config)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from(user),
        }),
    ))
}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    summary = "Log in",
    responses(
        (status = 200, description = "Logged in", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn login(State(state): State<AppState>, Json(data): Json<LoginRequest>) -> Result<Json<AuthResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    // Same rejection for unknown email and wrong password
    let invalid_credentials = || Error::Unauthenticated {
        message: Some("Invalid email or password".to_string()),
    };

    let user = users.get_by_email(&data.email).await?.ok_or_else(invalid_credentials)?;

    if !user.is_active {
        return Err(invalid_credentials());
    }

    let password_hash = user.password_hash.as_deref().ok_or_else(invalid_credentials)?;
    if !password::verify_string(&data.password, password_hash)? {
        return Err(invalid_credentials());
    }

    users.touch_last_login(user.id).await?;

    let token = session::create_session_token(&CurrentUser::from(&user), &state.config)?;

    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_app;
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_and_login(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app
            .post("/api/v1/auth/register")
            .json(&json!({
                "full_name": "Ada Obi",
                "email": "ada@example.com",
                "student_id": "csc/2021/001",
                "password": "secret123"
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: AuthResponse = response.json();
        assert!(!body.token.is_empty());
        assert_eq!(body.user.email, "ada@example.com");
        // Student IDs are stored uppercased
        assert_eq!(body.user.student_id, "CSC/2021/001");

        let response = app
            .post("/api/v1/auth/login")
            .json(&json!({ "email": "ada@example.com", "password": "secret123" }))
            .await;

        response.assert_status_ok();
        let body: AuthResponse = response.json();
        assert!(!body.token.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_email_conflicts(pool: PgPool) {
        let app = create_test_app(pool).await;

        let payload = json!({
            "full_name": "Ada Obi",
            "email": "ada@example.com",
            "student_id": "CSC/2021/001",
            "password": "secret123"
        });

        app.post("/api/v1/auth/register").json(&payload).await.assert_status(StatusCode::CREATED);

        let duplicate = json!({
            "full_name": "Other Ada",
            "email": "ada@example.com",
            "student_id": "CSC/2021/002",
            "password": "secret123"
        });
        let response = app.post("/api/v1/auth/register").json(&duplicate).await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_short_password_rejected(pool: PgPool) {
        let app = create_test_app(pool).await;

        let response = app
            .post("/api/v1/auth/register")
            .json(&json!({
                "full_name": "Ada Obi",
                "email": "ada@example.com",
                "student_id": "CSC/2021/001",
                "password": "tiny"
            }))
            .await;

        response.assert_status_bad_request();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_wrong_password(pool: PgPool) {
        let app = create_test_app(pool).await;

        app.post("/api/v1/auth/register")
            .json(&json!({
                "full_name": "Ada Obi",
                "email": "ada@example.com",
                "student_id": "CSC/2021/001",
                "password": "secret123"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = app
            .post("/api/v1/auth/login")
            .json(&json!({ "email": "ada@example.com", "password": "wrong-password" }))
            .await;

        response.assert_status_unauthorized();
    }
}
