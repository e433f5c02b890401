//! Profile handlers.

use crate::{
    AppState,
    api::models::users::{CurrentUser, ProfileUpdate, UserResponse},
    db::{handlers::Users, models::users::UserUpdateDBRequest},
    errors::{Error, Result},
};
use axum::{extract::State, response::Json};

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "users",
    summary = "Get own profile",
    responses(
        (status = 200, description = "Profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_profile(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_by_id(current_user.id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: current_user.id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}

/// Update the caller's profile
#[utoipa::path(
    patch,
    path = "/users/profile",
    tag = "users",
    summary = "Update own profile",
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_profile(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<ProfileUpdate>,
) -> Result<Json<UserResponse>> {
    if let Some(full_name) = &data.full_name
        && full_name.trim().is_empty()
    {
        return Err(Error::BadRequest {
            message: "Name cannot be empty".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users
        .update_profile(
            current_user.id,
            &UserUpdateDBRequest {
                full_name: data.full_name,
                avatar_url: data.avatar_url,
                university: data.university,
                department: data.department,
                level: data.level,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{auth_header, create_test_app, create_test_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_profile(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        let response = app.get("/api/v1/users/profile").add_header(name, value).await;
        response.assert_status_ok();
        let profile: UserResponse = response.json();
        assert_eq!(profile.id, user.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_profile_unauthenticated(pool: PgPool) {
        let app = create_test_app(pool).await;
        let response = app.get("/api/v1/users/profile").await;
        response.assert_status_unauthorized();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_profile(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        let response = app
            .patch("/api/v1/users/profile")
            .add_header(name, value)
            .json(&json!({ "department": "Computer Science", "level": "300" }))
            .await;

        response.assert_status_ok();
        let profile: UserResponse = response.json();
        assert_eq!(profile.department.as_deref(), Some("Computer Science"));
        assert_eq!(profile.level.as_deref(), Some("300"));
    }
}
