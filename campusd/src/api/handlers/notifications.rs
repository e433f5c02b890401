//! Notification handlers.

use crate::{
    AppState,
    api::models::{
        notifications::{ListNotificationsQuery, NotificationListResponse, NotificationResponse, UnreadCountResponse},
        users::CurrentUser,
    },
    db::handlers::Notifications,
    errors::{Error, Result},
    types::NotificationId,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

/// List notifications with the unread count
#[utoipa::path(
    get,
    path = "/notifications",
    tag = "notifications",
    summary = "List notifications",
    params(ListNotificationsQuery),
    responses(
        (status = 200, description = "Notifications", body = NotificationListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_notifications(
    State(state): State<AppState>,
    Query(query): Query<ListNotificationsQuery>,
    current_user: CurrentUser,
) -> Result<Json<NotificationListResponse>> {
    let (skip, limit) = query.pagination.params();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut notifications = Notifications::new(&mut conn);

    let unread_only = query.unread_only();
    let total_count = notifications.count_for_user(current_user.id, unread_only).await?;
    let unread_count = notifications.count_for_user(current_user.id, true).await?;
    let page = notifications.list_for_user(current_user.id, unread_only, skip, limit).await?;

    Ok(Json(NotificationListResponse {
        notifications: page.into_iter().map(NotificationResponse::from).collect(),
        total_count,
        unread_count,
    }))
}

/// Unread notification count
#[utoipa::path(
    get,
    path = "/notifications/unread-count",
    tag = "notifications",
    summary = "Get unread count",
    responses(
        (status = 200, description = "Unread count", body = UnreadCountResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn unread_count(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UnreadCountResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let unread_count = Notifications::new(&mut conn).count_for_user(current_user.id, true).await?;
    Ok(Json(UnreadCountResponse { unread_count }))
}

/// Mark one notification read
#[utoipa::path(
    put,
    path = "/notifications/{id}/read",
    tag = "notifications",
    summary = "Mark a notification read",
    params(("id" = String, Path, description = "Notification ID (UUID)")),
    responses(
        (status = 200, description = "Notification", body = NotificationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_as_read(
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
    current_user: CurrentUser,
) -> Result<Json<NotificationResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let notification = Notifications::new(&mut conn)
        .mark_read(id, current_user.id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Notification".to_string(),
            id: id.to_string(),
        })?;

    Ok(Json(NotificationResponse::from(notification)))
}

/// Mark every notification read
#[utoipa::path(
    put,
    path = "/notifications/read-all",
    tag = "notifications",
    summary = "Mark all notifications read",
    responses(
        (status = 204, description = "All read"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_all_as_read(State(state): State<AppState>, current_user: CurrentUser) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Notifications::new(&mut conn).mark_all_read(current_user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Delete one notification
#[utoipa::path(
    delete,
    path = "/notifications/{id}",
    tag = "notifications",
    summary = "Delete a notification",
    params(("id" = String, Path, description = "Notification ID (UUID)")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<NotificationId>,
    current_user: CurrentUser,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let deleted = Notifications::new(&mut conn).delete(id, current_user.id).await?;
    if !deleted {
        return Err(Error::NotFound {
            resource: "Notification".to_string(),
            id: id.to_string(),
        });
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Clear every notification
#[utoipa::path(
    delete,
    path = "/notifications",
    tag = "notifications",
    summary = "Clear all notifications",
    responses(
        (status = 204, description = "Cleared"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn clear_all_notifications(State(state): State<AppState>, current_user: CurrentUser) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    Notifications::new(&mut conn).clear_all(current_user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
