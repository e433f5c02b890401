//! Timetable handlers.

use crate::{
    AppState,
    api::models::{
        timetables::{TimetableEntryCreate, TimetableEntryResponse, TimetableEntryUpdate, TimetableReplace, TimetableResponse, TodayScheduleResponse},
        users::CurrentUser,
    },
    db::{
        handlers::Timetables,
        models::timetables::{Day, EntryKind, TimetableEntryCreateDBRequest, TimetableEntryDBResponse, TimetableEntryUpdateDBRequest},
    },
    errors::{Error, Result},
    types::{TimetableEntryId, UserId},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

fn entry_not_found(id: TimetableEntryId) -> Error {
    Error::NotFound {
        resource: "Schedule item".to_string(),
        id: id.to_string(),
    }
}

fn to_db_request(user_id: UserId, item: TimetableEntryCreate) -> TimetableEntryCreateDBRequest {
    TimetableEntryCreateDBRequest {
        user_id,
        day: item.day,
        start_time: item.start_time,
        end_time: item.end_time,
        course: item.course,
        course_code: item.course_code,
        venue: item.venue,
        lecturer: item.lecturer,
        kind: item.kind.unwrap_or(EntryKind::Lecture),
        color: item.color,
        notes: item.notes,
    }
}

async fn owned_entry(timetables: &mut Timetables<'_>, id: TimetableEntryId, current_user: &CurrentUser) -> Result<TimetableEntryDBResponse> {
    let entry = timetables.get_entry(id).await?.ok_or_else(|| entry_not_found(id))?;
    if entry.user_id != current_user.id {
        return Err(entry_not_found(id));
    }
    Ok(entry)
}

/// Get the weekly schedule
#[utoipa::path(
    get,
    path = "/timetable",
    tag = "timetable",
    summary = "Get the weekly timetable",
    responses(
        (status = 200, description = "Timetable", body = TimetableResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_timetable(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<TimetableResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let entries = Timetables::new(&mut conn).list_for_user(current_user.id).await?;
    Ok(Json(TimetableResponse {
        schedule: entries.into_iter().map(TimetableEntryResponse::from).collect(),
    }))
}

/// Replace the whole schedule
#[utoipa::path(
    put,
    path = "/timetable",
    tag = "timetable",
    summary = "Replace the timetable",
    responses(
        (status = 200, description = "New timetable", body = TimetableResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn replace_timetable(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<TimetableReplace>,
) -> Result<Json<TimetableResponse>> {
    let entries: Vec<TimetableEntryCreateDBRequest> = data
        .schedule
        .into_iter()
        .map(|item| to_db_request(current_user.id, item))
        .collect();

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let created = Timetables::new(&mut tx).replace_schedule(current_user.id, &entries).await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(TimetableResponse {
        schedule: created.into_iter().map(TimetableEntryResponse::from).collect(),
    }))
}

/// Add a schedule item
#[utoipa::path(
    post,
    path = "/timetable/items",
    tag = "timetable",
    summary = "Add a schedule item",
    responses(
        (status = 201, description = "Schedule item", body = TimetableEntryResponse),
        (status = 400, description = "Invalid data"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_schedule_item(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<TimetableEntryCreate>,
) -> Result<(StatusCode, Json<TimetableEntryResponse>)> {
    if data.course.trim().is_empty() || data.start_time.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Please provide a course and start time".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let entry = Timetables::new(&mut conn).add_entry(&to_db_request(current_user.id, data)).await?;

    Ok((StatusCode::CREATED, Json(TimetableEntryResponse::from(entry))))
}

/// Update a schedule item
#[utoipa::path(
    patch,
    path = "/timetable/items/{id}",
    tag = "timetable",
    summary = "Update a schedule item",
    params(("id" = String, Path, description = "Schedule item ID (UUID)")),
    responses(
        (status = 200, description = "Schedule item", body = TimetableEntryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_schedule_item(
    State(state): State<AppState>,
    Path(id): Path<TimetableEntryId>,
    current_user: CurrentUser,
    Json(data): Json<TimetableEntryUpdate>,
) -> Result<Json<TimetableEntryResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut timetables = Timetables::new(&mut conn);

    owned_entry(&mut timetables, id, &current_user).await?;

    let entry = timetables
        .update_entry(
            id,
            &TimetableEntryUpdateDBRequest {
                day: data.day,
                start_time: data.start_time,
                end_time: data.end_time,
                course: data.course,
                course_code: data.course_code,
                venue: data.venue,
                lecturer: data.lecturer,
                kind: data.kind,
                color: data.color,
                notes: data.notes,
            },
        )
        .await?;

    Ok(Json(TimetableEntryResponse::from(entry)))
}

/// Remove a schedule item
#[utoipa::path(
    delete,
    path = "/timetable/items/{id}",
    tag = "timetable",
    summary = "Delete a schedule item",
    params(("id" = String, Path, description = "Schedule item ID (UUID)")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_schedule_item(
    State(state): State<AppState>,
    Path(id): Path<TimetableEntryId>,
    current_user: CurrentUser,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut timetables = Timetables::new(&mut conn);

    owned_entry(&mut timetables, id, &current_user).await?;
    timetables.delete_entry(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Today's classes
#[utoipa::path(
    get,
    path = "/timetable/today",
    tag = "timetable",
    summary = "Get today's schedule",
    responses(
        (status = 200, description = "Today's classes", body = TodayScheduleResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn today_schedule(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<TodayScheduleResponse>> {
    let today = Day::today();
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let entries = Timetables::new(&mut conn).list_for_day(current_user.id, today).await?;

    Ok(Json(TodayScheduleResponse {
        day: today,
        classes: entries.into_iter().map(TimetableEntryResponse::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{auth_header, create_test_app, create_test_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_schedule_item_lifecycle(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        let response = app
            .post("/api/v1/timetable/items")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "day": "Monday",
                "start_time": "08:00",
                "end_time": "10:00",
                "course": "Operating Systems",
                "course_code": "csc305"
            }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let entry: TimetableEntryResponse = response.json();
        assert_eq!(entry.course_code.as_deref(), Some("CSC305"));
        assert_eq!(entry.venue, "TBA");

        let response = app
            .patch(&format!("/api/v1/timetable/items/{}", entry.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "venue": "LT-2" }))
            .await;
        response.assert_status_ok();
        let entry: TimetableEntryResponse = response.json();
        assert_eq!(entry.venue, "LT-2");

        let response = app.get("/api/v1/timetable").add_header(name.clone(), value.clone()).await;
        let timetable: TimetableResponse = response.json();
        assert_eq!(timetable.schedule.len(), 1);

        app.delete(&format!("/api/v1/timetable/items/{}", entry.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let response = app.get("/api/v1/timetable").add_header(name, value).await;
        let timetable: TimetableResponse = response.json();
        assert!(timetable.schedule.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_replace_schedule(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        app.post("/api/v1/timetable/items")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "day": "Friday", "start_time": "12:00", "course": "Old course" }))
            .await
            .assert_status(StatusCode::CREATED);

        let response = app
            .put("/api/v1/timetable")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "schedule": [
                    { "day": "Monday", "start_time": "08:00", "course": "Algorithms" },
                    { "day": "Tuesday", "start_time": "10:00", "course": "Databases" }
                ]
            }))
            .await;
        response.assert_status_ok();
        let timetable: TimetableResponse = response.json();
        assert_eq!(timetable.schedule.len(), 2);

        // The old entry is gone
        let response = app.get("/api/v1/timetable").add_header(name, value).await;
        let timetable: TimetableResponse = response.json();
        assert_eq!(timetable.schedule.len(), 2);
        assert!(timetable.schedule.iter().all(|e| e.course != "Old course"));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_items_are_scoped_to_owner(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let owner = create_test_user(&pool).await;
        let other = create_test_user(&pool).await;

        let (name, value) = auth_header(&owner);
        let response = app
            .post("/api/v1/timetable/items")
            .add_header(name, value)
            .json(&json!({ "day": "Monday", "start_time": "08:00", "course": "Private" }))
            .await;
        let entry: TimetableEntryResponse = response.json();

        let (name, value) = auth_header(&other);
        app.delete(&format!("/api/v1/timetable/items/{}", entry.id))
            .add_header(name, value)
            .await
            .assert_status_not_found();
    }
}
