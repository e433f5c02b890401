//! Task handlers.

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        tasks::{ListTasksQuery, TaskCreate, TaskResponse, TaskUpdate},
        users::CurrentUser,
    },
    db::{
        handlers::{Repository, StudyStats, Tasks},
        models::tasks::{TaskCategory, TaskCreateDBRequest, TaskDBResponse, TaskFilter, TaskPriority, TaskStatus, TaskUpdateDBRequest},
    },
    errors::{Error, Result},
    types::TaskId,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;

fn task_not_found(id: TaskId) -> Error {
    Error::NotFound {
        resource: "Task".to_string(),
        id: id.to_string(),
    }
}

/// Look up a task and check the caller owns it. Another user's task reads as
/// absent, not forbidden.
async fn owned_task(tasks: &mut Tasks<'_>, id: TaskId, current_user: &CurrentUser) -> Result<TaskDBResponse> {
    let task = tasks.get_by_id(id).await?.ok_or_else(|| task_not_found(id))?;
    if task.user_id != current_user.id {
        return Err(task_not_found(id));
    }
    Ok(task)
}

/// List the caller's tasks
#[utoipa::path(
    get,
    path = "/tasks",
    tag = "tasks",
    summary = "List tasks",
    params(ListTasksQuery),
    responses(
        (status = 200, description = "Tasks", body = PaginatedResponse<TaskResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
    current_user: CurrentUser,
) -> Result<Json<PaginatedResponse<TaskResponse>>> {
    let (skip, limit) = query.pagination.params();
    let filter = TaskFilter {
        user_id: current_user.id,
        status: query.status,
        priority: query.priority,
        category: query.category,
        due_on: query.due_date,
        skip,
        limit,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Tasks::new(&mut conn);
    let total = repo.count(&filter).await?;
    let tasks = repo.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        tasks.into_iter().map(TaskResponse::from).collect(),
        total,
        skip,
        limit,
    )))
}

/// Create a task
#[utoipa::path(
    post,
    path = "/tasks",
    tag = "tasks",
    summary = "Create a task",
    responses(
        (status = 201, description = "Task created", body = TaskResponse),
        (status = 400, description = "Invalid data"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_task(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<TaskCreate>,
) -> Result<(StatusCode, Json<TaskResponse>)> {
    if data.title.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Please provide a task title".to_string(),
        });
    }

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let task = Tasks::new(&mut conn)
        .create(&TaskCreateDBRequest {
            user_id: current_user.id,
            title: data.title,
            description: data.description,
            due_date: data.due_date,
            due_time: data.due_time,
            priority: data.priority.unwrap_or(TaskPriority::Medium),
            category: data.category.unwrap_or(TaskCategory::Study),
            course: data.course,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(task))))
}

/// Get one task
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    tag = "tasks",
    summary = "Get a task",
    params(("id" = String, Path, description = "Task ID (UUID)")),
    responses(
        (status = 200, description = "Task", body = TaskResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_task(State(state): State<AppState>, Path(id): Path<TaskId>, current_user: CurrentUser) -> Result<Json<TaskResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let task = owned_task(&mut Tasks::new(&mut conn), id, &current_user).await?;
    Ok(Json(TaskResponse::from(task)))
}

/// Update a task. Completing it feeds the study-stats counter.
#[utoipa::path(
    patch,
    path = "/tasks/{id}",
    tag = "tasks",
    summary = "Update a task",
    params(("id" = String, Path, description = "Task ID (UUID)")),
    responses(
        (status = 200, description = "Updated task", body = TaskResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<TaskId>,
    current_user: CurrentUser,
    Json(data): Json<TaskUpdate>,
) -> Result<Json<TaskResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let existing = owned_task(&mut Tasks::new(&mut tx), id, &current_user).await?;

    let newly_completed = data.status == Some(TaskStatus::Completed) && existing.status != TaskStatus::Completed;
    let completed_at = newly_completed.then(Utc::now);

    let task = Tasks::new(&mut tx)
        .update(
            id,
            &TaskUpdateDBRequest {
                title: data.title,
                description: data.description,
                due_date: data.due_date,
                due_time: data.due_time,
                priority: data.priority,
                status: data.status,
                category: data.category,
                course: data.course,
                completed_at,
            },
        )
        .await?;

    if newly_completed {
        StudyStats::new(&mut tx).record_task_completed(current_user.id).await?;
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(TaskResponse::from(task)))
}

/// Delete (soft) a task
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    tag = "tasks",
    summary = "Delete a task",
    params(("id" = String, Path, description = "Task ID (UUID)")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_task(State(state): State<AppState>, Path(id): Path<TaskId>, current_user: CurrentUser) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut tasks = Tasks::new(&mut conn);

    owned_task(&mut tasks, id, &current_user).await?;
    tasks.delete(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{auth_header, create_test_app, create_test_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_task_crud(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        let response = app
            .post("/api/v1/tasks")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "title": "Read chapter 4", "priority": "high", "category": "assignment" }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let task: TaskResponse = response.json();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::High);

        let response = app
            .patch(&format!("/api/v1/tasks/{}", task.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "status": "in_progress" }))
            .await;
        response.assert_status_ok();
        let task: TaskResponse = response.json();
        assert_eq!(task.status, TaskStatus::InProgress);

        let response = app
            .delete(&format!("/api/v1/tasks/{}", task.id))
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        // Gone from listing and lookup
        let response = app.get(&format!("/api/v1/tasks/{}", task.id)).add_header(name, value).await;
        response.assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_completing_task_feeds_stats(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        let response = app
            .post("/api/v1/tasks")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "title": "Finish lab report" }))
            .await;
        let task: TaskResponse = response.json();

        let response = app
            .patch(&format!("/api/v1/tasks/{}", task.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "status": "completed" }))
            .await;
        response.assert_status_ok();
        let task: TaskResponse = response.json();
        assert!(task.completed_at.is_some());

        // Completing twice does not double-count
        app.patch(&format!("/api/v1/tasks/{}", task.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "status": "completed" }))
            .await
            .assert_status_ok();

        let response = app.get("/api/v1/dashboard/stats").add_header(name, value).await;
        response.assert_status_ok();
        let stats: serde_json::Value = response.json();
        assert_eq!(stats["tasks_completed"], 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_tasks_are_scoped_to_owner(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let owner = create_test_user(&pool).await;
        let other = create_test_user(&pool).await;

        let (name, value) = auth_header(&owner);
        let response = app
            .post("/api/v1/tasks")
            .add_header(name, value)
            .json(&json!({ "title": "Private task" }))
            .await;
        let task: TaskResponse = response.json();

        // A different user cannot see or delete it
        let (name, value) = auth_header(&other);
        app.get(&format!("/api/v1/tasks/{}", task.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status_not_found();
        app.delete(&format!("/api/v1/tasks/{}", task.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status_not_found();

        let response = app.get("/api/v1/tasks").add_header(name, value).await;
        let page: PaginatedResponse<TaskResponse> = response.json();
        assert!(page.data.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_tasks_filters_by_status(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        for title in ["a", "b"] {
            app.post("/api/v1/tasks")
                .add_header(name.clone(), value.clone())
                .json(&json!({ "title": title }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = app.get("/api/v1/tasks?status=pending").add_header(name.clone(), value.clone()).await;
        let page: PaginatedResponse<TaskResponse> = response.json();
        assert_eq!(page.data.len(), 2);

        let response = app.get("/api/v1/tasks?status=completed").add_header(name, value).await;
        let page: PaginatedResponse<TaskResponse> = response.json();
        assert!(page.data.is_empty());
    }
}
