//! News handlers. Reads are public; writes require the news permissions,
//! which only admins hold.

use crate::{
    AppState,
    api::models::{
        news::{CategoryCount, ListNewsQuery, NewsCreate, NewsResponse, NewsUpdate},
        pagination::PaginatedResponse,
    },
    auth::permissions::{RequiresPermission, operation, resource},
    db::{
        handlers::News,
        models::news::{NewsCategory, NewsCreateDBRequest, NewsFilter, NewsUpdateDBRequest},
    },
    errors::{Error, Result},
    types::NewsId,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};

fn article_not_found(id: NewsId) -> Error {
    Error::NotFound {
        resource: "News article".to_string(),
        id: id.to_string(),
    }
}

/// List published news
#[utoipa::path(
    get,
    path = "/news",
    tag = "news",
    summary = "Browse news",
    params(ListNewsQuery),
    responses(
        (status = 200, description = "News page", body = PaginatedResponse<NewsResponse>),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn list_news(
    State(state): State<AppState>,
    Query(query): Query<ListNewsQuery>,
) -> Result<Json<PaginatedResponse<NewsResponse>>> {
    let (skip, limit) = query.pagination.params();
    let filter = NewsFilter {
        category: query.category,
        search: query.search,
        skip,
        limit,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut news = News::new(&mut conn);

    let total = news.count(&filter).await?;
    let articles = news.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        articles.into_iter().map(NewsResponse::from).collect(),
        total,
        skip,
        limit,
    )))
}

/// Category names with published article counts
#[utoipa::path(
    get,
    path = "/news/categories",
    tag = "news",
    summary = "List news categories",
    responses(
        (status = 200, description = "Categories", body = [CategoryCount]),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn get_categories(State(state): State<AppState>) -> Result<Json<Vec<CategoryCount>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut news = News::new(&mut conn);

    let mut categories = Vec::with_capacity(NewsCategory::ALL.len());
    for category in NewsCategory::ALL {
        let count = news.count_by_category(category).await?;
        categories.push(CategoryCount { category, count });
    }

    Ok(Json(categories))
}

/// Read one article; bumps the view counter
#[utoipa::path(
    get,
    path = "/news/{id}",
    tag = "news",
    summary = "Get a news article",
    params(("id" = String, Path, description = "Article ID (UUID)")),
    responses(
        (status = 200, description = "Article", body = NewsResponse),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn get_news_article(State(state): State<AppState>, Path(id): Path<NewsId>) -> Result<Json<NewsResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut news = News::new(&mut conn);

    news.get_by_id(id).await?.ok_or_else(|| article_not_found(id))?;
    news.increment_views(id).await?;
    let article = news.get_by_id(id).await?.ok_or_else(|| article_not_found(id))?;

    Ok(Json(NewsResponse::from(article)))
}

/// Publish an article (admin only)
#[utoipa::path(
    post,
    path = "/news",
    tag = "news",
    summary = "Create a news article",
    responses(
        (status = 201, description = "Article created", body = NewsResponse),
        (status = 400, description = "Invalid data"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Requires admin"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_news_article(
    State(state): State<AppState>,
    perm: RequiresPermission<resource::News, operation::CreateAll>,
    Json(data): Json<NewsCreate>,
) -> Result<(StatusCode, Json<NewsResponse>)> {
    if data.title.trim().is_empty() || data.content.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Please provide a title and content".to_string(),
        });
    }

    let author = data.author.unwrap_or_else(|| perm.user.full_name.clone());

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let article = News::new(&mut conn)
        .create(&NewsCreateDBRequest {
            title: data.title,
            description: data.description,
            content: data.content,
            category: data.category,
            image_url: data.image_url,
            author,
            author_id: Some(perm.user.id),
            is_published: data.is_published.unwrap_or(true),
            tags: data.tags,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(NewsResponse::from(article))))
}

/// Edit an article (admin only)
#[utoipa::path(
    patch,
    path = "/news/{id}",
    tag = "news",
    summary = "Update a news article",
    params(("id" = String, Path, description = "Article ID (UUID)")),
    responses(
        (status = 200, description = "Updated article", body = NewsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Requires admin"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_news_article(
    State(state): State<AppState>,
    Path(id): Path<NewsId>,
    _perm: RequiresPermission<resource::News, operation::UpdateAll>,
    Json(data): Json<NewsUpdate>,
) -> Result<Json<NewsResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut news = News::new(&mut conn);

    news.get_by_id(id).await?.ok_or_else(|| article_not_found(id))?;

    let article = news
        .update(
            id,
            &NewsUpdateDBRequest {
                title: data.title,
                description: data.description,
                content: data.content,
                category: data.category,
                image_url: data.image_url,
                is_published: data.is_published,
                tags: data.tags,
            },
        )
        .await?;

    Ok(Json(NewsResponse::from(article)))
}

/// Delete an article (admin only)
#[utoipa::path(
    delete,
    path = "/news/{id}",
    tag = "news",
    summary = "Delete a news article",
    params(("id" = String, Path, description = "Article ID (UUID)")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Requires admin"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_news_article(
    State(state): State<AppState>,
    Path(id): Path<NewsId>,
    _perm: RequiresPermission<resource::News, operation::DeleteAll>,
) -> Result<StatusCode> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let deleted = News::new(&mut conn).delete(id).await?;
    if !deleted {
        return Err(article_not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{auth_header, create_test_admin, create_test_app, create_test_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_news_requires_admin(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let student = create_test_user(&pool).await;
        let (name, value) = auth_header(&student);

        let payload = json!({
            "title": "Exam timetable released",
            "description": "Second semester exams",
            "content": "The exam timetable is out.",
            "category": "academics"
        });

        let response = app.post("/api/v1/news").add_header(name, value).json(&payload).await;
        response.assert_status_forbidden();

        let admin = create_test_admin(&pool).await;
        let (name, value) = auth_header(&admin);
        let response = app.post("/api/v1/news").add_header(name, value).json(&payload).await;
        response.assert_status(StatusCode::CREATED);
        let article: NewsResponse = response.json();
        assert_eq!(article.author, admin.full_name);
        assert!(article.is_published);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_news_listing_and_views(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_admin(&pool).await;
        let (name, value) = auth_header(&admin);

        let response = app
            .post("/api/v1/news")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "title": "Inter-faculty football finals",
                "description": "Sports news",
                "content": "Finals hold on Friday.",
                "category": "sports"
            }))
            .await;
        let article: NewsResponse = response.json();

        // Public listing, no auth
        let response = app.get("/api/v1/news?category=sports").await;
        response.assert_status_ok();
        let page: PaginatedResponse<NewsResponse> = response.json();
        assert_eq!(page.total_count, 1);

        // Reading bumps the view counter
        let response = app.get(&format!("/api/v1/news/{}", article.id)).await;
        response.assert_status_ok();
        let read: NewsResponse = response.json();
        assert_eq!(read.views, 1);

        // Category counts include it
        let response = app.get("/api/v1/news/categories").await;
        let categories: Vec<CategoryCount> = response.json();
        let sports = categories.iter().find(|c| c.category == NewsCategory::Sports).unwrap();
        assert_eq!(sports.count, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_and_delete_news(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let admin = create_test_admin(&pool).await;
        let (name, value) = auth_header(&admin);

        let response = app
            .post("/api/v1/news")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "title": "Old title",
                "description": "d",
                "content": "c",
                "category": "general"
            }))
            .await;
        let article: NewsResponse = response.json();

        let response = app
            .patch(&format!("/api/v1/news/{}", article.id))
            .add_header(name.clone(), value.clone())
            .json(&json!({ "title": "New title" }))
            .await;
        response.assert_status_ok();
        let updated: NewsResponse = response.json();
        assert_eq!(updated.title, "New title");

        app.delete(&format!("/api/v1/news/{}", article.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let response = app.get(&format!("/api/v1/news/{}", article.id)).await;
        response.assert_status_not_found();
    }
}
