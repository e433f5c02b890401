//! Database repository for news articles.

use crate::{
    db::{
        errors::Result,
        models::news::{NewsCategory, NewsCreateDBRequest, NewsDBResponse, NewsFilter, NewsUpdateDBRequest},
    },
    types::NewsId,
};
use sqlx::PgConnection;
use tracing::instrument;

pub struct News<'c> {
    db: &'c mut PgConnection,
}

impl<'c> News<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), err)]
    pub async fn create(&mut self, request: &NewsCreateDBRequest) -> Result<NewsDBResponse> {
        let article = sqlx::query_as::<_, NewsDBResponse>(
            r#"
            INSERT INTO news (title, description, content, category, image_url, author, author_id, is_published, tags)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.content)
        .bind(request.category)
        .bind(&request.image_url)
        .bind(&request.author)
        .bind(request.author_id)
        .bind(request.is_published)
        .bind(&request.tags)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(article)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: NewsId) -> Result<Option<NewsDBResponse>> {
        let article = sqlx::query_as::<_, NewsDBResponse>("SELECT * FROM news WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(article)
    }

    /// Atomic view-counter bump on read.
    #[instrument(skip(self), err)]
    pub async fn increment_views(&mut self, id: NewsId) -> Result<()> {
        sqlx::query("UPDATE news SET views = views + 1 WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(())
    }

    fn filter_conditions(filter: &NewsFilter) -> String {
        let mut query = String::from("WHERE is_published = TRUE");
        let mut idx = 0;

        if filter.category.is_some() {
            idx += 1;
            query.push_str(&format!(" AND category = ${idx}"));
        }
        if filter.search.is_some() {
            idx += 1;
            query.push_str(&format!(
                " AND (title ILIKE '%' || ${idx} || '%' OR content ILIKE '%' || ${idx} || '%')"
            ));
        }

        query
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &NewsFilter) -> Result<Vec<NewsDBResponse>> {
        let conditions = Self::filter_conditions(filter);
        let query = format!(
            "SELECT * FROM news {conditions} ORDER BY published_at DESC LIMIT {} OFFSET {}",
            filter.limit, filter.skip
        );

        let mut sql_query = sqlx::query_as::<_, NewsDBResponse>(&query);
        if let Some(category) = filter.category {
            sql_query = sql_query.bind(category);
        }
        if let Some(search) = &filter.search {
            sql_query = sql_query.bind(search);
        }

        let articles = sql_query.fetch_all(&mut *self.db).await?;
        Ok(articles)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &NewsFilter) -> Result<i64> {
        let conditions = Self::filter_conditions(filter);
        let query = format!("SELECT COUNT(*) FROM news {conditions}");

        let mut sql_query = sqlx::query_scalar::<_, i64>(&query);
        if let Some(category) = filter.category {
            sql_query = sql_query.bind(category);
        }
        if let Some(search) = &filter.search {
            sql_query = sql_query.bind(search);
        }

        let count = sql_query.fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    /// Most recent published articles, for the dashboard.
    #[instrument(skip(self), err)]
    pub async fn recent(&mut self, limit: i64) -> Result<Vec<NewsDBResponse>> {
        let articles =
            sqlx::query_as::<_, NewsDBResponse>("SELECT * FROM news WHERE is_published = TRUE ORDER BY published_at DESC LIMIT $1")
                .bind(limit)
                .fetch_all(&mut *self.db)
                .await?;
        Ok(articles)
    }

    /// Published article count per category.
    #[instrument(skip(self), err)]
    pub async fn count_by_category(&mut self, category: NewsCategory) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM news WHERE is_published = TRUE AND category = $1")
            .bind(category)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self, request), err)]
    pub async fn update(&mut self, id: NewsId, request: &NewsUpdateDBRequest) -> Result<NewsDBResponse> {
        let article = sqlx::query_as::<_, NewsDBResponse>(
            r#"
            UPDATE news SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                content = COALESCE($4, content),
                category = COALESCE($5, category),
                image_url = COALESCE($6, image_url),
                is_published = COALESCE($7, is_published),
                tags = COALESCE($8, tags),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.description)
        .bind(&request.content)
        .bind(request.category)
        .bind(&request.image_url)
        .bind(request.is_published)
        .bind(&request.tags)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(article)
    }

    #[instrument(skip(self), err)]
    pub async fn delete(&mut self, id: NewsId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM news WHERE id = $1").bind(id).execute(&mut *self.db).await?;
        Ok(result.rows_affected() > 0)
    }
}
