//! Database repository for the past question catalog.

use crate::{
    db::{
        errors::Result,
        models::past_questions::{PastQuestionCreateDBRequest, PastQuestionDBResponse, PastQuestionFilter},
    },
    types::{QuestionId, UserId},
};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::instrument;

pub struct PastQuestions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> PastQuestions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), err)]
    pub async fn create(&mut self, request: &PastQuestionCreateDBRequest) -> Result<PastQuestionDBResponse> {
        let question = sqlx::query_as::<_, PastQuestionDBResponse>(
            r#"
            INSERT INTO past_questions
                (title, course_name, course_code, semester, level, year, tags, file_url, file_type, file_size, is_paid, price, uploaded_by)
            VALUES ($1, $2, upper($3), $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(&request.title)
        .bind(&request.course_name)
        .bind(&request.course_code)
        .bind(request.semester)
        .bind(&request.level)
        .bind(&request.year)
        .bind(&request.tags)
        .bind(&request.file_url)
        .bind(request.file_type)
        .bind(request.file_size)
        .bind(request.is_paid)
        .bind(request.price)
        .bind(request.uploaded_by)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(question)
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: QuestionId) -> Result<Option<PastQuestionDBResponse>> {
        let question = sqlx::query_as::<_, PastQuestionDBResponse>("SELECT * FROM past_questions WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(question)
    }

    fn filter_conditions(filter: &PastQuestionFilter) -> (String, usize) {
        // Only active, approved questions are listed publicly
        let mut query = String::from("WHERE is_active = TRUE AND is_approved = TRUE");
        let mut idx = 0;

        if filter.course_code.is_some() {
            idx += 1;
            query.push_str(&format!(" AND course_code = upper(${idx})"));
        }
        if filter.course_name.is_some() {
            idx += 1;
            query.push_str(&format!(" AND course_name ILIKE '%' || ${idx} || '%'"));
        }
        if filter.semester.is_some() {
            idx += 1;
            query.push_str(&format!(" AND semester = ${idx}"));
        }
        if filter.level.is_some() {
            idx += 1;
            query.push_str(&format!(" AND level = ${idx}"));
        }
        if filter.is_paid.is_some() {
            idx += 1;
            query.push_str(&format!(" AND is_paid = ${idx}"));
        }
        if filter.search.is_some() {
            idx += 1;
            query.push_str(&format!(
                " AND (title ILIKE '%' || ${idx} || '%' OR course_name ILIKE '%' || ${idx} || '%' OR course_code ILIKE '%' || ${idx} || '%')"
            ));
        }

        (query, idx)
    }

    fn bind_filter<'q, O>(
        mut sql_query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
        filter: &'q PastQuestionFilter,
    ) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
        if let Some(course_code) = &filter.course_code {
            sql_query = sql_query.bind(course_code);
        }
        if let Some(course_name) = &filter.course_name {
            sql_query = sql_query.bind(course_name);
        }
        if let Some(semester) = filter.semester {
            sql_query = sql_query.bind(semester);
        }
        if let Some(level) = &filter.level {
            sql_query = sql_query.bind(level);
        }
        if let Some(is_paid) = filter.is_paid {
            sql_query = sql_query.bind(is_paid);
        }
        if let Some(search) = &filter.search {
            sql_query = sql_query.bind(search);
        }
        sql_query
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    pub async fn list(&mut self, filter: &PastQuestionFilter) -> Result<Vec<PastQuestionDBResponse>> {
        let (conditions, _) = Self::filter_conditions(filter);
        let direction = if filter.descending { "DESC" } else { "ASC" };
        let query = format!(
            "SELECT * FROM past_questions {conditions} ORDER BY {} {direction} LIMIT {} OFFSET {}",
            filter.sort_by.column(),
            filter.limit,
            filter.skip
        );

        let sql_query = Self::bind_filter(sqlx::query_as::<_, PastQuestionDBResponse>(&query), filter);
        let questions = sql_query.fetch_all(&mut *self.db).await?;
        Ok(questions)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn count(&mut self, filter: &PastQuestionFilter) -> Result<i64> {
        let (conditions, _) = Self::filter_conditions(filter);
        let query = format!("SELECT COUNT(*) FROM past_questions {conditions}");

        let mut sql_query = sqlx::query_scalar::<_, i64>(&query);
        if let Some(course_code) = &filter.course_code {
            sql_query = sql_query.bind(course_code);
        }
        if let Some(course_name) = &filter.course_name {
            sql_query = sql_query.bind(course_name);
        }
        if let Some(semester) = filter.semester {
            sql_query = sql_query.bind(semester);
        }
        if let Some(level) = &filter.level {
            sql_query = sql_query.bind(level);
        }
        if let Some(is_paid) = filter.is_paid {
            sql_query = sql_query.bind(is_paid);
        }
        if let Some(search) = &filter.search {
            sql_query = sql_query.bind(search);
        }

        let count = sql_query.fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    #[instrument(skip(self), err)]
    pub async fn list_by_uploader(&mut self, uploaded_by: UserId) -> Result<Vec<PastQuestionDBResponse>> {
        let questions =
            sqlx::query_as::<_, PastQuestionDBResponse>("SELECT * FROM past_questions WHERE uploaded_by = $1 ORDER BY created_at DESC")
                .bind(uploaded_by)
                .fetch_all(&mut *self.db)
                .await?;
        Ok(questions)
    }

    /// Atomic download-counter bump.
    #[instrument(skip(self), err)]
    pub async fn increment_downloads(&mut self, id: QuestionId) -> Result<()> {
        sqlx::query("UPDATE past_questions SET downloads = downloads + 1, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(())
    }

    /// Fold one rating into the running mean, rounded to one decimal.
    #[instrument(skip(self), err)]
    pub async fn apply_rating(&mut self, id: QuestionId, rating: i32) -> Result<PastQuestionDBResponse> {
        let question = sqlx::query_as::<_, PastQuestionDBResponse>("SELECT * FROM past_questions WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_one(&mut *self.db)
            .await?;

        let new_count = question.rating_count + 1;
        let new_rating = ((question.rating * Decimal::from(question.rating_count)) + Decimal::from(rating)) / Decimal::from(new_count);
        let new_rating = new_rating.round_dp(1);

        let question = sqlx::query_as::<_, PastQuestionDBResponse>(
            "UPDATE past_questions SET rating = $2, rating_count = $3, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(new_rating)
        .bind(new_count)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(question)
    }
}
