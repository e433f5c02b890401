//! Past question catalog and purchase settlement.

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        past_questions::{
            DownloadResponse, ListPastQuestionsQuery, PastQuestionCreate, PastQuestionResponse, RateRequest, RatingResponse,
        },
        users::CurrentUser,
    },
    db::{
        handlers::{Downloads, PastQuestions, StudyStats, Wallets},
        models::{
            downloads::{DownloadCreateDBRequest, DownloadDBResponse},
            past_questions::{FileType, PastQuestionCreateDBRequest, PastQuestionDBResponse, PastQuestionFilter},
            wallets::TransactionType,
        },
    },
    errors::{Error, Result},
    types::{QuestionId, UserId, system_user_id},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use rust_decimal::Decimal;
use sqlx::PgConnection;

fn question_not_found(id: QuestionId) -> Error {
    Error::NotFound {
        resource: "Past question".to_string(),
        id: id.to_string(),
    }
}

/// Upload a past question (file already stored; this records the metadata)
#[utoipa::path(
    post,
    path = "/past-questions",
    tag = "past-questions",
    summary = "Upload a past question",
    responses(
        (status = 201, description = "Past question created", body = PastQuestionResponse),
        (status = 400, description = "Invalid data"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_past_question(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<PastQuestionCreate>,
) -> Result<(StatusCode, Json<PastQuestionResponse>)> {
    if data.file_url.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Please provide a file".to_string(),
        });
    }

    let price = if data.is_paid {
        let price = data.price.unwrap_or(Decimal::ZERO);
        if price <= Decimal::ZERO {
            return Err(Error::BadRequest {
                message: "Paid questions need a positive price".to_string(),
            });
        }
        price
    } else {
        Decimal::ZERO
    };

    let title = match data.title {
        Some(title) if !title.trim().is_empty() => title,
        _ => format!(
            "{} - {:?} Semester {}",
            data.course_code.to_uppercase(),
            data.semester,
            data.year.as_deref().unwrap_or("")
        )
        .trim()
        .to_string(),
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let question = PastQuestions::new(&mut conn)
        .create(&PastQuestionCreateDBRequest {
            title,
            course_name: data.course_name,
            course_code: data.course_code,
            semester: data.semester,
            level: data.level,
            year: data.year,
            tags: data.tags,
            file_url: data.file_url,
            file_type: data.file_type.unwrap_or(FileType::Pdf),
            file_size: data.file_size.unwrap_or(0),
            is_paid: data.is_paid,
            price,
            uploaded_by: current_user.id,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PastQuestionResponse::from(question))))
}

/// List the catalog with filters and pagination
#[utoipa::path(
    get,
    path = "/past-questions",
    tag = "past-questions",
    summary = "Browse past questions",
    params(ListPastQuestionsQuery),
    responses(
        (status = 200, description = "Catalog page", body = PaginatedResponse<PastQuestionResponse>),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn list_past_questions(
    State(state): State<AppState>,
    Query(query): Query<ListPastQuestionsQuery>,
) -> Result<Json<PaginatedResponse<PastQuestionResponse>>> {
    let (skip, limit) = query.pagination.params();
    let filter = PastQuestionFilter {
        course_code: query.course_code,
        course_name: query.course_name,
        semester: query.semester,
        level: query.level,
        is_paid: query.is_paid,
        search: query.search,
        sort_by: query.sort_by.unwrap_or_default(),
        descending: query.sort_order.as_deref() != Some("asc"),
        skip,
        limit,
    };

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut questions = PastQuestions::new(&mut conn);

    let total = questions.count(&filter).await?;
    let page = questions.list(&filter).await?;

    Ok(Json(PaginatedResponse::new(
        page.into_iter().map(PastQuestionResponse::from).collect(),
        total,
        skip,
        limit,
    )))
}

/// Get the caller's uploads
#[utoipa::path(
    get,
    path = "/past-questions/my-uploads",
    tag = "past-questions",
    summary = "List own uploads",
    responses(
        (status = 200, description = "Uploads", body = [PastQuestionResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_uploads(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<PastQuestionResponse>>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let questions = PastQuestions::new(&mut conn).list_by_uploader(current_user.id).await?;
    Ok(Json(questions.into_iter().map(PastQuestionResponse::from).collect()))
}

/// Get a single past question
#[utoipa::path(
    get,
    path = "/past-questions/{id}",
    tag = "past-questions",
    summary = "Get a past question",
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses(
        (status = 200, description = "Past question", body = PastQuestionResponse),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    )
)]
pub async fn get_past_question(State(state): State<AppState>, Path(id): Path<QuestionId>) -> Result<Json<PastQuestionResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let question = PastQuestions::new(&mut conn)
        .get_by_id(id)
        .await?
        .ok_or_else(|| question_not_found(id))?;
    Ok(Json(PastQuestionResponse::from(question)))
}

/// Settlement result, used by the download handler.
pub(crate) struct SettlementOutcome {
    pub download: DownloadDBResponse,
    pub already_purchased: bool,
}

/// Settle a download for (buyer, question) on the given connection, which
/// must be inside a transaction: either every write below commits or none do.
///
/// Paid flow per purchase of price P: buyer is debited P, the seller earns
/// `seller_share * P`, and the remainder lands in the platform wallet so the
/// ledger conserves money. Free questions only produce a receipt.
pub(crate) async fn settle_download(
    conn: &mut PgConnection,
    buyer_id: UserId,
    question: &PastQuestionDBResponse,
    seller_share: Decimal,
) -> Result<SettlementOutcome> {
    // Idempotent re-entry: the first receipt wins, nothing is charged twice
    if let Some(existing) = Downloads::new(&mut *conn).get_for_user_question(buyer_id, question.id).await? {
        return Ok(SettlementOutcome {
            download: existing,
            already_purchased: true,
        });
    }

    let amount_paid = if question.is_paid && question.price > Decimal::ZERO {
        let price = question.price;

        let Some(buyer_wallet) = Wallets::new(&mut *conn).get_by_user(buyer_id).await? else {
            return Err(Error::InsufficientFunds {
                required: price,
                available: Decimal::ZERO,
            });
        };

        let debited = Wallets::new(&mut *conn)
            .debit(
                buyer_wallet.id,
                price,
                TransactionType::Debit,
                "past_question_purchase",
                Some(format!("Purchased: {}", question.title)),
            )
            .await?;
        if debited.is_none() {
            return Err(Error::InsufficientFunds {
                required: price,
                available: buyer_wallet.balance,
            });
        }

        let seller_amount = (price * seller_share).round_dp(2);
        let platform_amount = price - seller_amount;

        let seller_wallet = Wallets::new(&mut *conn).get_or_create(question.uploaded_by).await?;
        Wallets::new(&mut *conn)
            .credit(
                seller_wallet.id,
                seller_amount,
                TransactionType::Earning,
                "past_question_sale",
                Some(format!("Sale: {}", question.title)),
            )
            .await?;

        if platform_amount > Decimal::ZERO {
            let platform_wallet = Wallets::new(&mut *conn).get_or_create(system_user_id()).await?;
            Wallets::new(&mut *conn)
                .credit(
                    platform_wallet.id,
                    platform_amount,
                    TransactionType::Credit,
                    "platform_fee",
                    Some(format!("Platform share: {}", question.title)),
                )
                .await?;
        }

        price
    } else {
        Decimal::ZERO
    };

    let download = Downloads::new(&mut *conn)
        .create(&DownloadCreateDBRequest {
            user_id: buyer_id,
            past_question_id: question.id,
            is_purchased: amount_paid > Decimal::ZERO,
            amount_paid,
        })
        .await?;

    PastQuestions::new(&mut *conn).increment_downloads(question.id).await?;
    StudyStats::new(&mut *conn).record_download(buyer_id).await?;

    Ok(SettlementOutcome {
        download,
        already_purchased: false,
    })
}

/// Download or purchase a past question
#[utoipa::path(
    post,
    path = "/past-questions/{id}/download",
    tag = "past-questions",
    summary = "Download or purchase a past question",
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses(
        (status = 200, description = "Download settled", body = DownloadResponse),
        (status = 400, description = "Insufficient wallet balance"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn download_past_question(
    State(state): State<AppState>,
    Path(id): Path<QuestionId>,
    current_user: CurrentUser,
) -> Result<Json<DownloadResponse>> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let question = PastQuestions::new(&mut tx)
        .get_by_id(id)
        .await?
        .ok_or_else(|| question_not_found(id))?;

    let outcome = settle_download(&mut tx, current_user.id, &question, state.config.wallet.seller_share).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(DownloadResponse {
        file_url: question.file_url,
        already_purchased: outcome.already_purchased,
        download: outcome.download.into(),
    }))
}

/// Rate a past question. Requires a prior download.
#[utoipa::path(
    post,
    path = "/past-questions/{id}/rate",
    tag = "past-questions",
    summary = "Rate a past question",
    params(("id" = String, Path, description = "Question ID (UUID)")),
    responses(
        (status = 200, description = "Rating folded into the running mean", body = RatingResponse),
        (status = 400, description = "Rating outside 1-5 or question never downloaded"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn rate_past_question(
    State(state): State<AppState>,
    Path(id): Path<QuestionId>,
    current_user: CurrentUser,
    Json(data): Json<RateRequest>,
) -> Result<Json<RatingResponse>> {
    if !(1..=5).contains(&data.rating) {
        return Err(Error::BadRequest {
            message: "Please provide a rating between 1 and 5".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let question = PastQuestions::new(&mut tx)
        .get_by_id(id)
        .await?
        .ok_or_else(|| question_not_found(id))?;

    if Downloads::new(&mut tx)
        .get_for_user_question(current_user.id, question.id)
        .await?
        .is_none()
    {
        return Err(Error::PreconditionFailed {
            message: "You must download the question before rating".to_string(),
        });
    }

    let question = PastQuestions::new(&mut tx).apply_rating(question.id, data.rating).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(RatingResponse {
        rating: question.rating,
        rating_count: question.rating_count,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::wallets::WalletResponse;
    use crate::test_utils::{auth_header, create_test_app, create_test_question, create_test_user, fund_user_wallet, wallet_balance};
    use serde_json::json;
    use sqlx::PgPool;
    use std::str::FromStr;

    #[sqlx::test]
    #[test_log::test]
    async fn test_free_download_creates_receipt(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let uploader = create_test_user(&pool).await;
        let buyer = create_test_user(&pool).await;
        let question = create_test_question(&pool, uploader.id, "0").await;
        let (name, value) = auth_header(&buyer);

        let response = app
            .post(&format!("/api/v1/past-questions/{}/download", question.id))
            .add_header(name.clone(), value.clone())
            .await;

        response.assert_status_ok();
        let body: DownloadResponse = response.json();
        assert!(!body.already_purchased);
        assert!(!body.download.is_purchased);
        assert_eq!(body.download.amount_paid, Decimal::ZERO);

        // Download counter moved
        let response = app.get(&format!("/api/v1/past-questions/{}", question.id)).await;
        let fetched: PastQuestionResponse = response.json();
        assert_eq!(fetched.downloads, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_purchase_splits_revenue(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let uploader = create_test_user(&pool).await;
        let buyer = create_test_user(&pool).await;
        let question = create_test_question(&pool, uploader.id, "300").await;
        fund_user_wallet(&pool, buyer.id, "1000").await;
        let (name, value) = auth_header(&buyer);

        let response = app
            .post(&format!("/api/v1/past-questions/{}/download", question.id))
            .add_header(name.clone(), value.clone())
            .await;

        response.assert_status_ok();
        let body: DownloadResponse = response.json();
        assert!(body.download.is_purchased);
        assert_eq!(body.download.amount_paid, Decimal::from(300));

        // Buyer paid the full price
        let response = app.get("/api/v1/wallet").add_header(name, value).await;
        let wallet: WalletResponse = response.json();
        assert_eq!(wallet.balance, Decimal::from(700));

        // Seller received 70%, the platform wallet the remaining 30%
        assert_eq!(wallet_balance(&pool, uploader.id).await, Decimal::from_str("210.00").unwrap());
        assert_eq!(
            wallet_balance(&pool, crate::types::system_user_id()).await,
            Decimal::from_str("90.00").unwrap()
        );

        // Seller's earnings view carries the sale
        let (name, value) = auth_header(&uploader);
        let response = app.get("/api/v1/wallet").add_header(name, value).await;
        let seller_wallet: WalletResponse = response.json();
        assert_eq!(seller_wallet.total_earnings, Decimal::from_str("210.00").unwrap());
        assert_eq!(seller_wallet.earnings.len(), 1);
        assert_eq!(seller_wallet.earnings[0].source, "past_question_sale");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_purchase_is_idempotent(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let uploader = create_test_user(&pool).await;
        let buyer = create_test_user(&pool).await;
        let question = create_test_question(&pool, uploader.id, "300").await;
        fund_user_wallet(&pool, buyer.id, "1000").await;
        let (name, value) = auth_header(&buyer);

        let url = format!("/api/v1/past-questions/{}/download", question.id);
        let first = app.post(&url).add_header(name.clone(), value.clone()).await;
        first.assert_status_ok();
        let first: DownloadResponse = first.json();
        assert!(!first.already_purchased);

        let second = app.post(&url).add_header(name.clone(), value.clone()).await;
        second.assert_status_ok();
        let second: DownloadResponse = second.json();
        assert!(second.already_purchased);
        assert_eq!(second.download.id, first.download.id);

        // Charged exactly once
        let response = app.get("/api/v1/wallet").add_header(name, value).await;
        let wallet: WalletResponse = response.json();
        assert_eq!(wallet.balance, Decimal::from(700));

        // Counter moved exactly once
        let response = app.get(&format!("/api/v1/past-questions/{}", question.id)).await;
        let fetched: PastQuestionResponse = response.json();
        assert_eq!(fetched.downloads, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_purchase_insufficient_funds(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let uploader = create_test_user(&pool).await;
        let buyer = create_test_user(&pool).await;
        let question = create_test_question(&pool, uploader.id, "300").await;
        fund_user_wallet(&pool, buyer.id, "100").await;
        let (name, value) = auth_header(&buyer);

        let response = app
            .post(&format!("/api/v1/past-questions/{}/download", question.id))
            .add_header(name.clone(), value.clone())
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        let required = Decimal::from_str(body["required"].as_str().unwrap()).unwrap();
        let available = Decimal::from_str(body["available"].as_str().unwrap()).unwrap();
        assert_eq!(required, Decimal::from(300));
        assert_eq!(available, Decimal::from(100));

        // Nothing changed anywhere
        let response = app.get("/api/v1/wallet").add_header(name, value).await;
        let wallet: WalletResponse = response.json();
        assert_eq!(wallet.balance, Decimal::from(100));
        assert_eq!(wallet_balance(&pool, uploader.id).await, Decimal::ZERO);

        let response = app.get(&format!("/api/v1/past-questions/{}", question.id)).await;
        let fetched: PastQuestionResponse = response.json();
        assert_eq!(fetched.downloads, 0);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_purchase_without_wallet_is_insufficient(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let uploader = create_test_user(&pool).await;
        let buyer = create_test_user(&pool).await;
        let question = create_test_question(&pool, uploader.id, "300").await;
        let (name, value) = auth_header(&buyer);

        let response = app
            .post(&format!("/api/v1/past-questions/{}/download", question.id))
            .add_header(name, value)
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        let available = Decimal::from_str(body["available"].as_str().unwrap()).unwrap();
        assert_eq!(available, Decimal::ZERO);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_rating_requires_download(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let uploader = create_test_user(&pool).await;
        let rater = create_test_user(&pool).await;
        let question = create_test_question(&pool, uploader.id, "0").await;
        let (name, value) = auth_header(&rater);

        let url = format!("/api/v1/past-questions/{}/rate", question.id);

        // No download yet
        let response = app
            .post(&url)
            .add_header(name.clone(), value.clone())
            .json(&json!({ "rating": 4 }))
            .await;
        response.assert_status_bad_request();

        // Download, then rate
        app.post(&format!("/api/v1/past-questions/{}/download", question.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status_ok();

        let response = app.post(&url).add_header(name, value).json(&json!({ "rating": 4 })).await;
        response.assert_status_ok();
        let rating: RatingResponse = response.json();
        assert_eq!(rating.rating, Decimal::from(4));
        assert_eq!(rating.rating_count, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_rating_running_mean(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let uploader = create_test_user(&pool).await;
        let question = create_test_question(&pool, uploader.id, "0").await;

        // Three raters: 5, 4, 4 -> mean 4.333... -> 4.3
        for rating in [5, 4, 4] {
            let rater = create_test_user(&pool).await;
            let (name, value) = auth_header(&rater);
            app.post(&format!("/api/v1/past-questions/{}/download", question.id))
                .add_header(name.clone(), value.clone())
                .await
                .assert_status_ok();
            app.post(&format!("/api/v1/past-questions/{}/rate", question.id))
                .add_header(name, value)
                .json(&json!({ "rating": rating }))
                .await
                .assert_status_ok();
        }

        let response = app.get(&format!("/api/v1/past-questions/{}", question.id)).await;
        let fetched: PastQuestionResponse = response.json();
        assert_eq!(fetched.rating, Decimal::from_str("4.3").unwrap());
        assert_eq!(fetched.rating_count, 3);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_rating_out_of_range(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let uploader = create_test_user(&pool).await;
        let rater = create_test_user(&pool).await;
        let question = create_test_question(&pool, uploader.id, "0").await;
        let (name, value) = auth_header(&rater);

        for rating in [0, 6, -1] {
            let response = app
                .post(&format!("/api/v1/past-questions/{}/rate", question.id))
                .add_header(name.clone(), value.clone())
                .json(&json!({ "rating": rating }))
                .await;
            response.assert_status_bad_request();
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_catalog_filters(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let uploader = create_test_user(&pool).await;
        let (name, value) = auth_header(&uploader);

        for (code, paid) in [("CSC301", false), ("CSC301", true), ("MTH202", false)] {
            app.post("/api/v1/past-questions")
                .add_header(name.clone(), value.clone())
                .json(&json!({
                    "course_name": "Some Course",
                    "course_code": code,
                    "semester": "First",
                    "level": "300",
                    "file_url": "/files/q.pdf",
                    "is_paid": paid,
                    "price": if paid { Some("200") } else { None }
                }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = app.get("/api/v1/past-questions?course_code=csc301").await;
        response.assert_status_ok();
        let page: PaginatedResponse<PastQuestionResponse> = response.json();
        assert_eq!(page.total_count, 2);

        let response = app.get("/api/v1/past-questions?course_code=CSC301&is_paid=true").await;
        let page: PaginatedResponse<PastQuestionResponse> = response.json();
        assert_eq!(page.total_count, 1);

        let response = app.get("/api/v1/past-questions?search=mth").await;
        let page: PaginatedResponse<PastQuestionResponse> = response.json();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.data[0].course_code, "MTH202");
    }
}
