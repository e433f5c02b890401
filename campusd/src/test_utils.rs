//! Test utilities for integration testing (available with `test-utils` feature).

use crate::{
    api::models::users::{CurrentUser, UserResponse},
    auth::session,
    config::Config,
    db::{
        handlers::{PastQuestions, Users, Wallets},
        models::{
            past_questions::{FileType, PastQuestionCreateDBRequest, PastQuestionDBResponse, Semester},
            users::UserCreateDBRequest,
            wallets::TransactionType,
        },
    },
    types::UserId,
};
use axum_test::TestServer;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::str::FromStr;
use uuid::Uuid;

pub fn create_test_config() -> Config {
    Config {
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        ..Default::default()
    }
}

pub async fn create_test_app(pool: PgPool) -> TestServer {
    let config = create_test_config();

    let app = crate::Application::new_with_pool(config, Some(pool))
        .await
        .expect("Failed to create application");

    app.into_test_server()
}

async fn create_user(pool: &PgPool, is_admin: bool) -> UserResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users = Users::new(&mut conn);

    let tag = Uuid::new_v4().simple().to_string();
    let user = users
        .create(&UserCreateDBRequest {
            full_name: format!("Test User {tag}"),
            email: format!("user_{tag}@example.com"),
            student_id: format!("TST/{tag}"),
            password_hash: None,
            university: None,
            department: None,
            level: None,
            is_admin,
        })
        .await
        .expect("Failed to create test user");

    UserResponse::from(user)
}

pub async fn create_test_user(pool: &PgPool) -> UserResponse {
    create_user(pool, false).await
}

pub async fn create_test_admin(pool: &PgPool) -> UserResponse {
    create_user(pool, true).await
}

/// Bearer header for a user, signed with the test secret.
pub fn auth_header(user: &UserResponse) -> (String, String) {
    let config = create_test_config();
    let current = CurrentUser {
        id: user.id,
        email: user.email.clone(),
        full_name: user.full_name.clone(),
        is_admin: user.is_admin,
    };
    let token = session::create_session_token(&current, &config).expect("Failed to create session token");
    ("authorization".to_string(), format!("Bearer {token}"))
}

/// Credit a user's wallet directly through the ledger.
pub async fn fund_user_wallet(pool: &PgPool, user_id: UserId, amount: &str) {
    let amount = Decimal::from_str(amount).expect("Invalid decimal amount");
    let mut tx = pool.begin().await.expect("Failed to begin transaction");

    let wallet = Wallets::new(&mut tx).get_or_create(user_id).await.expect("Failed to create wallet");
    Wallets::new(&mut tx)
        .credit(wallet.id, amount, TransactionType::Credit, "wallet_funding", None)
        .await
        .expect("Failed to credit wallet");

    tx.commit().await.expect("Failed to commit transaction");
}

/// Current balance, zero if the wallet was never created.
pub async fn wallet_balance(pool: &PgPool, user_id: UserId) -> Decimal {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    Wallets::new(&mut conn)
        .get_by_user(user_id)
        .await
        .expect("Failed to fetch wallet")
        .map(|wallet| wallet.balance)
        .unwrap_or(Decimal::ZERO)
}

pub async fn create_test_question(pool: &PgPool, uploaded_by: UserId, price: &str) -> PastQuestionDBResponse {
    let price = Decimal::from_str(price).expect("Invalid decimal price");
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");

    PastQuestions::new(&mut conn)
        .create(&PastQuestionCreateDBRequest {
            title: format!("Test Question {}", Uuid::new_v4().simple()),
            course_name: "Test Course".to_string(),
            course_code: "TST101".to_string(),
            semester: Semester::First,
            level: "300".to_string(),
            year: Some("2024".to_string()),
            tags: Vec::new(),
            file_url: "/files/test.pdf".to_string(),
            file_type: FileType::Pdf,
            file_size: 1024,
            is_paid: price > Decimal::ZERO,
            price,
            uploaded_by,
        })
        .await
        .expect("Failed to create test question")
}
