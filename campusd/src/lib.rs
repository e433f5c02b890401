//! # campusd: Campus Life Backend
//!
//! `campusd` is the REST backend for a campus-life mobile application. It
//! serves authentication, a past-question marketplace with wallet-based
//! settlement, campus news, per-user timetables and tasks, subscriptions,
//! in-app notifications and a dashboard aggregator.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL (via SQLx) for all persistence.
//!
//! The **API layer** ([`api`]) exposes the REST surface under `/api/v1/*`.
//! Handlers validate input, run the operation through repositories and shape
//! the JSON response. The **database layer** ([`db`]) uses the repository
//! pattern; every multi-step mutation - purchase settlement, withdrawals,
//! plan changes - runs inside a single SQLx transaction so money movements
//! and their ledger entries commit together. The **authentication layer**
//! ([`auth`]) issues and verifies JWT bearer tokens and enforces role-based
//! permissions.
//!
//! ## Money movement
//!
//! Every balance-affecting operation goes through the wallet repository,
//! which pairs the balance update with an append-only ledger entry. A
//! purchase debits the buyer, credits the uploader their share and books the
//! remainder on the platform wallet, all in one transaction; receipts are
//! unique per (user, question) which makes settlement idempotent.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use campusd::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = campusd::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     campusd::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::db::{handlers::Users, models::users::UserCreateDBRequest};
use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use config::CorsOrigin;
use sqlx::PgPool;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{DownloadId, NewsId, NotificationId, QuestionId, TaskId, TimetableEntryId, UserId, WalletId, system_user_id};

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the campusd database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: called on every startup, it only creates the account the
/// first time. Returns the admin's user ID.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, password: Option<&str>, db: &PgPool) -> anyhow::Result<UserId> {
    let password_hash = match password {
        Some(password) => Some(auth::password::hash_string(password).map_err(|e| anyhow::anyhow!("hash admin password: {e}"))?),
        None => None,
    };

    let mut tx = db.begin().await?;
    let mut users = Users::new(&mut tx);

    if let Some(existing) = users.get_by_email(email).await? {
        tx.commit().await?;
        return Ok(existing.id);
    }

    let created = users
        .create(&UserCreateDBRequest {
            full_name: "Administrator".to_string(),
            email: email.to_lowercase(),
            student_id: "ADMIN".to_string(),
            password_hash,
            university: None,
            department: None,
            level: None,
            is_admin: true,
        })
        .await?;

    tx.commit().await?;
    info!("Created initial admin user {}", email);
    Ok(created.id)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<axum::http::HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<axum::http::HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.cors.allow_credentials)
        .allow_methods(tower_http::cors::AllowMethods::mirror_request())
        .allow_headers(tower_http::cors::AllowHeaders::mirror_request());

    if let Some(max_age) = config.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        // Authentication
        .route("/auth/register", post(api::handlers::auth::register))
        .route("/auth/login", post(api::handlers::auth::login))
        // Profile
        .route(
            "/users/profile",
            get(api::handlers::users::get_profile).patch(api::handlers::users::update_profile),
        )
        // Wallet
        .route("/wallet", get(api::handlers::wallets::get_wallet))
        .route("/wallet/transactions", get(api::handlers::wallets::list_transactions))
        .route("/wallet/fund", post(api::handlers::wallets::fund_wallet))
        .route("/wallet/withdraw", post(api::handlers::wallets::withdraw_funds))
        // Past questions
        .route(
            "/past-questions",
            get(api::handlers::past_questions::list_past_questions).post(api::handlers::past_questions::create_past_question),
        )
        .route("/past-questions/my-uploads", get(api::handlers::past_questions::my_uploads))
        .route("/past-questions/{id}", get(api::handlers::past_questions::get_past_question))
        .route(
            "/past-questions/{id}/download",
            post(api::handlers::past_questions::download_past_question),
        )
        .route("/past-questions/{id}/rate", post(api::handlers::past_questions::rate_past_question))
        // Subscriptions
        .route("/subscription", get(api::handlers::subscriptions::get_subscription))
        .route("/subscription/plans", get(api::handlers::subscriptions::get_plans))
        .route("/subscription/subscribe", post(api::handlers::subscriptions::subscribe))
        .route("/subscription/cancel", post(api::handlers::subscriptions::cancel_subscription))
        // Tasks
        .route("/tasks", get(api::handlers::tasks::list_tasks).post(api::handlers::tasks::create_task))
        .route(
            "/tasks/{id}",
            get(api::handlers::tasks::get_task)
                .patch(api::handlers::tasks::update_task)
                .delete(api::handlers::tasks::delete_task),
        )
        // Timetable
        .route(
            "/timetable",
            get(api::handlers::timetables::get_timetable).put(api::handlers::timetables::replace_timetable),
        )
        .route("/timetable/today", get(api::handlers::timetables::today_schedule))
        .route("/timetable/items", post(api::handlers::timetables::add_schedule_item))
        .route(
            "/timetable/items/{id}",
            patch(api::handlers::timetables::update_schedule_item).delete(api::handlers::timetables::delete_schedule_item),
        )
        // News
        .route(
            "/news",
            get(api::handlers::news::list_news).post(api::handlers::news::create_news_article),
        )
        .route("/news/categories", get(api::handlers::news::get_categories))
        .route(
            "/news/{id}",
            get(api::handlers::news::get_news_article)
                .patch(api::handlers::news::update_news_article)
                .delete(api::handlers::news::delete_news_article),
        )
        // Notifications
        .route(
            "/notifications",
            get(api::handlers::notifications::list_notifications).delete(api::handlers::notifications::clear_all_notifications),
        )
        .route("/notifications/unread-count", get(api::handlers::notifications::unread_count))
        .route("/notifications/read-all", put(api::handlers::notifications::mark_all_as_read))
        .route("/notifications/{id}/read", put(api::handlers::notifications::mark_as_read))
        .route("/notifications/{id}", delete(api::handlers::notifications::delete_notification))
        // Dashboard
        .route("/dashboard/stats", get(api::handlers::dashboard::get_dashboard_stats))
        .route("/dashboard/study-sessions", post(api::handlers::dashboard::log_study_session))
        .route("/dashboard/analytics", get(api::handlers::dashboard::get_analytics))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", openapi::ApiDoc::openapi()));

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let mut router = router.layer(cors_layer);

    // Add Prometheus metrics if enabled
    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and lifecycle.
///
/// 1. **Create**: [`Application::new`] connects the pool, runs migrations and
///    seeds the admin user
/// 2. **Serve**: [`Application::serve`] binds a TCP port and handles requests
/// 3. **Shutdown**: on the shutdown signal, drains in-flight requests, closes
///    the pool and flushes telemetry
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Like [`Application::new`] but reusing an existing pool (used by tests)
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        let pool = match pool {
            Some(pool) => pool,
            None => PgPool::connect(&config.database_url).await?,
        };

        migrator().run(&pool).await?;

        create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool).await?;

        let state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("campusd listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::test_utils::create_test_app;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_healthz(pool: PgPool) {
        let app = create_test_app(pool).await;
        let response = app.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_admin_user_seeded(pool: PgPool) {
        let _app = create_test_app(pool.clone()).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut users = crate::db::handlers::Users::new(&mut conn);
        let admin = users
            .get_by_email("admin@test.com")
            .await
            .unwrap()
            .expect("admin user should exist");
        assert!(admin.is_admin);
    }
}
