//! Subscription handlers.

use crate::{
    AppState,
    api::models::{
        subscriptions::{CancelResponse, PlanInfo, SubscribeRequest, SubscriptionResponse, plan_catalog},
        users::CurrentUser,
    },
    db::{handlers::Subscriptions, models::subscriptions::PlanTier},
    errors::{Error, Result},
};
use axum::{extract::State, response::Json};
use chrono::{Duration, Utc};

/// Get the caller's subscription, creating the free one on first access
#[utoipa::path(
    get,
    path = "/subscription",
    tag = "subscription",
    summary = "Get subscription status",
    responses(
        (status = 200, description = "Subscription", body = SubscriptionResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_subscription(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<SubscriptionResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let subscription = Subscriptions::new(&mut conn).get_or_create(current_user.id).await?;
    Ok(Json(SubscriptionResponse::from(subscription)))
}

/// The public plan catalog
#[utoipa::path(
    get,
    path = "/subscription/plans",
    tag = "subscription",
    summary = "List subscription plans",
    responses(
        (status = 200, description = "Plan catalog", body = [PlanInfo]),
    )
)]
pub async fn get_plans() -> Json<Vec<PlanInfo>> {
    Json(plan_catalog())
}

/// Subscribe to a paid plan
#[utoipa::path(
    post,
    path = "/subscription/subscribe",
    tag = "subscription",
    summary = "Subscribe to a plan",
    responses(
        (status = 200, description = "Subscribed", body = SubscriptionResponse),
        (status = 400, description = "Invalid plan"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn subscribe(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<SubscribeRequest>,
) -> Result<Json<SubscriptionResponse>> {
    if data.plan == PlanTier::Free {
        return Err(Error::BadRequest {
            message: "Invalid subscription plan".to_string(),
        });
    }

    let duration_days = data.duration.unwrap_or(state.config.subscriptions.default_duration_days);
    if duration_days <= 0 {
        return Err(Error::BadRequest {
            message: "Duration must be a positive number of days".to_string(),
        });
    }

    let expires_at = Utc::now() + Duration::days(duration_days);

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let subscription = Subscriptions::new(&mut tx)
        .subscribe(current_user.id, data.plan, expires_at, data.payment_reference)
        .await?;
    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(SubscriptionResponse::from(subscription)))
}

/// Cancel: disables auto-renew, the plan stays valid until expiry
#[utoipa::path(
    post,
    path = "/subscription/cancel",
    tag = "subscription",
    summary = "Cancel subscription",
    responses(
        (status = 200, description = "Auto-renew disabled", body = CancelResponse),
        (status = 400, description = "Already on the free plan"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "No subscription"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn cancel_subscription(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<CancelResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut subscriptions = Subscriptions::new(&mut conn);

    let subscription = subscriptions.get_by_user(current_user.id).await?.ok_or_else(|| Error::NotFound {
        resource: "Subscription".to_string(),
        id: current_user.id.to_string(),
    })?;

    if subscription.plan == PlanTier::Free {
        return Err(Error::PreconditionFailed {
            message: "You are on the free plan".to_string(),
        });
    }

    let subscription = subscriptions.cancel(subscription.id).await?;

    Ok(Json(CancelResponse {
        plan: subscription.plan,
        expires_at: subscription.expires_at,
        auto_renew: subscription.auto_renew,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::subscriptions::PlanFeatures;
    use crate::test_utils::{auth_header, create_test_app, create_test_user};
    use serde_json::json;
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_subscription_defaults_to_free(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        let response = app.get("/api/v1/subscription").add_header(name, value).await;
        response.assert_status_ok();
        let sub: SubscriptionResponse = response.json();
        assert_eq!(sub.plan, PlanTier::Free);
        // Free is always valid
        assert!(sub.is_active);
        assert_eq!(sub.features, PlanTier::Free.features());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_subscribe_sets_features_and_expiry(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        let response = app
            .post("/api/v1/subscription/subscribe")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "plan": "premium", "payment_reference": "PAY-1" }))
            .await;

        response.assert_status_ok();
        let sub: SubscriptionResponse = response.json();
        assert_eq!(sub.plan, PlanTier::Premium);
        assert!(sub.is_active);
        assert!(sub.expires_at.is_some());
        assert_eq!(
            sub.features,
            PlanFeatures {
                unlimited_downloads: true,
                priority_support: true,
                no_ads: true,
                exclusive_content: false,
            }
        );

        // Upgrade pushes the old period into history and replaces the plan
        let response = app
            .post("/api/v1/subscription/subscribe")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "plan": "enterprise" }))
            .await;
        response.assert_status_ok();
        let sub: SubscriptionResponse = response.json();
        assert_eq!(sub.plan, PlanTier::Enterprise);
        assert!(sub.features.exclusive_content);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_subscribe_free_is_invalid(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        let response = app
            .post("/api/v1/subscription/subscribe")
            .add_header(name, value)
            .json(&json!({ "plan": "free" }))
            .await;
        response.assert_status_bad_request();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cancel_keeps_plan_until_expiry(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        app.post("/api/v1/subscription/subscribe")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "plan": "basic" }))
            .await
            .assert_status_ok();

        let response = app.post("/api/v1/subscription/cancel").add_header(name.clone(), value.clone()).await;
        response.assert_status_ok();
        let cancelled: CancelResponse = response.json();
        assert_eq!(cancelled.plan, PlanTier::Basic);
        assert!(!cancelled.auto_renew);
        assert!(cancelled.expires_at.is_some());

        // Still valid until natural expiry
        let response = app.get("/api/v1/subscription").add_header(name, value).await;
        let sub: SubscriptionResponse = response.json();
        assert_eq!(sub.plan, PlanTier::Basic);
        assert!(sub.is_active);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_cancel_free_plan_fails(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        // Materialize the free subscription first
        app.get("/api/v1/subscription").add_header(name.clone(), value.clone()).await.assert_status_ok();

        let response = app.post("/api/v1/subscription/cancel").add_header(name, value).await;
        response.assert_status_bad_request();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_plans_catalog_is_public(pool: PgPool) {
        let app = create_test_app(pool).await;
        let response = app.get("/api/v1/subscription/plans").await;
        response.assert_status_ok();
        let plans: Vec<PlanInfo> = response.json();
        assert_eq!(plans.len(), 4);
        assert_eq!(plans[0].name, PlanTier::Free);
    }
}
