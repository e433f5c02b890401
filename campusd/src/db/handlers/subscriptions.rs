//! Database repository for subscriptions.

use crate::{
    db::{
        errors::Result,
        models::subscriptions::{PlanTier, SubscriptionDBResponse, SubscriptionHistoryDBResponse},
    },
    types::UserId,
};
use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use tracing::instrument;
use uuid::Uuid;

pub struct Subscriptions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Subscriptions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_user(&mut self, user_id: UserId) -> Result<Option<SubscriptionDBResponse>> {
        let subscription = sqlx::query_as::<_, SubscriptionDBResponse>("SELECT * FROM subscriptions WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(subscription)
    }

    /// Subscriptions are created lazily on the free plan.
    #[instrument(skip(self), err)]
    pub async fn get_or_create(&mut self, user_id: UserId) -> Result<SubscriptionDBResponse> {
        if let Some(subscription) = self.get_by_user(user_id).await? {
            return Ok(subscription);
        }

        sqlx::query("INSERT INTO subscriptions (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        let subscription = sqlx::query_as::<_, SubscriptionDBResponse>("SELECT * FROM subscriptions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(subscription)
    }

    /// Switch to a paid plan. The current period is pushed into history
    /// before it is overwritten; both writes belong to the caller's
    /// transaction.
    #[instrument(skip(self, payment_reference), err)]
    pub async fn subscribe(
        &mut self,
        user_id: UserId,
        plan: PlanTier,
        expires_at: DateTime<Utc>,
        payment_reference: Option<String>,
    ) -> Result<SubscriptionDBResponse> {
        let current = self.get_or_create(user_id).await?;

        sqlx::query(
            r#"
            INSERT INTO subscription_history (subscription_id, plan, starts_at, expires_at, payment_reference)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(current.id)
        .bind(current.plan)
        .bind(current.starts_at)
        .bind(current.expires_at)
        .bind(&current.payment_reference)
        .execute(&mut *self.db)
        .await?;

        let features = plan.features();
        let subscription = sqlx::query_as::<_, SubscriptionDBResponse>(
            r#"
            UPDATE subscriptions SET
                plan = $2,
                is_active = TRUE,
                starts_at = NOW(),
                expires_at = $3,
                payment_reference = $4,
                unlimited_downloads = $5,
                priority_support = $6,
                no_ads = $7,
                exclusive_content = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(current.id)
        .bind(plan)
        .bind(expires_at)
        .bind(&payment_reference)
        .bind(features.unlimited_downloads)
        .bind(features.priority_support)
        .bind(features.no_ads)
        .bind(features.exclusive_content)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(subscription)
    }

    /// Cancelling only disables auto-renew; the plan stays valid until its
    /// natural expiry.
    #[instrument(skip(self), err)]
    pub async fn cancel(&mut self, subscription_id: Uuid) -> Result<SubscriptionDBResponse> {
        let subscription = sqlx::query_as::<_, SubscriptionDBResponse>(
            "UPDATE subscriptions SET auto_renew = FALSE, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(subscription_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(subscription)
    }

    #[instrument(skip(self), err)]
    pub async fn history(&mut self, subscription_id: Uuid) -> Result<Vec<SubscriptionHistoryDBResponse>> {
        let history = sqlx::query_as::<_, SubscriptionHistoryDBResponse>(
            "SELECT * FROM subscription_history WHERE subscription_id = $1 ORDER BY recorded_at DESC, id DESC",
        )
        .bind(subscription_id)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(history)
    }
}
