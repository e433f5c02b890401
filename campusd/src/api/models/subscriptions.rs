//! API request/response models for subscriptions.

use crate::db::models::subscriptions::{PlanFeatures, PlanTier, SubscriptionDBResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Subscription state as reported to the client. `is_active` reflects the
/// validity rule, not the raw column.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub plan: PlanTier,
    pub is_active: bool,
    pub starts_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub auto_renew: bool,
    pub features: PlanFeatures,
}

impl From<SubscriptionDBResponse> for SubscriptionResponse {
    fn from(db: SubscriptionDBResponse) -> Self {
        let is_active = db.is_valid();
        let features = db.features();
        Self {
            plan: db.plan,
            is_active,
            starts_at: db.starts_at,
            expires_at: db.expires_at,
            auto_renew: db.auto_renew,
            features,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubscribeRequest {
    /// Target plan; subscribing to `free` is invalid
    pub plan: PlanTier,
    /// Plan duration in days (default: 30)
    pub duration: Option<i64>,
    /// Opaque payment reference from the payment channel
    pub payment_reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CancelResponse {
    pub plan: PlanTier,
    pub expires_at: Option<DateTime<Utc>>,
    pub auto_renew: bool,
}

/// One entry of the public plan catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PlanInfo {
    pub name: PlanTier,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub duration: String,
    pub features: Vec<String>,
}

/// The static plan catalog shown on the paywall.
pub fn plan_catalog() -> Vec<PlanInfo> {
    vec![
        PlanInfo {
            name: PlanTier::Free,
            price: Decimal::ZERO,
            duration: "Forever".to_string(),
            features: vec![
                "Access to free past questions".to_string(),
                "Basic timetable features".to_string(),
                "Task management".to_string(),
                "Limited downloads per day".to_string(),
            ],
        },
        PlanInfo {
            name: PlanTier::Basic,
            price: Decimal::from(500),
            duration: "30 days".to_string(),
            features: vec![
                "Everything in Free".to_string(),
                "No ads".to_string(),
                "10 downloads per day".to_string(),
                "Email notifications".to_string(),
            ],
        },
        PlanInfo {
            name: PlanTier::Premium,
            price: Decimal::from(1500),
            duration: "30 days".to_string(),
            features: vec![
                "Everything in Basic".to_string(),
                "Unlimited downloads".to_string(),
                "Priority support".to_string(),
                "Early access to new features".to_string(),
            ],
        },
        PlanInfo {
            name: PlanTier::Enterprise,
            price: Decimal::from(5000),
            duration: "30 days".to_string(),
            features: vec![
                "Everything in Premium".to_string(),
                "Exclusive content".to_string(),
                "Group features".to_string(),
                "Dedicated support".to_string(),
            ],
        },
    ]
}
