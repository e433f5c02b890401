//! Database models for subscriptions and plan tiers.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Subscription plan tier stored as TEXT in database.
///
/// Feature flags are monotone across tiers: enterprise ⊇ premium ⊇ basic ⊇
/// free.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Free,
    Basic,
    Premium,
    Enterprise,
}

/// Feature flags derived from a plan tier at subscription time. They are
/// frozen on the subscription row and not recomputed when the tier table
/// changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PlanFeatures {
    pub unlimited_downloads: bool,
    pub priority_support: bool,
    pub no_ads: bool,
    pub exclusive_content: bool,
}

impl PlanTier {
    /// Static feature table per tier.
    pub fn features(self) -> PlanFeatures {
        match self {
            PlanTier::Free => PlanFeatures {
                unlimited_downloads: false,
                priority_support: false,
                no_ads: false,
                exclusive_content: false,
            },
            PlanTier::Basic => PlanFeatures {
                unlimited_downloads: false,
                priority_support: false,
                no_ads: true,
                exclusive_content: false,
            },
            PlanTier::Premium => PlanFeatures {
                unlimited_downloads: true,
                priority_support: true,
                no_ads: true,
                exclusive_content: false,
            },
            PlanTier::Enterprise => PlanFeatures {
                unlimited_downloads: true,
                priority_support: true,
                no_ads: true,
                exclusive_content: true,
            },
        }
    }
}

/// Database response for a subscription row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubscriptionDBResponse {
    pub id: Uuid,
    pub user_id: UserId,
    pub plan: PlanTier,
    pub is_active: bool,
    pub starts_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub auto_renew: bool,
    pub payment_reference: Option<String>,
    pub unlimited_downloads: bool,
    pub priority_support: bool,
    pub no_ads: bool,
    pub exclusive_content: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionDBResponse {
    /// Validity rule: the free plan is always valid; paid plans are valid iff
    /// active and not yet expired. A paid plan with no expiry is invalid.
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.plan == PlanTier::Free {
            return true;
        }
        if !self.is_active {
            return false;
        }
        match self.expires_at {
            Some(expires_at) => now < expires_at,
            None => false,
        }
    }

    pub fn features(&self) -> PlanFeatures {
        PlanFeatures {
            unlimited_downloads: self.unlimited_downloads,
            priority_support: self.priority_support,
            no_ads: self.no_ads,
            exclusive_content: self.exclusive_content,
        }
    }
}

/// Database response for a history row (a prior plan period)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SubscriptionHistoryDBResponse {
    pub id: i64,
    pub subscription_id: Uuid,
    pub plan: PlanTier,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub payment_reference: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn subscription(plan: PlanTier, is_active: bool, expires_at: Option<DateTime<Utc>>) -> SubscriptionDBResponse {
        let features = plan.features();
        SubscriptionDBResponse {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            plan,
            is_active,
            starts_at: Utc::now(),
            expires_at,
            auto_renew: false,
            payment_reference: None,
            unlimited_downloads: features.unlimited_downloads,
            priority_support: features.priority_support,
            no_ads: features.no_ads,
            exclusive_content: features.exclusive_content,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn free_plan_is_always_valid() {
        let sub = subscription(PlanTier::Free, false, None);
        assert!(sub.is_valid());
    }

    #[test]
    fn paid_plan_valid_until_expiry() {
        let now = Utc::now();
        let sub = subscription(PlanTier::Premium, true, Some(now + Duration::days(10)));
        assert!(sub.is_valid_at(now));
        assert!(!sub.is_valid_at(now + Duration::days(11)));
    }

    #[test]
    fn expired_paid_plan_invalid_even_if_active() {
        let now = Utc::now();
        let sub = subscription(PlanTier::Basic, true, Some(now - Duration::days(1)));
        assert!(!sub.is_valid_at(now));
    }

    #[test]
    fn paid_plan_without_expiry_is_invalid() {
        let sub = subscription(PlanTier::Enterprise, true, None);
        assert!(!sub.is_valid());
    }

    #[test]
    fn inactive_paid_plan_is_invalid() {
        let now = Utc::now();
        let sub = subscription(PlanTier::Premium, false, Some(now + Duration::days(10)));
        assert!(!sub.is_valid_at(now));
    }

    #[test]
    fn tier_features_are_monotone() {
        let tiers = [PlanTier::Free, PlanTier::Basic, PlanTier::Premium, PlanTier::Enterprise];
        let as_set = |f: PlanFeatures| {
            [f.unlimited_downloads, f.priority_support, f.no_ads, f.exclusive_content]
        };
        for pair in tiers.windows(2) {
            let lower = as_set(pair[0].features());
            let upper = as_set(pair[1].features());
            for (l, u) in lower.iter().zip(upper.iter()) {
                // Anything granted by a lower tier is granted by the higher one
                assert!(!l | u, "{:?} grants a feature {:?} does not", pair[0], pair[1]);
            }
        }
    }
}
