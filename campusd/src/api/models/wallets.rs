//! API request/response models for the wallet.

use crate::db::models::wallets::{TransactionDBResponse, TransactionStatus, TransactionType, WalletDBResponse};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Wallet overview: balance, accumulators and the most recent earnings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletResponse {
    #[schema(value_type = f64)]
    pub balance: Decimal,
    pub currency: String,
    #[schema(value_type = f64)]
    pub total_earnings: Decimal,
    #[schema(value_type = f64)]
    pub total_withdrawals: Decimal,
    pub earnings: Vec<EarningResponse>,
}

/// One recent earning entry on the wallet overview.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EarningResponse {
    pub source: String,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
}

impl From<TransactionDBResponse> for EarningResponse {
    fn from(db: TransactionDBResponse) -> Self {
        Self {
            source: db.source,
            amount: db.amount,
            date: db.created_at,
            description: db.description,
        }
    }
}

/// One ledger entry.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: i64,
    pub transaction_type: TransactionType,
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub source: String,
    pub description: Option<String>,
    pub reference: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionDBResponse> for TransactionResponse {
    fn from(db: TransactionDBResponse) -> Self {
        Self {
            id: db.id,
            transaction_type: db.transaction_type,
            amount: db.amount,
            source: db.source,
            description: db.description,
            reference: db.reference,
            status: db.status,
            created_at: db.created_at,
        }
    }
}

/// Query parameters for the transaction listing
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
pub struct ListTransactionsQuery {
    /// Filter by transaction type
    #[serde(rename = "type")]
    pub transaction_type: Option<TransactionType>,

    /// Number of items to skip
    #[param(default = 0, minimum = 0)]
    pub skip: Option<i64>,

    /// Maximum number of items to return
    #[param(default = 20, minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FundWalletRequest {
    /// Amount to add, must be positive
    #[schema(value_type = f64)]
    pub amount: Decimal,
    /// Opaque payment reference from the funding channel
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FundWalletResponse {
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[schema(value_type = f64)]
    pub new_balance: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AccountDetails {
    pub bank_name: String,
    pub account_number: String,
    pub account_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    /// Amount to withdraw, must meet the configured minimum
    #[schema(value_type = f64)]
    pub amount: Decimal,
    pub account_details: AccountDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawResponse {
    #[schema(value_type = f64)]
    pub amount: Decimal,
    #[schema(value_type = f64)]
    pub new_balance: Decimal,
    pub reference: String,
    pub status: TransactionStatus,
}
