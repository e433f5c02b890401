//! Database models for wallets and the transaction ledger.

use crate::types::{UserId, WalletId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Wallet transaction type enum stored as TEXT in database
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Debit,
    Withdrawal,
    Earning,
    Refund,
}

/// Transaction status stored as TEXT in database. Withdrawals start out
/// `pending`; every other transaction type is created `completed`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
}

/// Database response for a wallet row
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WalletDBResponse {
    pub id: WalletId,
    pub user_id: UserId,
    pub balance: Decimal,
    pub currency: String,
    pub total_earnings: Decimal,
    pub total_withdrawals: Decimal,
    pub bank_name: Option<String>,
    pub bank_account_number: Option<String>,
    pub bank_account_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database request for appending a ledger entry
#[derive(Debug, Clone)]
pub struct TransactionCreateDBRequest {
    pub wallet_id: WalletId,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub source: String,
    pub description: Option<String>,
    pub status: TransactionStatus,
}

/// Database response for a ledger entry
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TransactionDBResponse {
    pub id: i64,
    pub wallet_id: WalletId,
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub source: String,
    pub description: Option<String>,
    pub reference: String,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Withdrawal destination captured on the first withdrawal
#[derive(Debug, Clone)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_number: String,
    pub account_name: Option<String>,
}
