//! Wallet repository: the ledger that every balance-affecting mutation goes
//! through.
//!
//! [`Wallets::credit`] and [`Wallets::debit`] adjust the balance row and
//! append the matching [`wallet_transactions`] ledger entry on the same
//! connection, so callers that run them inside a transaction get both writes
//! or neither. Debits are conditional updates (`balance >= amount`), which
//! makes a concurrent debit against a stale read fail instead of overdrawing.

use crate::{
    db::{
        errors::Result,
        models::wallets::{
            BankDetails, TransactionCreateDBRequest, TransactionDBResponse, TransactionStatus, TransactionType, WalletDBResponse,
        },
    },
    types::{UserId, WalletId},
};
use chrono::Utc;
use rand::{prelude::RngExt, rng};
use rust_decimal::Decimal;
use sqlx::PgConnection;
use tracing::instrument;

/// Generate a unique ledger reference: time component plus random suffix.
/// Collisions are treated as negligible; the unique index is the backstop.
fn generate_reference() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rng().random();
    format!("TXN-{millis}-{suffix:08X}")
}

pub struct Wallets<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Wallets<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_user(&mut self, user_id: UserId) -> Result<Option<WalletDBResponse>> {
        let wallet = sqlx::query_as::<_, WalletDBResponse>("SELECT * FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&mut *self.db)
            .await?;
        Ok(wallet)
    }

    /// Wallets are created lazily on first access.
    #[instrument(skip(self), err)]
    pub async fn get_or_create(&mut self, user_id: UserId) -> Result<WalletDBResponse> {
        if let Some(wallet) = self.get_by_user(user_id).await? {
            return Ok(wallet);
        }

        sqlx::query("INSERT INTO wallets (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&mut *self.db)
            .await?;

        let wallet = sqlx::query_as::<_, WalletDBResponse>("SELECT * FROM wallets WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut *self.db)
            .await?;
        Ok(wallet)
    }

    /// Append a ledger entry. Entries are never updated (withdrawal status
    /// aside) or deleted; insertion order is the audit trail.
    ///
    /// This does not touch the balance. Use [`credit`](Self::credit) /
    /// [`debit`](Self::debit) for balance-affecting operations.
    #[instrument(skip(self, request), err)]
    pub async fn record_transaction(&mut self, request: &TransactionCreateDBRequest) -> Result<TransactionDBResponse> {
        let reference = generate_reference();
        let transaction = sqlx::query_as::<_, TransactionDBResponse>(
            r#"
            INSERT INTO wallet_transactions (wallet_id, transaction_type, amount, source, description, reference, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(request.wallet_id)
        .bind(request.transaction_type)
        .bind(request.amount)
        .bind(&request.source)
        .bind(&request.description)
        .bind(&reference)
        .bind(request.status)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(transaction)
    }

    /// Increase the balance and append the matching ledger entry. Earning
    /// credits also accumulate into `total_earnings`.
    #[instrument(skip(self, description), err)]
    pub async fn credit(
        &mut self,
        wallet_id: WalletId,
        amount: Decimal,
        transaction_type: TransactionType,
        source: &str,
        description: Option<String>,
    ) -> Result<(WalletDBResponse, TransactionDBResponse)> {
        let sql = match transaction_type {
            TransactionType::Earning => {
                "UPDATE wallets SET balance = balance + $2, total_earnings = total_earnings + $2, updated_at = NOW() \
                 WHERE id = $1 RETURNING *"
            }
            _ => "UPDATE wallets SET balance = balance + $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        };

        let wallet = sqlx::query_as::<_, WalletDBResponse>(sql)
            .bind(wallet_id)
            .bind(amount)
            .fetch_one(&mut *self.db)
            .await?;

        let transaction = self
            .record_transaction(&TransactionCreateDBRequest {
                wallet_id,
                transaction_type,
                amount,
                source: source.to_string(),
                description,
                status: TransactionStatus::Completed,
            })
            .await?;

        Ok((wallet, transaction))
    }

    /// Decrease the balance if and only if it covers the amount, and append
    /// the matching ledger entry. Returns `None` without any mutation when
    /// funds are insufficient.
    ///
    /// Withdrawals accumulate into `total_withdrawals` and their ledger entry
    /// starts out `pending`.
    #[instrument(skip(self, description), err)]
    pub async fn debit(
        &mut self,
        wallet_id: WalletId,
        amount: Decimal,
        transaction_type: TransactionType,
        source: &str,
        description: Option<String>,
    ) -> Result<Option<(WalletDBResponse, TransactionDBResponse)>> {
        let sql = match transaction_type {
            TransactionType::Withdrawal => {
                "UPDATE wallets SET balance = balance - $2, total_withdrawals = total_withdrawals + $2, updated_at = NOW() \
                 WHERE id = $1 AND balance >= $2 RETURNING *"
            }
            _ => {
                "UPDATE wallets SET balance = balance - $2, updated_at = NOW() \
                 WHERE id = $1 AND balance >= $2 RETURNING *"
            }
        };

        let Some(wallet) = sqlx::query_as::<_, WalletDBResponse>(sql)
            .bind(wallet_id)
            .bind(amount)
            .fetch_optional(&mut *self.db)
            .await?
        else {
            return Ok(None);
        };

        let status = if transaction_type == TransactionType::Withdrawal {
            TransactionStatus::Pending
        } else {
            TransactionStatus::Completed
        };

        let transaction = self
            .record_transaction(&TransactionCreateDBRequest {
                wallet_id,
                transaction_type,
                amount,
                source: source.to_string(),
                description,
                status,
            })
            .await?;

        Ok(Some((wallet, transaction)))
    }

    /// Save the withdrawal destination, first write wins: details already on
    /// the wallet are never overwritten.
    #[instrument(skip(self, details), err)]
    pub async fn save_bank_details_if_absent(&mut self, wallet_id: WalletId, details: &BankDetails) -> Result<()> {
        sqlx::query(
            "UPDATE wallets SET bank_name = $2, bank_account_number = $3, bank_account_name = $4, updated_at = NOW() \
             WHERE id = $1 AND bank_name IS NULL",
        )
        .bind(wallet_id)
        .bind(&details.bank_name)
        .bind(&details.account_number)
        .bind(&details.account_name)
        .execute(&mut *self.db)
        .await?;
        Ok(())
    }

    /// List ledger entries newest first, optionally filtered by type.
    #[instrument(skip(self), err)]
    pub async fn list_transactions(
        &mut self,
        wallet_id: WalletId,
        transaction_type: Option<TransactionType>,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<TransactionDBResponse>> {
        let mut query = String::from("SELECT * FROM wallet_transactions WHERE wallet_id = $1");
        if transaction_type.is_some() {
            query.push_str(" AND transaction_type = $2");
        }
        query.push_str(&format!(" ORDER BY created_at DESC, id DESC LIMIT {limit} OFFSET {skip}"));

        let mut sql_query = sqlx::query_as::<_, TransactionDBResponse>(&query).bind(wallet_id);
        if let Some(transaction_type) = transaction_type {
            sql_query = sql_query.bind(transaction_type);
        }

        let transactions = sql_query.fetch_all(&mut *self.db).await?;
        Ok(transactions)
    }

    #[instrument(skip(self), err)]
    pub async fn count_transactions(&mut self, wallet_id: WalletId, transaction_type: Option<TransactionType>) -> Result<i64> {
        let mut query = String::from("SELECT COUNT(*) FROM wallet_transactions WHERE wallet_id = $1");
        if transaction_type.is_some() {
            query.push_str(" AND transaction_type = $2");
        }

        let mut sql_query = sqlx::query_scalar::<_, i64>(&query).bind(wallet_id);
        if let Some(transaction_type) = transaction_type {
            sql_query = sql_query.bind(transaction_type);
        }

        let count = sql_query.fetch_one(&mut *self.db).await?;
        Ok(count)
    }

    /// Most recent earning entries, for the wallet overview.
    #[instrument(skip(self), err)]
    pub async fn recent_earnings(&mut self, wallet_id: WalletId, limit: i64) -> Result<Vec<TransactionDBResponse>> {
        let earnings = sqlx::query_as::<_, TransactionDBResponse>(
            "SELECT * FROM wallet_transactions WHERE wallet_id = $1 AND transaction_type = 'earning' \
             ORDER BY created_at DESC, id DESC LIMIT $2",
        )
        .bind(wallet_id)
        .bind(limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(earnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_has_time_and_random_parts() {
        let reference = generate_reference();
        let parts: Vec<&str> = reference.splitn(3, '-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "TXN");
        assert!(parts[1].parse::<i64>().is_ok(), "time component should be numeric: {reference}");
        assert_eq!(parts[2].len(), 8);
        assert!(parts[2].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn references_are_unique_in_practice() {
        let a = generate_reference();
        let b = generate_reference();
        assert_ne!(a, b);
    }
}
