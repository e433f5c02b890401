//! Wallet handlers: overview, transaction history, funding and withdrawals.

use crate::{
    AppState,
    api::models::{
        pagination::PaginatedResponse,
        users::CurrentUser,
        wallets::{
            EarningResponse, FundWalletRequest, FundWalletResponse, ListTransactionsQuery, TransactionResponse, WalletResponse,
            WithdrawRequest, WithdrawResponse,
        },
    },
    db::{
        handlers::{Notifications, Wallets},
        models::{
            notifications::{NotificationCategory, NotificationCreateDBRequest, NotificationKind},
            wallets::{BankDetails, TransactionType},
        },
    },
    errors::{Error, Result},
};
use axum::{
    extract::{Query, State},
    response::Json,
};
use rust_decimal::Decimal;

const RECENT_EARNINGS_LIMIT: i64 = 10;

/// Get the wallet overview, creating the wallet on first access
#[utoipa::path(
    get,
    path = "/wallet",
    tag = "wallet",
    summary = "Get wallet balance and recent earnings",
    responses(
        (status = 200, description = "Wallet overview", body = WalletResponse),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_wallet(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<WalletResponse>> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut wallets = Wallets::new(&mut conn);

    let wallet = wallets.get_or_create(current_user.id).await?;
    let earnings = wallets.recent_earnings(wallet.id, RECENT_EARNINGS_LIMIT).await?;

    Ok(Json(WalletResponse {
        balance: wallet.balance,
        currency: wallet.currency,
        total_earnings: wallet.total_earnings,
        total_withdrawals: wallet.total_withdrawals,
        earnings: earnings.into_iter().map(EarningResponse::from).collect(),
    }))
}

/// List the caller's ledger entries
#[utoipa::path(
    get,
    path = "/wallet/transactions",
    tag = "wallet",
    summary = "List wallet transactions",
    params(ListTransactionsQuery),
    responses(
        (status = 200, description = "Transaction history", body = PaginatedResponse<TransactionResponse>),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(query): Query<ListTransactionsQuery>,
    current_user: CurrentUser,
) -> Result<Json<PaginatedResponse<TransactionResponse>>> {
    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(20).clamp(1, 100);

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut wallets = Wallets::new(&mut conn);

    // No wallet yet means no history
    let Some(wallet) = wallets.get_by_user(current_user.id).await? else {
        return Ok(Json(PaginatedResponse::new(Vec::new(), 0, skip, limit)));
    };

    let total = wallets.count_transactions(wallet.id, query.transaction_type).await?;
    let transactions = wallets.list_transactions(wallet.id, query.transaction_type, skip, limit).await?;

    Ok(Json(PaginatedResponse::new(
        transactions.into_iter().map(TransactionResponse::from).collect(),
        total,
        skip,
        limit,
    )))
}

/// Add funds to the wallet against an external payment reference
#[utoipa::path(
    post,
    path = "/wallet/fund",
    tag = "wallet",
    summary = "Fund the wallet",
    responses(
        (status = 200, description = "Wallet funded", body = FundWalletResponse),
        (status = 400, description = "Invalid amount"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn fund_wallet(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<FundWalletRequest>,
) -> Result<Json<FundWalletResponse>> {
    if data.amount <= Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "Please provide a valid amount".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let wallet = Wallets::new(&mut tx).get_or_create(current_user.id).await?;
    let description = format!("Wallet funded via {}", data.reference.as_deref().unwrap_or("direct deposit"));
    let (wallet, _) = Wallets::new(&mut tx)
        .credit(wallet.id, data.amount, TransactionType::Credit, "wallet_funding", Some(description))
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(FundWalletResponse {
        amount: data.amount,
        new_balance: wallet.balance,
    }))
}

/// Withdraw funds to a bank account. The ledger entry starts out pending.
#[utoipa::path(
    post,
    path = "/wallet/withdraw",
    tag = "wallet",
    summary = "Request a withdrawal",
    responses(
        (status = 200, description = "Withdrawal submitted", body = WithdrawResponse),
        (status = 400, description = "Invalid amount, missing bank details or insufficient funds"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Wallet not found"),
        (status = 500, description = "Internal server error"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn withdraw_funds(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(data): Json<WithdrawRequest>,
) -> Result<Json<WithdrawResponse>> {
    if data.amount <= Decimal::ZERO {
        return Err(Error::BadRequest {
            message: "Please provide a valid amount".to_string(),
        });
    }
    if data.account_details.bank_name.trim().is_empty() || data.account_details.account_number.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Please provide bank account details".to_string(),
        });
    }

    let minimum = state.config.wallet.minimum_withdrawal;
    if data.amount < minimum {
        return Err(Error::BadRequest {
            message: format!("Minimum withdrawal amount is {minimum} {}", state.config.wallet.currency),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let wallet = Wallets::new(&mut tx)
        .get_by_user(current_user.id)
        .await?
        .ok_or_else(|| Error::NotFound {
            resource: "Wallet".to_string(),
            id: current_user.id.to_string(),
        })?;

    let description = format!(
        "Withdrawal to {} - {}",
        data.account_details.bank_name, data.account_details.account_number
    );
    let debit = Wallets::new(&mut tx)
        .debit(wallet.id, data.amount, TransactionType::Withdrawal, "bank_withdrawal", Some(description))
        .await?;

    let Some((wallet, transaction)) = debit else {
        return Err(Error::InsufficientFunds {
            required: data.amount,
            available: wallet.balance,
        });
    };

    // First withdrawal captures the destination; later ones keep it
    Wallets::new(&mut tx)
        .save_bank_details_if_absent(
            wallet.id,
            &BankDetails {
                bank_name: data.account_details.bank_name.clone(),
                account_number: data.account_details.account_number.clone(),
                account_name: data.account_details.account_name.clone(),
            },
        )
        .await?;

    Notifications::new(&mut tx)
        .create(&NotificationCreateDBRequest {
            user_id: current_user.id,
            title: "Withdrawal Request".to_string(),
            message: format!(
                "Your withdrawal request of {} {} has been submitted and is being processed.",
                data.amount, wallet.currency
            ),
            kind: NotificationKind::Info,
            category: NotificationCategory::Wallet,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(WithdrawResponse {
        amount: data.amount,
        new_balance: wallet.balance,
        reference: transaction.reference,
        status: transaction.status,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::wallets::TransactionStatus;
    use crate::test_utils::{auth_header, create_test_app, create_test_user, fund_user_wallet};
    use serde_json::json;
    use sqlx::PgPool;
    use std::str::FromStr;

    #[sqlx::test]
    #[test_log::test]
    async fn test_get_wallet_creates_lazily(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        let response = app.get("/api/v1/wallet").add_header(name, value).await;
        response.assert_status_ok();
        let wallet: WalletResponse = response.json();
        assert_eq!(wallet.balance, Decimal::ZERO);
        assert_eq!(wallet.currency, "NGN");
        assert!(wallet.earnings.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_fund_wallet(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        let response = app
            .post("/api/v1/wallet/fund")
            .add_header(name.clone(), value.clone())
            .json(&json!({ "amount": "1000.50", "reference": "PSK-123" }))
            .await;

        response.assert_status_ok();
        let funded: FundWalletResponse = response.json();
        assert_eq!(funded.new_balance, Decimal::from_str("1000.50").unwrap());

        // The ledger has the matching credit entry
        let response = app.get("/api/v1/wallet/transactions").add_header(name, value).await;
        response.assert_status_ok();
        let history: PaginatedResponse<TransactionResponse> = response.json();
        assert_eq!(history.total_count, 1);
        assert_eq!(history.data[0].transaction_type, TransactionType::Credit);
        assert_eq!(history.data[0].source, "wallet_funding");
        assert_eq!(history.data[0].status, TransactionStatus::Completed);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_fund_wallet_rejects_nonpositive_amount(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        for amount in ["0", "-50"] {
            let response = app
                .post("/api/v1/wallet/fund")
                .add_header(name.clone(), value.clone())
                .json(&json!({ "amount": amount }))
                .await;
            response.assert_status_bad_request();
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_withdraw(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        fund_user_wallet(&pool, user.id, "5000").await;
        let (name, value) = auth_header(&user);

        let response = app
            .post("/api/v1/wallet/withdraw")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "amount": "2000",
                "account_details": { "bank_name": "GTBank", "account_number": "0123456789" }
            }))
            .await;

        response.assert_status_ok();
        let withdrawal: WithdrawResponse = response.json();
        assert_eq!(withdrawal.new_balance, Decimal::from(3000));
        assert_eq!(withdrawal.status, TransactionStatus::Pending);
        assert!(withdrawal.reference.starts_with("TXN-"));

        // A wallet notification was created
        let response = app.get("/api/v1/notifications").add_header(name, value).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["unread_count"], 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_withdraw_insufficient_funds_reports_amounts(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        fund_user_wallet(&pool, user.id, "1500").await;
        let (name, value) = auth_header(&user);

        let response = app
            .post("/api/v1/wallet/withdraw")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "amount": "2000",
                "account_details": { "bank_name": "GTBank", "account_number": "0123456789" }
            }))
            .await;

        response.assert_status_bad_request();
        let body: serde_json::Value = response.json();
        let required = Decimal::from_str(body["required"].as_str().unwrap()).unwrap();
        let available = Decimal::from_str(body["available"].as_str().unwrap()).unwrap();
        assert_eq!(required, Decimal::from(2000));
        assert_eq!(available, Decimal::from(1500));

        // Balance untouched
        let response = app.get("/api/v1/wallet").add_header(name, value).await;
        let wallet: WalletResponse = response.json();
        assert_eq!(wallet.balance, Decimal::from(1500));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_withdraw_below_minimum(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        fund_user_wallet(&pool, user.id, "5000").await;
        let (name, value) = auth_header(&user);

        let response = app
            .post("/api/v1/wallet/withdraw")
            .add_header(name, value)
            .json(&json!({
                "amount": "500",
                "account_details": { "bank_name": "GTBank", "account_number": "0123456789" }
            }))
            .await;

        response.assert_status_bad_request();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_withdraw_without_wallet_is_not_found(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        let (name, value) = auth_header(&user);

        let response = app
            .post("/api/v1/wallet/withdraw")
            .add_header(name, value)
            .json(&json!({
                "amount": "2000",
                "account_details": { "bank_name": "GTBank", "account_number": "0123456789" }
            }))
            .await;

        response.assert_status_not_found();
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_transactions_filter_by_type(pool: PgPool) {
        let app = create_test_app(pool.clone()).await;
        let user = create_test_user(&pool).await;
        fund_user_wallet(&pool, user.id, "5000").await;
        let (name, value) = auth_header(&user);

        app.post("/api/v1/wallet/withdraw")
            .add_header(name.clone(), value.clone())
            .json(&json!({
                "amount": "1000",
                "account_details": { "bank_name": "GTBank", "account_number": "0123456789" }
            }))
            .await
            .assert_status_ok();

        let response = app
            .get("/api/v1/wallet/transactions?type=withdrawal")
            .add_header(name, value)
            .await;
        response.assert_status_ok();
        let history: PaginatedResponse<TransactionResponse> = response.json();
        assert_eq!(history.total_count, 1);
        assert_eq!(history.data[0].transaction_type, TransactionType::Withdrawal);
    }
}
