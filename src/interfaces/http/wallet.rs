//! Personal wallet and transaction history endpoints.

use super::error::ApiResult;
use super::extract::ApiQuery;
use super::session::CurrentUser;
use super::{AmountQuery, AppState};
use crate::application::engine::WalletUpdate;
use crate::domain::money::Balance;
use crate::domain::transaction::Transaction;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/wallet/balance", get(balance))
        .route("/wallet/topup", post(topup))
        .route("/wallet/withdraw", post(withdraw))
        .route("/transactions", get(transactions))
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: Balance,
}

/// GET /api/wallet/balance
pub async fn balance(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<BalanceResponse>> {
    let balance = state.engine.balance(&user).await?;
    Ok(Json(BalanceResponse { balance }))
}

/// POST /api/wallet/topup?amount=
pub async fn topup(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(q): ApiQuery<AmountQuery>,
) -> ApiResult<Json<WalletUpdate>> {
    let amount = q.amount()?;
    Ok(Json(state.engine.topup(&user, amount).await?))
}

/// POST /api/wallet/withdraw?amount=
pub async fn withdraw(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(q): ApiQuery<AmountQuery>,
) -> ApiResult<Json<WalletUpdate>> {
    let amount = q.amount()?;
    Ok(Json(state.engine.withdraw(&user, amount).await?))
}

/// GET /api/transactions - newest first
pub async fn transactions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Transaction>>> {
    Ok(Json(state.engine.transactions(&user).await?))
}
