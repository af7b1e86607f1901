//! Competition endpoints under `/api/competitions`.

use super::error::ApiResult;
use super::extract::{ApiJson, ApiQuery};
use super::session::CurrentUser;
use super::{AmountQuery, AppState, Message};
use crate::application::competitions::{CompetitionDetails, JoinRequest, StandingsUpdate};
use crate::application::engine::{
    ActivityEntry, CompetitionPaymentReceipt, MatchdayPaymentReceipt, MatchdayPaymentRequest,
    MatchdayStatus, PaymentStatusTable,
};
use crate::domain::competition::{Competition, CompetitionDraft};
use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Serialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/join", post(join))
        .route("/my", get(my_competitions))
        .route("/:id", get(details))
        .route("/:id/standings", patch(update_standings))
        .route("/:id/pay", post(pay))
        .route(
            "/:id/matchday-payments",
            get(matchday_status).post(pay_matchdays),
        )
        .route("/:id/payment-status-table", get(status_table))
        .route("/:id/transactions", get(transactions))
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub message: String,
    pub competition_id: String,
}

/// POST /api/competitions
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(draft): ApiJson<CompetitionDraft>,
) -> ApiResult<Json<Competition>> {
    Ok(Json(state.competitions.create(&user, draft).await?))
}

/// POST /api/competitions/join
pub async fn join(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(req): ApiJson<JoinRequest>,
) -> ApiResult<Json<JoinResponse>> {
    let competition = state.competitions.join(&user, req).await?;
    Ok(Json(JoinResponse {
        message: "Successfully joined competition".into(),
        competition_id: competition.id,
    }))
}

/// GET /api/competitions/my
pub async fn my_competitions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Vec<Competition>>> {
    Ok(Json(state.competitions.my_competitions(&user).await?))
}

/// GET /api/competitions/:id
pub async fn details(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<CompetitionDetails>> {
    Ok(Json(state.competitions.details(&user, &id).await?))
}

/// PATCH /api/competitions/:id/standings - admin only
pub async fn update_standings(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<StandingsUpdate>,
) -> ApiResult<Json<Message>> {
    state.competitions.update_standings(&user, &id, update).await?;
    Ok(Json(Message::new("Standings updated successfully")))
}

/// POST /api/competitions/:id/pay?amount=
pub async fn pay(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiQuery(q): ApiQuery<AmountQuery>,
) -> ApiResult<Json<CompetitionPaymentReceipt>> {
    let amount = q.amount()?;
    Ok(Json(state.engine.pay_competition(&user, &id, amount).await?))
}

/// POST /api/competitions/:id/matchday-payments
pub async fn pay_matchdays(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<MatchdayPaymentRequest>,
) -> ApiResult<Json<MatchdayPaymentReceipt>> {
    Ok(Json(state.engine.pay_matchdays(&user, &id, req).await?))
}

/// GET /api/competitions/:id/matchday-payments
pub async fn matchday_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<MatchdayStatus>> {
    Ok(Json(state.engine.matchday_status(&user, &id).await?))
}

/// GET /api/competitions/:id/payment-status-table
pub async fn status_table(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<PaymentStatusTable>> {
    Ok(Json(state.engine.status_table(&user, &id).await?))
}

/// GET /api/competitions/:id/transactions
pub async fn transactions(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<ActivityEntry>>> {
    Ok(Json(state.engine.competition_transactions(&user, &id).await?))
}
