//! Account, session and preference endpoints under `/api/auth`.

use super::error::ApiResult;
use super::extract::{ApiJson, ApiQuery};
use super::session::{CurrentUser, cleared_session_cookie, session_cookie};
use super::{AppState, Message};
use crate::application::auth::{
    AuthResponse, LoginRequest, OtpSentResponse, ResendOtpRequest, SignupRequest, VerifyOtpRequest,
};
use crate::domain::user::UserProfile;
use axum::extract::State;
use axum::http::HeaderName;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/verify-otp", post(verify_otp))
        .route("/resend-otp", post(resend_otp))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", post(logout))
        .route("/language", patch(update_language))
        .route("/biometric", patch(toggle_biometric))
}

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    pub language: String,
}

#[derive(Debug, Deserialize)]
pub struct BiometricQuery {
    pub enabled: bool,
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<Json<OtpSentResponse>> {
    Ok(Json(state.auth.signup(req).await?))
}

/// POST /api/auth/verify-otp - verifies the account and opens a session
pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<VerifyOtpRequest>,
) -> ApiResult<impl IntoResponse> {
    let resp = state.auth.verify_otp(req).await?;
    Ok(with_session_cookie(&state, resp))
}

/// POST /api/auth/resend-otp
pub async fn resend_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResendOtpRequest>,
) -> ApiResult<Json<OtpSentResponse>> {
    Ok(Json(state.auth.resend_otp(req).await?))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<impl IntoResponse> {
    let resp = state.auth.login(req).await?;
    Ok(with_session_cookie(&state, resp))
}

fn with_session_cookie(
    state: &AppState,
    resp: AuthResponse,
) -> ([(HeaderName, String); 1], Json<AuthResponse>) {
    let cookie = session_cookie(&resp.session_token, state.auth.config().session_ttl);
    ([(SET_COOKIE, cookie)], Json(resp))
}

/// GET /api/auth/me
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserProfile> {
    Json(user.profile())
}

/// POST /api/auth/logout - drops every session of the caller
pub async fn logout(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<impl IntoResponse> {
    state.auth.logout(&user).await?;
    Ok((
        [(SET_COOKIE, cleared_session_cookie())],
        Json(Message::new("Logged out successfully")),
    ))
}

/// PATCH /api/auth/language?language=en|it
pub async fn update_language(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(q): ApiQuery<LanguageQuery>,
) -> ApiResult<Json<Message>> {
    state.auth.update_language(&user, &q.language).await?;
    Ok(Json(Message::new("Language updated successfully")))
}

/// PATCH /api/auth/biometric?enabled=true|false
pub async fn toggle_biometric(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiQuery(q): ApiQuery<BiometricQuery>,
) -> ApiResult<Json<Message>> {
    state.auth.set_biometric(&user, q.enabled).await?;
    let verb = if q.enabled { "enabled" } else { "disabled" };
    Ok(Json(Message::new(format!("Biometric authentication {verb}"))))
}
