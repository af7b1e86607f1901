//! HTTP/JSON API served by axum. Every route lives under `/api`.

pub mod auth;
pub mod competitions;
pub mod error;
pub mod extract;
pub mod session;
pub mod wallet;

use crate::application::auth::AuthService;
use crate::application::competitions::CompetitionService;
use crate::application::engine::PaymentEngine;
use crate::config::AuthConfig;
use crate::domain::money::Amount;
use crate::domain::ports::{OtpNotifierRef, Stores};
use crate::error::Result;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub competitions: Arc<CompetitionService>,
    pub engine: Arc<PaymentEngine>,
}

impl AppState {
    pub fn new(stores: Stores, notifier: OtpNotifierRef, auth_config: AuthConfig) -> Self {
        Self {
            auth: Arc::new(AuthService::new(stores.clone(), notifier, auth_config)),
            competitions: Arc::new(CompetitionService::new(stores.clone())),
            engine: Arc::new(PaymentEngine::new(stores)),
        }
    }
}

/// `{"message": "..."}` acknowledgement body.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// `?amount=` query parameter of the money-moving endpoints.
#[derive(Debug, Deserialize)]
pub struct AmountQuery {
    pub amount: Decimal,
}

impl AmountQuery {
    pub fn amount(&self) -> Result<Amount> {
        Amount::new(self.amount)
    }
}

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// GET /api/health
pub async fn health() -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: Utc::now(),
    })
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .nest("/auth", auth::routes())
        .nest("/competitions", competitions::routes())
        .merge(wallet::routes())
        .route("/health", get(health));

    Router::new()
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Binds `addr` and serves the API until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "fantapay API listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}
