#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use fantapay::config::AuthConfig;
use fantapay::domain::ports::{OtpNotifier, Stores};
use fantapay::error::Result;
use fantapay::interfaces::http::{AppState, router};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

/// Captures one-time codes instead of mailing them.
#[derive(Default)]
pub struct Outbox(Mutex<Vec<(String, String)>>);

impl Outbox {
    pub fn last_code(&self, email: &str) -> String {
        self.0
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(e, _)| e == email)
            .map(|(_, c)| c.clone())
            .expect("no code sent")
    }
}

#[async_trait]
impl OtpNotifier for Outbox {
    async fn send_otp(&self, email: &str, _name: &str, otp_code: &str) -> Result<()> {
        self.0
            .lock()
            .unwrap()
            .push((email.to_string(), otp_code.to_string()));
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub outbox: Arc<Outbox>,
    pub stores: Stores,
}

impl TestApp {
    pub fn new() -> Self {
        let stores = Stores::in_memory();
        let outbox = Arc::new(Outbox::default());
        let state = AppState::new(stores.clone(), outbox.clone(), AuthConfig::default());
        Self {
            router: router(state),
            outbox,
            stores,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    /// Sends a JSON request, authenticating with a bearer token when given.
    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = self.send(req).await;
        let status = resp.status();
        (status, body_json(resp).await)
    }

    /// Signs up and verifies `username`, returning its session token.
    pub async fn register(&self, username: &str) -> String {
        let email = format!("{username}@example.com");
        let (status, _) = self
            .call(
                "POST",
                "/api/auth/signup",
                None,
                Some(json!({
                    "username": username,
                    "email": email,
                    "name": username,
                    "password": "secret123",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        let code = self.outbox.last_code(&email);
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/verify-otp",
                None,
                Some(json!({ "email": email, "otp_code": code })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["session_token"].as_str().unwrap().to_string()
    }

    pub async fn topup(&self, token: &str, amount: u32) {
        let (status, _) = self
            .call("POST", &format!("/api/wallet/topup?amount={amount}"), Some(token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    /// Creates a competition with a 36-matchday season and returns its JSON.
    pub async fn create_competition(&self, token: &str, name: &str, daily_fee: Option<u32>) -> Value {
        let (status, body) = self
            .call(
                "POST",
                "/api/competitions",
                Some(token),
                Some(json!({
                    "name": name,
                    "rules": { "type": "mixed", "daily_prize": 15, "final_prize_pool": [] },
                    "total_matchdays": 36,
                    "participation_cost_per_team": 250,
                    "expected_teams": 8,
                    "daily_payment_enabled": daily_fee.is_some(),
                    "daily_payment_amount": daily_fee.unwrap_or(0),
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body
    }

    pub async fn join(&self, token: &str, invite_code: &str) -> StatusCode {
        let (status, _) = self
            .call(
                "POST",
                "/api/competitions/join",
                Some(token),
                Some(json!({ "invite_code": invite_code })),
            )
            .await;
        status
    }
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    }
}
