//! `Json` and `Query` extractors whose rejections render as `{"detail"}`.

use crate::error::PaymentError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(PaymentError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(PaymentError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for PaymentError {
    fn from(rejection: JsonRejection) -> Self {
        PaymentError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for PaymentError {
    fn from(rejection: QueryRejection) -> Self {
        PaymentError::validation(rejection.body_text())
    }
}
