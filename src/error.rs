//! Error types shared by the services and both presentation surfaces.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::services::guard::GuardViolation;

/// Field name -> messages, reported back to the caller as-is.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

pub fn add_error(errs: &mut FieldErrors, field: &str, msg: impl Into<String>) {
    errs.entry(field.to_string()).or_default().push(msg.into());
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("mongo error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input")]
    Validation(FieldErrors),

    #[error(transparent)]
    Guard(#[from] GuardViolation),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

impl ServiceError {
    pub fn field(field: &str, msg: impl Into<String>) -> Self {
        let mut errs = FieldErrors::new();
        add_error(&mut errs, field, msg);
        ServiceError::Validation(errs)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        match self {
            ServiceError::Validation(errs) => (StatusCode::BAD_REQUEST, Json(errs)).into_response(),
            ServiceError::Guard(v) => {
                (StatusCode::BAD_REQUEST, Json(json!([v.to_string()]))).into_response()
            }
            ServiceError::NotFound(_) => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
            }
            ServiceError::Storage(e) => {
                tracing::error!("storage failure: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Storage error." })),
                )
                    .into_response()
            }
        }
    }
}
