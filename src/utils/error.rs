//! Error types surfaced by the gateway.
//!
//! Each layer has its own error enum (`StoreError`, `PublishError`); they
//! funnel into `GatewayError`, which is also what HTTP handlers return.
//! Callers only ever see a short message, causes go to the log.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::broker::PublishError;
use crate::persistence::StoreError;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("document store error: {0}")]
    Store(#[from] StoreError),

    #[error("publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("telemetry body is not a JSON object")]
    InvalidTelemetry,

    #[error("unrecognized command")]
    InvalidCommand,
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::InvalidTelemetry | GatewayError::InvalidCommand => {
                StatusCode::BAD_REQUEST
            }
            GatewayError::Publish(_) => StatusCode::BAD_GATEWAY,
            GatewayError::Config(_) | GatewayError::Store(_) | GatewayError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// The message placed in the `error` field of the response body.
    pub fn public_message(&self) -> &'static str {
        match self {
            GatewayError::InvalidTelemetry => "Invalid Telemetry",
            GatewayError::InvalidCommand => "Invalid Command",
            GatewayError::Publish(_) => "Command Dispatch Failed",
            GatewayError::Config(_) | GatewayError::Store(_) | GatewayError::Io(_) => {
                "Internal Server Error"
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.public_message() }));
        (self.status(), body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
