//! Gateway error type and its HTTP rendering.
//!
//! Every failure a request can hit ends up here, so every error response
//! has the same `{"error": "<message>"}` body.

use axum::extract::rejection::{BytesRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::BoxError;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::status::http_status;

/// A request body that could not be turned into the expected message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid request body{}: {message}", at_path(.path.as_deref()))]
pub struct DecodeError {
    /// Dotted path of the offending field, when it can be determined.
    pub path: Option<String>,
    pub message: String,
}

fn at_path(path: Option<&str>) -> String {
    path.map(|path| format!(" at `{}`", path)).unwrap_or_default()
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
}

/// Everything that can stop a request before or during dispatch.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("{0}")]
    Decode(#[from] DecodeError),

    #[error("payload missing")]
    PayloadMissing,

    #[error("payload too large")]
    PayloadTooLarge,

    /// Path or query parameters that do not fit the route.
    #[error("invalid request parameters: {0}")]
    BadParameters(String),

    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    /// A failure reported by (or on the way to) the backend service.
    #[error("{}", .0.message())]
    Backend(tonic::Status),

    #[error("not implemented")]
    NotImplemented,

    #[error("{0}")]
    Internal(String),
}

impl GatewayError {
    pub fn status(&self) -> StatusCode {
        match self {
            GatewayError::Decode(_)
            | GatewayError::PayloadMissing
            | GatewayError::BadParameters(_) => StatusCode::BAD_REQUEST,
            GatewayError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            GatewayError::Timeout => StatusCode::REQUEST_TIMEOUT,
            GatewayError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            GatewayError::Forbidden(_) => StatusCode::FORBIDDEN,
            GatewayError::Backend(status) => http_status(status.code()),
            GatewayError::NotImplemented => StatusCode::NOT_IMPLEMENTED,
            GatewayError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<tonic::Status> for GatewayError {
    fn from(status: tonic::Status) -> Self {
        GatewayError::Backend(status)
    }
}

impl From<PathRejection> for GatewayError {
    fn from(rejection: PathRejection) -> Self {
        GatewayError::BadParameters(rejection.body_text())
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        GatewayError::BadParameters(rejection.body_text())
    }
}

impl From<BytesRejection> for GatewayError {
    fn from(rejection: BytesRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            return GatewayError::PayloadTooLarge;
        }
        GatewayError::Decode(DecodeError {
            path: None,
            message: rejection.body_text(),
        })
    }
}

/// Renders failures raised by the tower layers wrapped in the router.
pub async fn handle_layer_error(err: BoxError) -> GatewayError {
    if err.is::<tower::timeout::error::Elapsed>() {
        GatewayError::Timeout
    } else {
        GatewayError::Internal(format!("unhandled middleware error: {}", err))
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = ErrorEnvelope {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
