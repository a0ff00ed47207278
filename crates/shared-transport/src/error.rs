//! Transport and HTTP API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors from outbound HTTP calls.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Cannot connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Failed to encode request: {0}")]
    Encode(String),

    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// Registry answered 404.
    #[error("Service not found: {0}")]
    NotFound(String),

    /// Registry answered 503 for a discover call.
    #[error("Service {name} unavailable: {detail}")]
    Unavailable { name: String, detail: String },

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else if err.is_connect() {
            TransportError::Connect {
                url: url.to_string(),
                reason: err.to_string(),
            }
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

/// JSON error body used by every HTTP API: `{"detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// An HTTP error answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, detail)
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, detail)
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                detail: self.detail,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status() {
        let resp = ApiError::not_found("Service not found").into_response();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ApiError::unavailable("x").status,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
