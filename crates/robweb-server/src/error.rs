// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Error-to-status mapping for API responses.
//!
//! Every failure a handler can produce is an [`ApiError`]. Its category
//! determines the status code and the envelope key:
//!
//! | Category | Status | Envelope |
//! |----------|--------|----------|
//! | ConstraintViolation | 400 | `{"message": ...}` |
//! | InvalidRequest | 400 | `{"message": ...}` |
//! | Unauthenticated | 403 | `{"message": ...}` |
//! | Unauthorized | 403 | `{"message": ...}` |
//! | UnknownObject | 404 | `{"message": ...}` |
//! | UploadTooLarge | 413 | `{"error": ...}` |
//! | Internal | 500 | `{"error": "internal server error"}` |

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};

use robweb_service::{ObjectKind, ServiceError};

/// Message returned for every internal error.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

/// Result type using ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

/// Errors returned by route handlers.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ApiError {
    /// The request is malformed (body, upload or query).
    #[error("{0}")]
    InvalidRequest(String),

    /// The request body exceeds the configured maximum.
    #[error("{0}")]
    UploadTooLarge(String),

    /// An error raised by the engine.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Unexpected failure inside the HTTP layer.
    #[error("{0}")]
    Internal(String),
}

/// Error categories with a fixed HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Domain constraint violated.
    ConstraintViolation,
    /// Malformed request.
    InvalidRequest,
    /// Missing or invalid access token.
    Unauthenticated,
    /// Permission denied.
    Unauthorized,
    /// Lookup miss.
    UnknownObject,
    /// Request body too large.
    UploadTooLarge,
    /// Anything else.
    Internal,
}

impl ErrorCategory {
    /// HTTP status code for the category.
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCategory::ConstraintViolation | ErrorCategory::InvalidRequest => {
                StatusCode::BAD_REQUEST
            }
            ErrorCategory::Unauthenticated | ErrorCategory::Unauthorized => StatusCode::FORBIDDEN,
            ErrorCategory::UnknownObject => StatusCode::NOT_FOUND,
            ErrorCategory::UploadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Create an `InvalidRequest` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        ApiError::InvalidRequest(message.into())
    }

    /// Error for a missing access token.
    pub fn unauthenticated() -> Self {
        ApiError::Service(ServiceError::Unauthenticated)
    }

    /// Category of the error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ApiError::InvalidRequest(_) => ErrorCategory::InvalidRequest,
            ApiError::UploadTooLarge(_) => ErrorCategory::UploadTooLarge,
            ApiError::Internal(_) => ErrorCategory::Internal,
            ApiError::Service(err) => match err {
                ServiceError::ConstraintViolation(_) => ErrorCategory::ConstraintViolation,
                ServiceError::Unauthenticated => ErrorCategory::Unauthenticated,
                ServiceError::Unauthorized(_) => ErrorCategory::Unauthorized,
                ServiceError::UnknownObject { .. } | ServiceError::UnknownParameter(_) => {
                    ErrorCategory::UnknownObject
                }
                _ => ErrorCategory::Internal,
            },
        }
    }

    /// HTTP status code of the error.
    pub fn status(&self) -> StatusCode {
        self.category().status()
    }

    /// Report unknown run parameters as a client input error.
    pub fn unknown_parameter_as_invalid(self) -> Self {
        match self {
            ApiError::Service(ServiceError::UnknownParameter(name)) => {
                ApiError::InvalidRequest(format!("unknown parameter '{name}'"))
            }
            other => other,
        }
    }

    /// Report unknown member users as a client input error.
    pub fn unknown_user_as_invalid(self) -> Self {
        match self {
            ApiError::Service(err) if err.is_unknown(ObjectKind::User) => {
                ApiError::InvalidRequest(err.to_string())
            }
            other => other,
        }
    }
}

impl From<axum::Error> for ApiError {
    fn from(e: axum::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<axum::http::Error> for ApiError {
    fn from(e: axum::http::Error) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let category = self.category();
        let status = category.status();
        let body = match category {
            ErrorCategory::Internal => {
                error!(error = %self, "Internal server error");
                json!({ "error": INTERNAL_ERROR_MESSAGE })
            }
            ErrorCategory::UploadTooLarge => {
                error!(error = %self, "Request body too large");
                json!({ "error": self.to_string() })
            }
            _ => {
                warn!(status = status.as_u16(), message = %self, "Request failed");
                json!({ "message": self.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_table() {
        let cases = [
            (ApiError::invalid("x"), 400),
            (ServiceError::constraint("x").into(), 400),
            (ApiError::unauthenticated(), 403),
            (ServiceError::unauthorized("x").into(), 403),
            (ServiceError::unknown(ObjectKind::Run, "r").into(), 404),
            (ServiceError::UnknownParameter("p".into()).into(), 404),
            (ApiError::UploadTooLarge("x".into()), 413),
            (ApiError::Internal("boom".into()), 500),
            (ServiceError::Internal("boom".into()).into(), 500),
        ];
        for (err, status) in cases {
            assert_eq!(err.status().as_u16(), status, "{err:?}");
        }
    }

    #[test]
    fn test_unknown_parameter_translation() {
        let err: ApiError = ServiceError::UnknownParameter("sleepfor".into()).into();
        let err = err.unknown_parameter_as_invalid();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("sleepfor"));

        let err: ApiError = ServiceError::unknown(ObjectKind::Group, "g").into();
        assert_eq!(err.unknown_parameter_as_invalid().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unknown_user_translation() {
        let err: ApiError = ServiceError::unknown(ObjectKind::User, "ghost").into();
        assert_eq!(err.unknown_user_as_invalid().status(), StatusCode::BAD_REQUEST);

        let err: ApiError = ServiceError::unknown(ObjectKind::Workflow, "w").into();
        assert_eq!(err.unknown_user_as_invalid().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_client_error_envelope() {
        let response = ApiError::invalid("no JSON object").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({"message": "no JSON object"}));
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = ApiError::Internal("database exploded".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await, json!({"error": "internal server error"}));
    }

    #[tokio::test]
    async fn test_too_large_envelope() {
        let response = ApiError::UploadTooLarge("request body too large".into()).into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(body_json(response).await.get("error").is_some());
    }
}
