//! Secure Error Handling
//!
//! Provides safe error responses that don't leak internal details. Internal
//! causes are logged; clients get a category and a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Application error type with secure response handling
#[derive(Debug)]
pub struct AppError {
    /// Error kind for categorization
    pub kind: ErrorKind,
    /// Message safe to show to users
    pub message: String,
    /// Internal details (logged but not exposed)
    internal: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Authentication,
    Authorization,
    NotFound,
    Conflict,
    Internal,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            internal: None,
        }
    }

    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Authentication,
            message: message.into(),
            internal: None,
        }
    }

    /// The one login failure. Unknown user and wrong password must be
    /// indistinguishable, so both paths construct exactly this error.
    pub fn invalid_credentials() -> Self {
        Self::auth_failed("Invalid username or password")
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Authorization,
            message: message.into(),
            internal: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::NotFound,
            message: message.into(),
            internal: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Conflict,
            message: message.into(),
            internal: None,
        }
    }

    /// Create internal error - logs details but shows generic message
    pub fn internal(internal_details: impl Into<String>) -> Self {
        let details = internal_details.into();
        error!(error = %details, "Internal error occurred");
        Self {
            kind: ErrorKind::Internal,
            message: "An internal error occurred".into(),
            internal: Some(details),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: ErrorKind,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self.kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
            ErrorKind::Authorization => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = ErrorResponse {
            error: self.message,
            kind: self.kind,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_credentials_is_always_identical() {
        let a = AppError::invalid_credentials();
        let b = AppError::invalid_credentials();
        assert_eq!(a.kind, b.kind);
        assert_eq!(a.message, b.message);
    }

    #[test]
    fn internal_error_hides_details() {
        let err = AppError::internal("pool exhausted at pg://10.0.0.3");
        assert_eq!(err.message, "An internal error occurred");
        assert!(err.internal.is_some());
    }

    #[test]
    fn kinds_map_to_statuses() {
        let cases = [
            (AppError::validation("x"), StatusCode::BAD_REQUEST),
            (AppError::invalid_credentials(), StatusCode::UNAUTHORIZED),
            (AppError::forbidden("x"), StatusCode::FORBIDDEN),
            (AppError::not_found("x"), StatusCode::NOT_FOUND),
            (AppError::conflict("x"), StatusCode::CONFLICT),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
