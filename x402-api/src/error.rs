//! API error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use x402_core::error::X402Error;

/// Message returned when the upstream credential is missing and nothing is cached.
pub const CONFIG_ERROR_MESSAGE: &str = "API configuration error";

/// Message returned when upstream failed and nothing is cached.
pub const FETCH_ERROR_MESSAGE: &str = "Failed to fetch facilitator data";

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    /// Internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// HTTP status of this error.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Client-facing message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Error response body.
#[derive(Serialize)]
struct ErrorResponse<'a> {
    error: &'a str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: &self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<X402Error> for ApiError {
    fn from(err: X402Error) -> Self {
        match &err {
            X402Error::UnknownCategory(_) => ApiError::not_found(err.to_string()),
            e if e.is_config_error() => {
                tracing::error!(error = %err, "Configuration error");
                ApiError::internal(CONFIG_ERROR_MESSAGE)
            }
            X402Error::NoCachedData => ApiError::internal(FETCH_ERROR_MESSAGE),
            e if e.is_recoverable() => {
                tracing::error!(error = %err, "Facilitator data unavailable");
                ApiError::internal(FETCH_ERROR_MESSAGE)
            }
            _ => {
                tracing::error!(error = %err, "Internal error");
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let err = ApiError::from(X402Error::MissingApiKey);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message(), CONFIG_ERROR_MESSAGE);

        let err = ApiError::from(X402Error::NoCachedData);
        assert_eq!(err.message(), FETCH_ERROR_MESSAGE);

        let err = ApiError::from(X402Error::UpstreamStatus {
            status: 502,
            reason: "Bad Gateway".into(),
        });
        assert_eq!(err.message(), FETCH_ERROR_MESSAGE);

        let err = ApiError::from(X402Error::UnknownCategory("nope".into()));
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_raw_errors_are_not_exposed() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "/secret/path missing");
        let err = ApiError::from(X402Error::from(io));
        assert!(!err.message().contains("/secret/path"));
    }
}
