//! Error handling for the Snapsong API
//!
//! This module provides the API error type using thiserror, with automatic
//! HTTP status code mapping via Axum's IntoResponse trait. Collaborator
//! failures inside the recommendation pipeline are recovered locally and
//! never reach this type; only input errors and failures that escape every
//! fallback do.

use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// API error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Human-readable error message
    pub error: String,
    /// Error code for client-side handling
    pub code: &'static str,
}

/// Main API error type
#[derive(Error, Debug)]
pub enum ApiError {
    // ========== Input Errors ==========
    /// The upload carried no `image` field
    #[error("No image provided")]
    MissingImage,

    /// The `image` field had an empty filename or no bytes
    #[error("No image selected")]
    EmptyImage,

    /// Multipart stream failed mid-read (includes body limit violations)
    #[error("invalid multipart upload: {0}")]
    Multipart(#[from] MultipartError),

    // ========== Internal Errors ==========
    /// Internal server error (catch-all for unexpected errors)
    #[error("internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingImage | Self::EmptyImage => StatusCode::BAD_REQUEST,

            // Multipart errors know their own status (400 or 413)
            Self::Multipart(e) => e.status(),

            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code string for client-side handling
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingImage => "MISSING_FIELD",
            Self::EmptyImage => "VALIDATION_ERROR",
            Self::Multipart(_) => "INVALID_UPLOAD",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Log the error with appropriate severity based on status code
    pub fn log(&self) {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::debug!(
                error = %self,
                code = self.error_code(),
                status = status.as_u16(),
                "Client error"
            );
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.log();

        let status = self.status_code();
        let error_response = ErrorResponse {
            error: self.to_string(),
            code: self.error_code(),
        };

        (status, Json(error_response)).into_response()
    }
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;

// ========== Conversion Implementations ==========

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("background task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::MissingImage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::EmptyImage.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Internal("boom".to_string()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(ApiError::MissingImage.error_code(), "MISSING_FIELD");
        assert_eq!(ApiError::EmptyImage.error_code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_input_error_messages() {
        assert_eq!(ApiError::MissingImage.to_string(), "No image provided");
        assert_eq!(ApiError::EmptyImage.to_string(), "No image selected");
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = ApiError::EmptyImage.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "No image selected");
        assert_eq!(json["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_join_error_maps_to_internal() {
        let handle = tokio::spawn(async { panic!("normalizer crashed") });
        let err: ApiError = handle.await.unwrap_err().into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_code(), "INTERNAL_ERROR");
    }
}
