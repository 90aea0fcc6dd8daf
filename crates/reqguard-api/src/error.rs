//! # API Error Types
//!
//! Responses the validation layer can produce on its own.
//!
//! A validation rejection uses the fixed `{"details": {...}}` body clients
//! match on. Every other error uses the structured
//! `{"error": {"code", "message"}}` body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use reqguard_schema::{RejectionBody, ValidationResult};

/// Structured JSON body for non-validation errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "PAYLOAD_TOO_LARGE").
    pub code: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// One or more declared constraints failed (400, `details` body).
    #[error("request validation failed with {} violation(s)", .0.len())]
    Validation(ValidationResult),

    /// The body exceeded the configured buffer limit (413).
    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// The body could not be read (400).
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            Self::PayloadTooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match self {
            Self::Validation(details) => {
                return (status, Json(RejectionBody { details })).into_response();
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use reqguard_schema::FieldError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_codes() {
        let cases = [
            (ApiError::Validation(ValidationResult::new()), StatusCode::BAD_REQUEST),
            (ApiError::PayloadTooLarge { limit: 1 }, StatusCode::PAYLOAD_TOO_LARGE),
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_and_code().0, status, "{err}");
        }
    }

    #[tokio::test]
    async fn validation_uses_details_body() {
        let mut details = ValidationResult::new();
        details.insert(FieldError {
            field: "body.name".into(),
            message: "Is required".into(),
        });
        let response = ApiError::Validation(details).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({"details": {"body.name": "Is required"}})
        );
    }

    #[tokio::test]
    async fn bad_request_uses_error_body() {
        let response = ApiError::BadRequest("failed to read request body".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
        assert_eq!(body["error"]["message"], "bad request: failed to read request body");
    }

    #[tokio::test]
    async fn payload_too_large_names_the_limit() {
        let response = ApiError::PayloadTooLarge { limit: 1024 }.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
        assert!(body["error"]["message"].as_str().unwrap().contains("1024"));
    }
}
