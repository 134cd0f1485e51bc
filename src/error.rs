use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum PayGuardError {
    #[error("Callback verification failed: {0}")]
    VerificationFailed(String),

    #[error("Malformed callback: {0}")]
    MalformedCallback(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Reconciliation failed: {0}")]
    ReconciliationFailed(String),

    #[error("Duplicate transaction reference: {0}")]
    DuplicateReference(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,
}

impl IntoResponse for PayGuardError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();

        let (status, error_code) = match &self {
            PayGuardError::VerificationFailed(_) => {
                (StatusCode::UNAUTHORIZED, "SIGNATURE_INVALID")
            }
            PayGuardError::MalformedCallback(_) => {
                (StatusCode::BAD_REQUEST, "MALFORMED_CALLBACK")
            }
            PayGuardError::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, "INVALID_REQUEST")
            }
            PayGuardError::ReconciliationFailed(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORE_UNAVAILABLE")
            }
            PayGuardError::DuplicateReference(_) => {
                (StatusCode::CONFLICT, "DUPLICATE_REFERENCE")
            }
            PayGuardError::RateLimitExceeded => {
                (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMIT_EXCEEDED")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id,
        };

        tracing::error!(
            error = ?self,
            error_code = error_code,
            "Request failed"
        );

        (status, Json(body)).into_response()
    }
}
