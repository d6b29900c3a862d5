use crate::domain::payment::{ErrorEnvelope, ErrorPayload};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("principal may not access this resource")]
    Unauthorized,
    #[error("{0}")]
    UpstreamFailure(&'static str),
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error("validation failed: {0}")]
    ValidationFailure(String),
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl PaymentError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            PaymentError::NotFound(_) => StatusCode::NOT_FOUND,
            PaymentError::Unauthorized => StatusCode::FORBIDDEN,
            PaymentError::UpstreamFailure(_) => StatusCode::BAD_GATEWAY,
            PaymentError::InvalidSignature => StatusCode::UNAUTHORIZED,
            PaymentError::ValidationFailure(_) => StatusCode::BAD_REQUEST,
            PaymentError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            PaymentError::NotFound(_) => "NOT_FOUND",
            PaymentError::Unauthorized => "FORBIDDEN",
            PaymentError::UpstreamFailure(_) => "UPSTREAM_FAILURE",
            PaymentError::InvalidSignature => "INVALID_SIGNATURE",
            PaymentError::ValidationFailure(_) => "VALIDATION_FAILED",
            PaymentError::Storage(_) => "INTERNAL_ERROR",
        }
    }

    /// Storage details stay in the logs; everything else is safe to echo.
    pub fn envelope(&self) -> ErrorEnvelope {
        let message = match self {
            PaymentError::Storage(_) => "internal error".to_string(),
            other => other.to_string(),
        };
        ErrorEnvelope {
            error: ErrorPayload {
                code: self.code().to_string(),
                message,
                details: None,
            },
        }
    }
}

impl IntoResponse for PaymentError {
    fn into_response(self) -> Response {
        if let PaymentError::Storage(e) = &self {
            tracing::error!("internal error: {:#}", e);
        }
        (self.status_code(), Json(self.envelope())).into_response()
    }
}
