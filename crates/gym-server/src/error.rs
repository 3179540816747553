//! API error responses
//!
//! Every failure leaves the server as `{success: false, error, code, retryable}`
//! with a code from a closed set. Internal details are logged, never returned.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use gym_core::GymError;
use gym_payments::PaymentError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
    /// Whether repeating the same request may succeed
    pub retryable: bool,
}

/// Errors surfaced by handlers and extractors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("{0}")]
    DuplicateAccount(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Payment signature invalid")]
    InvalidSignature,

    #[error("Order mismatch: {0}")]
    OrderMismatch(String),

    #[error("Already completed: {0}")]
    AlreadyCompleted(String),

    #[error("Payments are not configured")]
    PaymentsDisabled,

    #[error("Gateway error: {detail}")]
    Gateway {
        detail: String,
        message: String,
        retryable: bool,
    },

    #[error("Internal error: {detail}")]
    Internal { detail: String, retryable: bool },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_)
            | ApiError::InvalidCredentials
            | ApiError::InvalidSignature
            | ApiError::OrderMismatch(_) => StatusCode::BAD_REQUEST,
            ApiError::MissingToken => StatusCode::UNAUTHORIZED,
            ApiError::InvalidToken => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DuplicateAccount(_) | ApiError::AlreadyCompleted(_) => StatusCode::CONFLICT,
            ApiError::PaymentsDisabled => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Gateway { .. } | ApiError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::InvalidCredentials => "INVALID_CREDENTIALS",
            ApiError::MissingToken => "MISSING_TOKEN",
            ApiError::InvalidToken => "INVALID_TOKEN",
            ApiError::DuplicateAccount(_) => "DUPLICATE_ACCOUNT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InvalidSignature => "INVALID_SIGNATURE",
            ApiError::OrderMismatch(_) => "ORDER_MISMATCH",
            ApiError::AlreadyCompleted(_) => "ALREADY_COMPLETED",
            ApiError::PaymentsDisabled => "PAYMENTS_DISABLED",
            ApiError::Gateway { .. } => "GATEWAY_ERROR",
            ApiError::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to the client
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation(msg) | ApiError::DuplicateAccount(msg) | ApiError::NotFound(msg) => {
                msg.clone()
            }
            ApiError::InvalidCredentials => "Invalid email or password.".into(),
            ApiError::MissingToken => "Access denied. No token provided.".into(),
            ApiError::InvalidToken => "Invalid or expired token".into(),
            ApiError::InvalidSignature => "Invalid signature".into(),
            ApiError::OrderMismatch(_) => "The payment does not belong to this order".into(),
            ApiError::AlreadyCompleted(_) => "This payment has already been completed".into(),
            ApiError::PaymentsDisabled => "Payments are currently unavailable".into(),
            ApiError::Gateway { message, .. } => message.clone(),
            ApiError::Internal { .. } => "Internal server error".into(),
        }
    }

    /// Transient failures only: a gateway outage or a store hiccup
    pub const fn is_retryable(&self) -> bool {
        match self {
            ApiError::Gateway { retryable, .. } | ApiError::Internal { retryable, .. } => *retryable,
            _ => false,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        } else {
            tracing::debug!(code = self.code(), "{}", self);
        }

        let body = ErrorResponse {
            success: false,
            error: self.user_message(),
            code: self.code(),
            retryable: self.is_retryable(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<GymError> for ApiError {
    fn from(err: GymError) -> Self {
        match err {
            GymError::Validation(msg) => ApiError::Validation(msg),
            GymError::DuplicateAccount(_) => ApiError::DuplicateAccount(err.user_message()),
            GymError::NotFound(_) => ApiError::NotFound(err.user_message()),
            GymError::OrderMismatch { .. } => ApiError::OrderMismatch(err.to_string()),
            GymError::AlreadyCompleted(id) => ApiError::AlreadyCompleted(id),
            GymError::Storage(_) | GymError::Other(_) => ApiError::Internal {
                retryable: err.is_retryable(),
                detail: err.to_string(),
            },
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::Gateway(_) | PaymentError::Network(_) => ApiError::Gateway {
                detail: err.to_string(),
                message: err.user_message(),
                retryable: err.is_retryable(),
            },
            PaymentError::InvalidSignature => ApiError::InvalidSignature,
            PaymentError::InvalidAmount(_) => ApiError::Validation(err.user_message()),
            PaymentError::Config(_) => ApiError::Internal {
                detail: err.to_string(),
                retryable: err.is_retryable(),
            },
            PaymentError::Store(e) => e.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Internal {
            detail: format!("{err:#}"),
            retryable: false,
        }
    }
}
