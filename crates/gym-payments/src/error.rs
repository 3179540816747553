//! Payment Error Types

use gym_core::GymError;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Payment-related errors
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Gateway API error
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Gateway unreachable
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Completion signature did not match
    #[error("Payment signature invalid")]
    InvalidSignature,

    /// Amount cannot be charged
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Store rejected or failed the operation
    #[error(transparent)]
    Store(#[from] GymError),
}

impl PaymentError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::Gateway(_) | PaymentError::Network(_) => true,
            PaymentError::Store(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Get user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            PaymentError::Gateway(_) | PaymentError::Network(_) => {
                "Payment processing failed. Please try again.".into()
            }
            PaymentError::InvalidSignature => "Invalid signature".into(),
            PaymentError::InvalidAmount(msg) => msg.clone(),
            PaymentError::Config(_) => "Service configuration error.".into(),
            PaymentError::Store(e) => e.user_message(),
        }
    }
}
