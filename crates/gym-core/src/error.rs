//! Error Types

use thiserror::Error;

/// Result type alias for domain and storage operations
pub type Result<T> = std::result::Result<T, GymError>;

/// Domain error types
#[derive(Error, Debug)]
pub enum GymError {
    /// Request data failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Email or phone already registered
    #[error("Duplicate account: {0} already registered")]
    DuplicateAccount(&'static str),

    /// Record missing, or not owned by the caller
    #[error("Not found: {0}")]
    NotFound(String),

    /// Gateway order id does not match the stored payment
    #[error("Order mismatch: payment {payment_id} belongs to order {expected}, got {actual}")]
    OrderMismatch {
        payment_id: String,
        expected: String,
        actual: String,
    },

    /// Payment already completed with another gateway payment
    #[error("Payment already completed: {0}")]
    AlreadyCompleted(String),

    /// Backing store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Other/unknown error
    #[error("{0}")]
    Other(String),
}

impl GymError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, GymError::Storage(_))
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            GymError::Validation(msg) => msg.clone(),
            GymError::DuplicateAccount(field) => {
                format!("An account with this {field} already exists.")
            }
            GymError::NotFound(_) => "Record not found or unauthorized.".into(),
            GymError::OrderMismatch { .. } => {
                "The payment does not belong to this order.".into()
            }
            GymError::AlreadyCompleted(_) => "This payment has already been completed.".into(),
            GymError::Storage(_) => {
                "The service is temporarily unavailable. Please try again.".into()
            }
            _ => "An unexpected error occurred.".into(),
        }
    }
}

impl From<anyhow::Error> for GymError {
    fn from(err: anyhow::Error) -> Self {
        GymError::Storage(format!("{err:#}"))
    }
}
