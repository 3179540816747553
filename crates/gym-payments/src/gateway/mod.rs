//! Payment Gateway Integration
//!
//! Abstraction over the remote payment provider, plus the Razorpay client
//! and a mock for tests and local development.

mod mock;
mod razorpay;

pub use mock::MockGateway;
pub use razorpay::{RazorpayClient, RazorpayConfig};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::signature::SignatureVerifier;

/// Payment gateway trait (Strategy pattern)
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create a remote order the payer will complete at checkout
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder>;

    /// Verifier keyed with the secret the gateway signs completions with
    fn verifier(&self) -> &SignatureVerifier;

    /// Public key id handed to the checkout widget
    fn key_id(&self) -> &str;

    /// Gateway name
    fn name(&self) -> &str;
}

/// Order creation parameters
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRequest {
    /// Amount in minor currency units (paise for INR)
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
}

/// Order as returned by the gateway
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GatewayOrder {
    pub id: String,
    #[serde(default)]
    pub entity: String,
    /// Minor currency units
    pub amount: i64,
    #[serde(default)]
    pub amount_paid: i64,
    #[serde(default)]
    pub amount_due: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    pub status: String,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub notes: serde_json::Value,
    /// Unix seconds
    #[serde(default)]
    pub created_at: i64,
}
