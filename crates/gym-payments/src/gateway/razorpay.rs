//! Razorpay Orders API client

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use super::{GatewayOrder, OrderRequest, PaymentGateway};
use crate::error::{PaymentError, Result};
use crate::signature::SignatureVerifier;

const DEFAULT_BASE_URL: &str = "https://api.razorpay.com";

/// Razorpay client configuration
#[derive(Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl RazorpayConfig {
    pub fn new(key_id: impl Into<String>, key_secret: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 30,
        }
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let key_id = std::env::var("RAZORPAY_KEY_ID")
            .map_err(|_| PaymentError::Config("RAZORPAY_KEY_ID not set".into()))?;
        let key_secret = std::env::var("RAZORPAY_SECRET")
            .map_err(|_| PaymentError::Config("RAZORPAY_SECRET not set".into()))?;

        let mut config = Self::new(key_id, key_secret);
        if let Ok(base_url) = std::env::var("RAZORPAY_BASE_URL") {
            config.base_url = base_url;
        }
        Ok(config)
    }
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    description: String,
}

/// Razorpay client wrapper
pub struct RazorpayClient {
    http: reqwest::Client,
    config: RazorpayConfig,
    verifier: SignatureVerifier,
}

impl RazorpayClient {
    pub fn new(config: RazorpayConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PaymentError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            verifier: SignatureVerifier::new(config.key_secret.clone()),
            config,
        })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(RazorpayConfig::from_env()?)
    }

    fn orders_url(&self) -> String {
        format!("{}/v1/orders", self.config.base_url.trim_end_matches('/'))
    }
}

/// Turn a non-success response body into a gateway error
fn gateway_error(status: reqwest::StatusCode, body: &str) -> PaymentError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => PaymentError::Gateway(format!(
            "{status}: {} {}",
            envelope.error.code, envelope.error.description
        )),
        Err(_) => PaymentError::Gateway(format!("{status}: {body}")),
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder> {
        let response = self
            .http
            .post(self.orders_url())
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(gateway_error(status, &body));
        }

        let order = response.json::<GatewayOrder>().await?;
        tracing::debug!(order_id = %order.id, amount = order.amount, "Razorpay order created");
        Ok(order)
    }

    fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    fn key_id(&self) -> &str {
        &self.config.key_id
    }

    fn name(&self) -> &str {
        "Razorpay"
    }
}
