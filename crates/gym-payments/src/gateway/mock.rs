//! Mock Payment Gateway
//!
//! For testing and local development. Orders are kept in memory and
//! `simulate_checkout` plays the payer completing payment.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::{GatewayOrder, OrderRequest, PaymentGateway};
use crate::error::{PaymentError, Result};
use crate::signature::SignatureVerifier;

/// Mock gateway with an in-memory order book
pub struct MockGateway {
    verifier: SignatureVerifier,
    orders: Mutex<Vec<GatewayOrder>>,
    unavailable: AtomicBool,
}

impl MockGateway {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            verifier: SignatureVerifier::new(secret),
            orders: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Make subsequent order creation fail (or succeed again)
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Orders created so far
    pub async fn orders(&self) -> Vec<GatewayOrder> {
        self.orders.lock().await.clone()
    }

    /// Complete checkout for an order, returning the gateway payment id and
    /// the signature the gateway would hand back to the browser.
    pub fn simulate_checkout(&self, order_id: &str) -> (String, String) {
        let payment_id = format!("pay_{}", &uuid::Uuid::new_v4().simple().to_string()[..14]);
        let signature = self.verifier.sign(order_id, &payment_id);
        (payment_id, signature)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PaymentError::Gateway("mock gateway unavailable".into()));
        }

        let order = GatewayOrder {
            id: format!("order_{}", &uuid::Uuid::new_v4().simple().to_string()[..14]),
            entity: "order".into(),
            amount: request.amount,
            amount_paid: 0,
            amount_due: request.amount,
            currency: request.currency.clone(),
            receipt: Some(request.receipt.clone()),
            status: "created".into(),
            attempts: 0,
            notes: serde_json::Value::Array(Vec::new()),
            created_at: Utc::now().timestamp(),
        };

        self.orders.lock().await.push(order.clone());
        Ok(order)
    }

    fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    fn key_id(&self) -> &str {
        "rzp_test_mock"
    }

    fn name(&self) -> &str {
        "MockGateway"
    }
}
