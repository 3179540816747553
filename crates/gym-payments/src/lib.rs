//! # gym-payments
//!
//! Razorpay order creation, completion-signature verification and
//! membership activation.
//!
//! ## Flow
//!
//! ```text
//! ┌───────────┐ create_order ┌───────────┐  checkout   ┌───────────┐
//! │  Member   │─────────────▶│  Ledger   │────────────▶│  Razorpay │
//! │ (browser) │              │ (created) │             │  Checkout │
//! └───────────┘              └───────────┘             └───────────┘
//!       ▲                          │                         │
//!       │     membership           │ verify_payment          │ order_id, payment_id,
//!       └──────────────────────────┤◀────────────────────────┘ signature
//!                                  ▼
//!                    HMAC check → ownership check →
//!                    payment paid + membership (one transaction)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gym_payments::{PaymentLedger, RazorpayClient};
//!
//! let gateway = Arc::new(RazorpayClient::from_env()?);
//! let ledger = PaymentLedger::new(store, gateway);
//!
//! let receipt = ledger.create_order(user_id, form).await?;
//! // Hand receipt.order.id to the checkout widget, then:
//! let activation = ledger.verify_payment(user_id, completion).await?;
//! ```

mod error;
pub mod gateway;
mod ledger;
mod signature;

pub use error::{PaymentError, Result};
pub use gateway::{GatewayOrder, MockGateway, OrderRequest, PaymentGateway, RazorpayClient, RazorpayConfig};
pub use ledger::{to_minor_units, OrderForm, OrderReceipt, PaymentLedger, VerifyForm};
pub use signature::SignatureVerifier;
