//! Payment Ledger
//!
//! Order creation and the verify-then-activate sequence:
//!
//! 1. recompute the completion signature with the gateway secret,
//! 2. look the payment up under the caller's identity,
//! 3. mark it paid and derive the membership in one store transaction.

use chrono::Utc;
use gym_core::{Activation, GymStore, NewPayment, Payment, PaymentCompletion, PaymentId, Plan, UserId};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::error::{PaymentError, Result};
use crate::gateway::{GatewayOrder, OrderRequest, PaymentGateway};

const DEFAULT_CURRENCY: &str = "INR";

/// Convert a major-unit amount into the gateway's minor unit (×100).
///
/// # Errors
///
/// `InvalidAmount` for non-positive amounts, sub-paise fractions, or overflow.
pub fn to_minor_units(amount: Decimal) -> Result<i64> {
    if amount <= Decimal::ZERO {
        return Err(PaymentError::InvalidAmount(
            "Amount must be greater than zero".into(),
        ));
    }

    let minor = amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .ok_or_else(|| PaymentError::InvalidAmount("Amount is too large".into()))?;

    if !minor.fract().is_zero() {
        return Err(PaymentError::InvalidAmount(
            "Amount cannot have more than two decimal places".into(),
        ));
    }

    minor
        .to_i64()
        .ok_or_else(|| PaymentError::InvalidAmount("Amount is too large".into()))
}

/// Order request from an authenticated member
#[derive(Clone, Debug)]
pub struct OrderForm {
    /// Major currency units
    pub amount: Decimal,
    pub currency: Option<String>,
    pub receipt: Option<String>,
    pub plan: Plan,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub payment_method: Option<String>,
}

/// Result of creating an order
#[derive(Clone, Debug)]
pub struct OrderReceipt {
    pub order: GatewayOrder,
    pub payment: Payment,
}

/// Completion data the browser received from the gateway checkout
#[derive(Clone, Debug)]
pub struct VerifyForm {
    pub order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
    /// Local payment record returned by order creation
    pub payment_id: PaymentId,
}

/// Records payment attempts and promotes verified ones into memberships
pub struct PaymentLedger {
    store: Arc<dyn GymStore>,
    gateway: Arc<dyn PaymentGateway>,
}

impl PaymentLedger {
    pub fn new(store: Arc<dyn GymStore>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { store, gateway }
    }

    pub fn gateway(&self) -> &dyn PaymentGateway {
        self.gateway.as_ref()
    }

    /// Create a gateway order, then record the local payment as `created`.
    pub async fn create_order(&self, actor: UserId, form: OrderForm) -> Result<OrderReceipt> {
        let amount = to_minor_units(form.amount)?;
        let currency = normalize_currency(form.currency.as_deref())?;
        let receipt = form
            .receipt
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| format!("receipt_{}", Utc::now().timestamp_millis()));

        let request = OrderRequest {
            amount,
            currency: currency.clone(),
            receipt: receipt.clone(),
        };
        let order = self.gateway.create_order(&request).await?;

        let payment = self
            .store
            .create_payment(NewPayment {
                user_id: actor,
                name: form.name,
                email: form.email,
                phone: form.phone,
                plan: form.plan,
                amount: form.amount,
                currency,
                receipt,
                order_id: order.id.clone(),
                payment_method: form.payment_method,
            })
            .await?;

        tracing::info!(
            payment_id = %payment.id,
            order_id = %order.id,
            user_id = %actor,
            plan = %payment.plan,
            amount = %payment.amount,
            "Payment order created"
        );

        Ok(OrderReceipt { order, payment })
    }

    /// Verify a completion signature and activate the membership.
    ///
    /// Idempotent: replaying the same completion returns the existing
    /// membership with `newly_activated == false`.
    pub async fn verify_payment(&self, actor: UserId, form: VerifyForm) -> Result<Activation> {
        if let Err(e) = self.gateway.verifier().verify(
            &form.order_id,
            &form.gateway_payment_id,
            &form.signature,
        ) {
            tracing::warn!(
                payment_id = %form.payment_id,
                order_id = %form.order_id,
                user_id = %actor,
                "Payment signature mismatch"
            );
            return Err(e);
        }

        let activation = self
            .store
            .activate_payment(PaymentCompletion {
                payment_id: form.payment_id,
                user_id: actor,
                order_id: form.order_id,
                gateway_payment_id: form.gateway_payment_id,
                signature: form.signature,
                activated_at: Utc::now(),
            })
            .await?;

        if activation.newly_activated {
            tracing::info!(
                payment_id = %activation.payment.id,
                membership_id = %activation.membership.id,
                user_id = %actor,
                plan = %activation.membership.plan,
                end_date = %activation.membership.end_date,
                "Membership activated"
            );
        } else {
            tracing::info!(
                payment_id = %activation.payment.id,
                "Payment already verified, returning existing membership"
            );
        }

        Ok(activation)
    }
}

fn normalize_currency(currency: Option<&str>) -> Result<String> {
    let currency = currency.map(str::trim).filter(|c| !c.is_empty());
    match currency {
        None => Ok(DEFAULT_CURRENCY.into()),
        Some(c) if c.len() == 3 && c.chars().all(|ch| ch.is_ascii_alphabetic()) => {
            Ok(c.to_ascii_uppercase())
        }
        Some(c) => Err(PaymentError::InvalidAmount(format!("Unsupported currency: {c}"))),
    }
}
