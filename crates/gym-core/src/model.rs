//! Domain Models
//!
//! Users, payments, memberships and contact submissions.
//! Uses `rust_decimal` for all monetary values.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::GymError;
use crate::ids::{ContactId, MembershipId, PaymentId, UserId};
use crate::plan::Plan;

/// Every membership runs for this many days, whatever the plan.
pub const MEMBERSHIP_DURATION_DAYS: i64 = 30;

/// A registered user
#[derive(Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// PHC-format salted hash, never the password itself
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Public view without the password hash
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            created_at: self.created_at,
        }
    }

    /// True if `login` is this user's email or phone
    pub fn matches_login(&self, login: &str) -> bool {
        self.email == login || self.phone == login
    }
}

/// User data safe to return to clients
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

/// Registration data, password already hashed
#[derive(Clone, Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
}

impl NewUser {
    pub fn into_user(self, created_at: DateTime<Utc>) -> User {
        User {
            id: UserId::new(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            password_hash: self.password_hash,
            created_at,
        }
    }
}

/// Payment lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Created,
    Paid,
}

impl PaymentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Created => "created",
            PaymentStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(PaymentStatus::Created),
            "paid" => Ok(PaymentStatus::Paid),
            other => Err(GymError::Storage(format!("unknown payment status '{other}'"))),
        }
    }
}

/// One payment attempt against the gateway
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plan: Plan,
    /// Major currency units (rupees)
    pub amount: Decimal,
    pub currency: String,
    pub receipt: String,
    /// Gateway order id
    pub order_id: String,
    /// Gateway payment id, set on completion
    pub gateway_payment_id: Option<String>,
    /// Gateway signature, set on completion
    pub signature: Option<String>,
    pub status: PaymentStatus,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_paid(&self) -> bool {
        self.status == PaymentStatus::Paid
    }

    /// Record the gateway's completion data and mark the payment paid
    pub fn mark_paid(&mut self, gateway_payment_id: &str, signature: &str, at: DateTime<Utc>) {
        self.gateway_payment_id = Some(gateway_payment_id.to_string());
        self.signature = Some(signature.to_string());
        self.status = PaymentStatus::Paid;
        self.updated_at = at;
    }
}

/// A payment about to be recorded, after the gateway order exists
#[derive(Clone, Debug)]
pub struct NewPayment {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plan: Plan,
    pub amount: Decimal,
    pub currency: String,
    pub receipt: String,
    pub order_id: String,
    pub payment_method: Option<String>,
}

impl NewPayment {
    pub fn into_payment(self, created_at: DateTime<Utc>) -> Payment {
        Payment {
            id: PaymentId::new(),
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            plan: self.plan,
            amount: self.amount,
            currency: self.currency,
            receipt: self.receipt,
            order_id: self.order_id,
            gateway_payment_id: None,
            signature: None,
            status: PaymentStatus::Created,
            payment_method: self.payment_method,
            created_at,
            updated_at: created_at,
        }
    }
}

/// Membership lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
}

impl MembershipStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MembershipStatus::Active => "active",
        }
    }
}

impl FromStr for MembershipStatus {
    type Err = GymError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MembershipStatus::Active),
            other => Err(GymError::Storage(format!("unknown membership status '{other}'"))),
        }
    }
}

/// An entitlement period, derived from exactly one paid payment
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    pub id: MembershipId,
    pub user_id: UserId,
    pub plan: Plan,
    pub amount: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: MembershipStatus,
    /// The payment this membership was activated from
    pub payment_id: PaymentId,
}

impl Membership {
    /// Derive the membership for a paid payment.
    ///
    /// Returns `None` while the payment is still unpaid.
    pub fn activate(payment: &Payment, activated_at: DateTime<Utc>) -> Option<Self> {
        if !payment.is_paid() {
            return None;
        }

        Some(Self {
            id: MembershipId::new(),
            user_id: payment.user_id,
            plan: payment.plan,
            amount: payment.amount,
            start_date: activated_at,
            end_date: activated_at + Duration::days(MEMBERSHIP_DURATION_DAYS),
            status: MembershipStatus::Active,
            payment_id: payment.id,
        })
    }
}

/// A contact form submission
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub date: DateTime<Utc>,
}

/// Contact form fields as submitted
#[derive(Clone, Debug, Default, Deserialize)]
pub struct NewContact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

impl NewContact {
    pub fn into_contact(self, date: DateTime<Utc>) -> Contact {
        Contact {
            id: ContactId::new(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            message: self.message,
            date,
        }
    }
}
