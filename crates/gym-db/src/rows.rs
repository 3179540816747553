//! Row types and their conversion into domain models.

use chrono::{DateTime, Utc};
use gym_core::{
    Contact, ContactId, GymError, Membership, MembershipId, Payment, PaymentId, Plan, User, UserId,
};
use rust_decimal::Decimal;
use uuid::Uuid;

pub const USER_COLUMNS: &str = "id, name, email, phone, password_hash, created_at";

pub const PAYMENT_COLUMNS: &str = "id, user_id, name, email, phone, plan, amount, currency, \
    receipt, order_id, gateway_payment_id, signature, status, payment_method, created_at, updated_at";

pub const MEMBERSHIP_COLUMNS: &str =
    "id, user_id, plan, amount, start_date, end_date, status, payment_id";

pub const CONTACT_COLUMNS: &str = "id, name, email, phone, message, date";

fn parse_plan(value: &str) -> Result<Plan, GymError> {
    value
        .parse()
        .map_err(|_| GymError::Storage(format!("unknown plan '{value}' in database")))
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PaymentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub plan: String,
    pub amount: Decimal,
    pub currency: String,
    pub receipt: String,
    pub order_id: String,
    pub gateway_payment_id: Option<String>,
    pub signature: Option<String>,
    pub status: String,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = GymError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: PaymentId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            plan: parse_plan(&row.plan)?,
            amount: row.amount,
            currency: row.currency,
            receipt: row.receipt,
            order_id: row.order_id,
            gateway_payment_id: row.gateway_payment_id,
            signature: row.signature,
            status: row.status.parse()?,
            payment_method: row.payment_method,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MembershipRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub amount: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub status: String,
    pub payment_id: Uuid,
}

impl TryFrom<MembershipRow> for Membership {
    type Error = GymError;

    fn try_from(row: MembershipRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: MembershipId::from_uuid(row.id),
            user_id: UserId::from_uuid(row.user_id),
            plan: parse_plan(&row.plan)?,
            amount: row.amount,
            start_date: row.start_date,
            end_date: row.end_date,
            status: row.status.parse()?,
            payment_id: PaymentId::from_uuid(row.payment_id),
        })
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: String,
    pub date: DateTime<Utc>,
}

impl From<ContactRow> for Contact {
    fn from(row: ContactRow) -> Self {
        Self {
            id: ContactId::from_uuid(row.id),
            name: row.name,
            email: row.email,
            phone: row.phone,
            message: row.message,
            date: row.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gym_core::PaymentStatus;
    use rust_decimal_macros::dec;

    fn payment_row(plan: &str, status: &str) -> PaymentRow {
        let now = Utc::now();
        PaymentRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            plan: plan.into(),
            amount: dec!(999.00),
            currency: "INR".into(),
            receipt: "receipt_1".into(),
            order_id: "order_1".into(),
            gateway_payment_id: None,
            signature: None,
            status: status.into(),
            payment_method: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_payment_row_converts() {
        let payment = Payment::try_from(payment_row("standard", "paid")).unwrap();
        assert_eq!(payment.plan, Plan::Standard);
        assert_eq!(payment.status, PaymentStatus::Paid);
        assert_eq!(payment.amount, dec!(999));
    }

    #[test]
    fn test_corrupt_row_is_storage_error() {
        let bad_plan = Payment::try_from(payment_row("gold", "paid"));
        assert!(matches!(bad_plan, Err(GymError::Storage(_))));

        let bad_status = Payment::try_from(payment_row("basic", "refunded"));
        assert!(matches!(bad_status, Err(GymError::Storage(_))));
    }
}
