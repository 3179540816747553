//! Storage
//!
//! The `GymStore` trait is the single point of shared mutation. Every
//! implementation must apply `activate_payment` as one atomic unit: the
//! payment update and the membership insert either both happen or neither.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{GymError, Result};
use crate::ids::{PaymentId, UserId};
use crate::model::{Contact, Membership, NewContact, NewPayment, NewUser, Payment, User};

/// Gateway completion data for a payment, already signature-checked
#[derive(Clone, Debug)]
pub struct PaymentCompletion {
    pub payment_id: PaymentId,
    /// The authenticated caller; must own the payment
    pub user_id: UserId,
    pub order_id: String,
    pub gateway_payment_id: String,
    pub signature: String,
    pub activated_at: DateTime<Utc>,
}

/// Outcome of `activate_payment`
#[derive(Clone, Debug)]
pub struct Activation {
    pub payment: Payment,
    pub membership: Membership,
    /// False when the completion had already been applied earlier
    pub newly_activated: bool,
}

/// What `activate_payment` should do with a payment it has located
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CompletionCheck {
    /// Still `created`: apply the transition
    Apply,
    /// Already `paid` by this same gateway payment: return what exists
    AlreadyApplied,
}

/// Decide how a completion applies to the stored payment.
///
/// Ownership is checked by the caller's lookup; this covers the rest.
pub fn check_completion(payment: &Payment, completion: &PaymentCompletion) -> Result<CompletionCheck> {
    if payment.order_id != completion.order_id {
        return Err(GymError::OrderMismatch {
            payment_id: payment.id.to_string(),
            expected: payment.order_id.clone(),
            actual: completion.order_id.clone(),
        });
    }

    if !payment.is_paid() {
        return Ok(CompletionCheck::Apply);
    }

    if payment.gateway_payment_id.as_deref() == Some(completion.gateway_payment_id.as_str()) {
        Ok(CompletionCheck::AlreadyApplied)
    } else {
        Err(GymError::AlreadyCompleted(payment.id.to_string()))
    }
}

/// Persistent store for users, payments, memberships and contacts
#[async_trait]
pub trait GymStore: Send + Sync {
    /// Insert a user; fails with `DuplicateAccount` on a taken email or phone
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Find a user by email or phone
    async fn find_user_by_login(&self, email_or_phone: &str) -> Result<Option<User>>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>>;

    /// Record a payment attempt in status `created`
    async fn create_payment(&self, payment: NewPayment) -> Result<Payment>;

    /// Get a payment only if `owner` owns it
    async fn get_payment(&self, id: PaymentId, owner: UserId) -> Result<Option<Payment>>;

    /// A user's payments, newest first
    async fn list_payments(&self, owner: UserId) -> Result<Vec<Payment>>;

    /// Mark the payment paid and derive its membership, atomically and idempotently.
    ///
    /// Fails with `NotFound` when the payment does not exist or is not owned
    /// by `completion.user_id`.
    async fn activate_payment(&self, completion: PaymentCompletion) -> Result<Activation>;

    /// A user's memberships, newest first
    async fn list_memberships(&self, owner: UserId) -> Result<Vec<Membership>>;

    async fn create_contact(&self, contact: NewContact) -> Result<Contact>;

    /// All contact submissions, newest first
    async fn list_contacts(&self) -> Result<Vec<Contact>>;

    /// Check if the store is reachable
    async fn health_check(&self) -> bool;

    /// Store name
    fn name(&self) -> &str;
}

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    payments: HashMap<PaymentId, Payment>,
    memberships: Vec<Membership>,
    contacts: Vec<Contact>,
}

/// In-memory store (for development/testing)
///
/// A single lock over all tables makes every operation atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GymStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;

        if tables.users.values().any(|u| u.email == user.email) {
            return Err(GymError::DuplicateAccount("email"));
        }
        if tables.users.values().any(|u| u.phone == user.phone) {
            return Err(GymError::DuplicateAccount("phone"));
        }

        let user = user.into_user(Utc::now());
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user_by_login(&self, email_or_phone: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.matches_login(email_or_phone))
            .cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment> {
        let payment = payment.into_payment(Utc::now());
        self.tables
            .write()
            .await
            .payments
            .insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn get_payment(&self, id: PaymentId, owner: UserId) -> Result<Option<Payment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .payments
            .get(&id)
            .filter(|p| p.user_id == owner)
            .cloned())
    }

    async fn list_payments(&self, owner: UserId) -> Result<Vec<Payment>> {
        let tables = self.tables.read().await;
        let mut result: Vec<_> = tables
            .payments
            .values()
            .filter(|p| p.user_id == owner)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn activate_payment(&self, completion: PaymentCompletion) -> Result<Activation> {
        let mut tables = self.tables.write().await;
        let Tables {
            payments,
            memberships,
            ..
        } = &mut *tables;

        let payment = payments
            .get_mut(&completion.payment_id)
            .filter(|p| p.user_id == completion.user_id)
            .ok_or_else(|| GymError::NotFound(format!("payment {}", completion.payment_id)))?;

        match check_completion(payment, &completion)? {
            CompletionCheck::AlreadyApplied => {
                let membership = memberships
                    .iter()
                    .find(|m| m.payment_id == payment.id)
                    .cloned()
                    .ok_or_else(|| {
                        GymError::Storage(format!("paid payment {} has no membership", payment.id))
                    })?;
                Ok(Activation {
                    payment: payment.clone(),
                    membership,
                    newly_activated: false,
                })
            }
            CompletionCheck::Apply => {
                let mut paid = payment.clone();
                paid.mark_paid(
                    &completion.gateway_payment_id,
                    &completion.signature,
                    completion.activated_at,
                );
                let membership = Membership::activate(&paid, completion.activated_at)
                    .ok_or_else(|| GymError::Other("payment not paid after completion".into()))?;

                *payment = paid.clone();
                memberships.push(membership.clone());

                Ok(Activation {
                    payment: paid,
                    membership,
                    newly_activated: true,
                })
            }
        }
    }

    async fn list_memberships(&self, owner: UserId) -> Result<Vec<Membership>> {
        let tables = self.tables.read().await;
        let mut result: Vec<_> = tables
            .memberships
            .iter()
            .rev()
            .filter(|m| m.user_id == owner)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(result)
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact> {
        let contact = contact.into_contact(Utc::now());
        self.tables.write().await.contacts.push(contact.clone());
        Ok(contact)
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>> {
        let tables = self.tables.read().await;
        // Insertion order breaks timestamp ties.
        let mut result: Vec<_> = tables.contacts.iter().rev().cloned().collect();
        result.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(result)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "memory"
    }
}
