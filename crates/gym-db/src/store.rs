//! PostgreSQL implementation of `GymStore`.

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use gym_core::store::{check_completion, CompletionCheck};
use gym_core::{
    Activation, Contact, GymError, GymStore, Membership, NewContact, NewPayment, NewUser, Payment,
    PaymentCompletion, PaymentId, Result, User, UserId,
};
use sqlx::{PgPool, Postgres, Transaction};

use crate::rows::{
    ContactRow, MembershipRow, PaymentRow, UserRow, CONTACT_COLUMNS, MEMBERSHIP_COLUMNS,
    PAYMENT_COLUMNS, USER_COLUMNS,
};

/// Map a failed user insert, surfacing unique-constraint hits
fn user_insert_error(err: sqlx::Error) -> GymError {
    if let Some(db_err) = err.as_database_error() {
        match db_err.constraint() {
            Some("users_email_key") => return GymError::DuplicateAccount("email"),
            Some("users_phone_key") => return GymError::DuplicateAccount("phone"),
            _ => {}
        }
    }
    GymError::Storage(format!("Failed to create user: {err}"))
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn membership_for_payment(
        tx: &mut Transaction<'_, Postgres>,
        payment_id: PaymentId,
    ) -> Result<Membership> {
        let row = sqlx::query_as::<_, MembershipRow>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships WHERE payment_id = $1"
        ))
        .bind(payment_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .context("Failed to get membership by payment")?;

        row.ok_or_else(|| GymError::Storage(format!("paid payment {payment_id} has no membership")))?
            .try_into()
    }
}

#[async_trait]
impl GymStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let user = user.into_user(Utc::now());
        sqlx::query(
            "INSERT INTO users (id, name, email, phone, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(user_insert_error)?;
        Ok(user)
    }

    async fn find_user_by_login(&self, email_or_phone: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 OR phone = $1 LIMIT 1"
        ))
        .bind(email_or_phone)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find user by login")?;
        Ok(row.map(User::from))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get user by id")?;
        Ok(row.map(User::from))
    }

    async fn create_payment(&self, payment: NewPayment) -> Result<Payment> {
        let payment = payment.into_payment(Utc::now());
        sqlx::query(
            "INSERT INTO payments (id, user_id, name, email, phone, plan, amount, currency, \
             receipt, order_id, status, payment_method, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(payment.id.as_uuid())
        .bind(payment.user_id.as_uuid())
        .bind(&payment.name)
        .bind(&payment.email)
        .bind(&payment.phone)
        .bind(payment.plan.as_str())
        .bind(payment.amount)
        .bind(&payment.currency)
        .bind(&payment.receipt)
        .bind(&payment.order_id)
        .bind(payment.status.as_str())
        .bind(payment.payment_method.as_deref())
        .bind(payment.created_at)
        .bind(payment.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to create payment")?;
        Ok(payment)
    }

    async fn get_payment(&self, id: PaymentId, owner: UserId) -> Result<Option<Payment>> {
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.as_uuid())
        .bind(owner.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to get payment")?;
        row.map(Payment::try_from).transpose()
    }

    async fn list_payments(&self, owner: UserId) -> Result<Vec<Payment>> {
        let rows = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list payments")?;
        rows.into_iter().map(Payment::try_from).collect()
    }

    async fn activate_payment(&self, completion: PaymentCompletion) -> Result<Activation> {
        let mut tx = self.pool.begin().await.context("Failed to begin transaction")?;

        // Row lock serialises concurrent verifications of the same payment.
        let row = sqlx::query_as::<_, PaymentRow>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1 AND user_id = $2 FOR UPDATE"
        ))
        .bind(completion.payment_id.as_uuid())
        .bind(completion.user_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to lock payment")?;

        let payment = Payment::try_from(
            row.ok_or_else(|| GymError::NotFound(format!("payment {}", completion.payment_id)))?,
        )?;

        match check_completion(&payment, &completion)? {
            CompletionCheck::AlreadyApplied => {
                let membership = Self::membership_for_payment(&mut tx, payment.id).await?;
                tx.commit().await.context("Failed to commit transaction")?;
                Ok(Activation {
                    payment,
                    membership,
                    newly_activated: false,
                })
            }
            CompletionCheck::Apply => {
                let mut paid = payment;
                paid.mark_paid(
                    &completion.gateway_payment_id,
                    &completion.signature,
                    completion.activated_at,
                );
                let membership = Membership::activate(&paid, completion.activated_at)
                    .ok_or_else(|| GymError::Other("payment not paid after completion".into()))?;

                sqlx::query(
                    "UPDATE payments SET gateway_payment_id = $2, signature = $3, status = $4, \
                     updated_at = $5 WHERE id = $1",
                )
                .bind(paid.id.as_uuid())
                .bind(paid.gateway_payment_id.as_deref())
                .bind(paid.signature.as_deref())
                .bind(paid.status.as_str())
                .bind(paid.updated_at)
                .execute(&mut *tx)
                .await
                .context("Failed to mark payment paid")?;

                sqlx::query(
                    "INSERT INTO memberships (id, user_id, plan, amount, start_date, end_date, \
                     status, payment_id) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
                )
                .bind(membership.id.as_uuid())
                .bind(membership.user_id.as_uuid())
                .bind(membership.plan.as_str())
                .bind(membership.amount)
                .bind(membership.start_date)
                .bind(membership.end_date)
                .bind(membership.status.as_str())
                .bind(membership.payment_id.as_uuid())
                .execute(&mut *tx)
                .await
                .context("Failed to insert membership")?;

                tx.commit().await.context("Failed to commit transaction")?;

                Ok(Activation {
                    payment: paid,
                    membership,
                    newly_activated: true,
                })
            }
        }
    }

    async fn list_memberships(&self, owner: UserId) -> Result<Vec<Membership>> {
        let rows = sqlx::query_as::<_, MembershipRow>(&format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships WHERE user_id = $1 ORDER BY start_date DESC"
        ))
        .bind(owner.as_uuid())
        .fetch_all(&self.pool)
        .await
        .context("Failed to list memberships")?;
        rows.into_iter().map(Membership::try_from).collect()
    }

    async fn create_contact(&self, contact: NewContact) -> Result<Contact> {
        let contact = contact.into_contact(Utc::now());
        sqlx::query(
            "INSERT INTO contacts (id, name, email, phone, message, date) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(contact.id.as_uuid())
        .bind(&contact.name)
        .bind(&contact.email)
        .bind(&contact.phone)
        .bind(&contact.message)
        .bind(contact.date)
        .execute(&self.pool)
        .await
        .context("Failed to create contact")?;
        Ok(contact)
    }

    async fn list_contacts(&self) -> Result<Vec<Contact>> {
        let rows = sqlx::query_as::<_, ContactRow>(&format!(
            "SELECT {CONTACT_COLUMNS} FROM contacts ORDER BY date DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list contacts")?;
        Ok(rows.into_iter().map(Contact::from).collect())
    }

    async fn health_check(&self) -> bool {
        match sqlx::query("SELECT 1").execute(&self.pool).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Database health check failed: {}", e);
                false
            }
        }
    }

    fn name(&self) -> &str {
        "postgres"
    }
}
