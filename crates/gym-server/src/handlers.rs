//! HTTP Handlers

use anyhow::Context;
use axum::{extract::State, http::StatusCode, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gym_core::{
    plan::catalogue, Contact, Membership, NewContact, NewUser, Payment, PaymentId, Plan,
    PlanDetails, UserProfile,
};
use gym_payments::{GatewayOrder, OrderForm, PaymentLedger, VerifyForm};

use crate::auth::{create_access_token, hash_password, verify_password};
use crate::error::ApiError;
use crate::extract::{ApiJson, AuthUser};
use crate::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub store: String,
    pub store_connected: bool,
    pub payments_configured: bool,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

impl MessageResponse {
    const fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
}

impl RegisterRequest {
    fn validate(&self) -> ApiResult<()> {
        for (field, value) in [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(ApiError::Validation(format!("{field} is required")));
            }
        }
        if !self.email.contains('@') {
            return Err(ApiError::Validation("email is not a valid address".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email_or_phone: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub message: &'static str,
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
    pub plan: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub payment_method: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    pub success: bool,
    pub order: GatewayOrder,
    pub payment_id: PaymentId,
    /// Public key the checkout widget needs
    pub key_id: String,
}

/// Callback fields the checkout widget posts back, plus our payment id
#[derive(Debug, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
    #[serde(rename = "paymentId")]
    pub payment_id: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: &'static str,
    pub membership: Membership,
}

#[derive(Debug, Serialize)]
pub struct MembershipsResponse {
    pub success: bool,
    pub memberships: Vec<Membership>,
}

#[derive(Debug, Serialize)]
pub struct PaymentsResponse {
    pub success: bool,
    pub payments: Vec<Payment>,
}

#[derive(Debug, Serialize)]
pub struct PlansResponse {
    pub success: bool,
    pub plans: Vec<PlanDetails>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Plain-text liveness banner
pub async fn root() -> &'static str {
    "Gym Website Backend is running 🚀"
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store_connected = state.store.health_check().await;

    Json(HealthResponse {
        status: if store_connected { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        store: state.store.name().to_string(),
        store_connected,
        payments_configured: state.ledger.is_some(),
    })
}

/// Membership plan catalogue
pub async fn list_plans() -> Json<PlansResponse> {
    Json(PlansResponse {
        success: true,
        plans: catalogue(),
    })
}

/// Store a contact form submission
pub async fn create_contact(
    State(state): State<AppState>,
    ApiJson(contact): ApiJson<NewContact>,
) -> ApiResult<Json<MessageResponse>> {
    let saved = state.store.create_contact(contact).await?;
    tracing::info!(contact_id = %saved.id, "Contact saved");

    Ok(Json(MessageResponse::ok("Contact saved successfully!")))
}

/// All contact submissions, newest first
pub async fn list_contacts(State(state): State<AppState>) -> ApiResult<Json<Vec<Contact>>> {
    Ok(Json(state.store.list_contacts().await?))
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    req.validate()?;

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .context("Password hashing task failed")??;

    let user = state
        .store
        .create_user(NewUser {
            name: req.name.trim().to_string(),
            email: req.email.trim().to_string(),
            phone: req.phone.trim().to_string(),
            password_hash,
        })
        .await?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok("User registered successfully!")),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let login = req.email_or_phone.trim();
    if login.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "emailOrPhone and password are required".into(),
        ));
    }

    let Some(user) = state.store.find_user_by_login(login).await? else {
        tracing::debug!("Login for unknown account");
        return Err(ApiError::InvalidCredentials);
    };

    let password = req.password;
    let hash = user.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .context("Password verification task failed")??;

    if !valid {
        tracing::debug!(user_id = %user.id, "Login with wrong password");
        return Err(ApiError::InvalidCredentials);
    }

    let token = create_access_token(user.id, &user.email, &state.auth.jwt_secret)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        success: true,
        message: "Login successful",
        token,
        user: user.profile(),
    }))
}

/// Caller's own profile
pub async fn profile(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<ProfileResponse>> {
    let found = state
        .store
        .get_user(user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(ProfileResponse {
        success: true,
        user: found.profile(),
    }))
}

fn ledger(state: &AppState) -> ApiResult<&PaymentLedger> {
    state.ledger.as_deref().ok_or(ApiError::PaymentsDisabled)
}

/// Create a gateway order and a pending payment
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateOrderRequest>,
) -> ApiResult<Json<CreateOrderResponse>> {
    let ledger = ledger(&state)?;
    let plan: Plan = req.plan.parse()?;

    let receipt = ledger
        .create_order(
            user.id,
            OrderForm {
                amount: req.amount,
                currency: req.currency,
                receipt: req.receipt,
                plan,
                name: req.name,
                email: req.email,
                phone: req.phone,
                payment_method: req.payment_method,
            },
        )
        .await?;

    Ok(Json(CreateOrderResponse {
        success: true,
        order: receipt.order,
        payment_id: receipt.payment.id,
        key_id: ledger.gateway().key_id().to_string(),
    }))
}

/// Check the gateway signature and activate the membership
pub async fn verify_payment(
    State(state): State<AppState>,
    user: AuthUser,
    ApiJson(req): ApiJson<VerifyPaymentRequest>,
) -> ApiResult<Json<VerifyPaymentResponse>> {
    let ledger = ledger(&state)?;
    let payment_id: PaymentId = req
        .payment_id
        .parse()
        .map_err(|_| ApiError::Validation("paymentId is not a valid id".into()))?;

    let activation = ledger
        .verify_payment(
            user.id,
            VerifyForm {
                order_id: req.razorpay_order_id,
                gateway_payment_id: req.razorpay_payment_id,
                signature: req.razorpay_signature,
                payment_id,
            },
        )
        .await?;

    let message = if activation.newly_activated {
        "Payment verified successfully!"
    } else {
        "Payment already verified"
    };

    Ok(Json(VerifyPaymentResponse {
        success: true,
        message,
        membership: activation.membership,
    }))
}

/// Caller's memberships, newest first
pub async fn list_memberships(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<MembershipsResponse>> {
    let memberships = state.store.list_memberships(user.id).await?;
    Ok(Json(MembershipsResponse {
        success: true,
        memberships,
    }))
}

/// Caller's payments, newest first
pub async fn list_payments(
    State(state): State<AppState>,
    user: AuthUser,
) -> ApiResult<Json<PaymentsResponse>> {
    let payments = state.store.list_payments(user.id).await?;
    Ok(Json(PaymentsResponse {
        success: true,
        payments,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RegisterRequest {
        RegisterRequest {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            phone: "9000000001".into(),
            password: "hunter22".into(),
        }
    }

    #[test]
    fn test_register_validation() {
        assert!(request().validate().is_ok());

        let missing_phone = RegisterRequest {
            phone: "  ".into(),
            ..request()
        };
        let err = missing_phone.validate().unwrap_err();
        assert!(err.user_message().contains("phone"));

        let bad_email = RegisterRequest {
            email: "ana.example.com".into(),
            ..request()
        };
        assert!(matches!(bad_email.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_login_request_field_name() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"emailOrPhone":"ana@example.com","password":"x"}"#).unwrap();
        assert_eq!(req.email_or_phone, "ana@example.com");
    }

    #[test]
    fn test_order_request_accepts_numeric_amount() {
        let req: CreateOrderRequest = serde_json::from_str(
            r#"{"amount":999,"plan":"basic","name":"Ana","email":"a@b.c","phone":"1","paymentMethod":"upi"}"#,
        )
        .unwrap();
        assert_eq!(req.amount, Decimal::from(999));
        assert_eq!(req.payment_method.as_deref(), Some("upi"));
        assert!(req.currency.is_none());
    }
}
