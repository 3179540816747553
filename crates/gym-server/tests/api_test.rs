use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};
use tower::ServiceExt;

use gym_core::{GymStore, MemoryStore, PaymentStatus, UserId};
use gym_payments::{MockGateway, PaymentGateway, PaymentLedger};
use gym_server::auth::create_access_token_at;
use gym_server::{build_router, AppState, AuthConfig};

const JWT_SECRET: &str = "test-jwt-secret";
const GATEWAY_SECRET: &str = "test-gateway-secret";

// ─── Test helpers ───────────────────────────────────────────────────────

struct TestApp {
    router: Router,
    store: Arc<MemoryStore>,
    gateway: Arc<MockGateway>,
}

impl TestApp {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let gateway = Arc::new(MockGateway::new(GATEWAY_SECRET));
        let ledger = PaymentLedger::new(
            store.clone() as Arc<dyn GymStore>,
            gateway.clone() as Arc<dyn PaymentGateway>,
        );
        let state = AppState::new(
            store.clone(),
            Some(Arc::new(ledger)),
            AuthConfig {
                jwt_secret: JWT_SECRET.into(),
            },
        );

        Self {
            router: build_router(state),
            store,
            gateway,
        }
    }

    fn without_payments() -> Self {
        let app = Self::new();
        let state = AppState::new(
            app.store.clone(),
            None,
            AuthConfig {
                jwt_secret: JWT_SECRET.into(),
            },
        );
        Self {
            router: build_router(state),
            ..app
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn register(&self, name: &str, email: &str, phone: &str) -> StatusCode {
        let (status, _) = self
            .send(api_request(
                "POST",
                "/api/register",
                None,
                json!({"name": name, "email": email, "phone": phone, "password": "hunter22"}),
            ))
            .await;
        status
    }

    /// Register and log in, returning the bearer token
    async fn sign_up(&self, name: &str, email: &str, phone: &str) -> String {
        assert_eq!(self.register(name, email, phone).await, StatusCode::CREATED);
        let (status, body) = self
            .send(api_request(
                "POST",
                "/api/login",
                None,
                json!({"emailOrPhone": email, "password": "hunter22"}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_string()
    }

    async fn create_order(&self, token: &str, amount: u32, plan: &str) -> (StatusCode, Value) {
        self.send(api_request(
            "POST",
            "/api/payment/order",
            Some(token),
            json!({
                "amount": amount,
                "plan": plan,
                "name": "Ana",
                "email": "ana@example.com",
                "phone": "9000000001",
                "paymentMethod": "upi",
            }),
        ))
        .await
    }
}

fn api_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn api_get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

fn verify_body(order_id: &str, gateway_payment_id: &str, signature: &str, payment_id: &str) -> Value {
    json!({
        "razorpay_order_id": order_id,
        "razorpay_payment_id": gateway_payment_id,
        "razorpay_signature": signature,
        "paymentId": payment_id,
    })
}

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

fn timestamp(value: &Value) -> DateTime<Utc> {
    value.as_str().unwrap().parse().unwrap()
}

// ─── Accounts ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_register_and_login_with_email_or_phone() -> Result<()> {
    let app = TestApp::new();
    assert_eq!(
        app.register("Ana", "ana@example.com", "9000000001").await,
        StatusCode::CREATED
    );

    for login in ["ana@example.com", "9000000001"] {
        let (status, body) = app
            .send(api_request(
                "POST",
                "/api/login",
                None,
                json!({"emailOrPhone": login, "password": "hunter22"}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert!(body["token"].as_str().is_some());
        assert_eq!(body["user"]["email"], "ana@example.com");
        assert!(body["user"].get("passwordHash").is_none());
    }
    Ok(())
}

#[tokio::test]
async fn test_duplicate_email_or_phone_rejected() -> Result<()> {
    let app = TestApp::new();
    assert_eq!(
        app.register("Ana", "ana@example.com", "9000000001").await,
        StatusCode::CREATED
    );
    assert_eq!(
        app.register("Other", "ana@example.com", "9000000002").await,
        StatusCode::CONFLICT
    );
    assert_eq!(
        app.register("Other", "other@example.com", "9000000001").await,
        StatusCode::CONFLICT
    );

    let (status, body) = app
        .send(api_request(
            "POST",
            "/api/register",
            None,
            json!({"name": "Other", "email": "ana@example.com", "phone": "9000000003", "password": "x"}),
        ))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DUPLICATE_ACCOUNT");
    assert!(body["error"].as_str().unwrap().contains("email"));
    Ok(())
}

#[tokio::test]
async fn test_register_missing_field_is_validation_error() -> Result<()> {
    let app = TestApp::new();
    let (status, body) = app
        .send(api_request(
            "POST",
            "/api/register",
            None,
            json!({"name": "Ana", "email": "ana@example.com", "password": "x"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["success"], false);
    Ok(())
}

#[tokio::test]
async fn test_login_failures() -> Result<()> {
    let app = TestApp::new();
    app.register("Ana", "ana@example.com", "9000000001").await;

    let (status, body) = app
        .send(api_request(
            "POST",
            "/api/login",
            None,
            json!({"emailOrPhone": "ana@example.com", "password": "wrong"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let (status, _) = app
        .send(api_request(
            "POST",
            "/api/login",
            None,
            json!({"emailOrPhone": "nobody@example.com", "password": "hunter22"}),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_profile_requires_token() -> Result<()> {
    let app = TestApp::new();
    let token = app.sign_up("Ana", "ana@example.com", "9000000001").await;

    let (status, body) = app.send(api_get("/api/user/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Ana");
    assert_eq!(body["user"]["phone"], "9000000001");

    let (status, body) = app.send(api_get("/api/user/profile", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "MISSING_TOKEN");

    let (status, body) = app
        .send(api_get("/api/user/profile", Some("not.a.token")))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "INVALID_TOKEN");
    Ok(())
}

#[tokio::test]
async fn test_lowercase_bearer_scheme_accepted() -> Result<()> {
    let app = TestApp::new();
    let token = app.sign_up("Ana", "ana@example.com", "9000000001").await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/user/profile")
        .header(header::AUTHORIZATION, format!("bearer {token}"))
        .body(Body::empty())?;
    let (status, body) = app.send(request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["email"], "ana@example.com");
    Ok(())
}

#[tokio::test]
async fn test_expired_token_rejected() -> Result<()> {
    let app = TestApp::new();
    let issued = Utc::now().timestamp() - 3601;
    let token = create_access_token_at(UserId::new(), "ana@example.com", JWT_SECRET, issued)?;

    let (status, _) = app.send(api_get("/api/memberships", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn test_profile_of_unknown_user_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let token = create_access_token_at(
        UserId::new(),
        "ghost@example.com",
        JWT_SECRET,
        Utc::now().timestamp(),
    )?;

    let (status, body) = app.send(api_get("/api/user/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    Ok(())
}

// ─── Payments ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_order_then_verify_activates_membership() -> Result<()> {
    let app = TestApp::new();
    let token = app.sign_up("Ana", "ana@example.com", "9000000001").await;

    let (status, body) = app.create_order(&token, 999, "basic").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["amount"], 99_900);
    assert_eq!(body["order"]["currency"], "INR");
    assert_eq!(body["keyId"], "rzp_test_mock");
    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    let payment_id = body["paymentId"].as_str().unwrap().to_string();

    let (_, body) = app.send(api_get("/api/payments", Some(&token))).await;
    assert_eq!(body["payments"][0]["status"], "created");

    let (gateway_payment_id, signature) = app.gateway.simulate_checkout(&order_id);
    let (status, body) = app
        .send(api_request(
            "POST",
            "/api/payment/verify",
            Some(&token),
            verify_body(&order_id, &gateway_payment_id, &signature, &payment_id),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let membership = &body["membership"];
    assert_eq!(membership["plan"], "basic");
    assert_eq!(membership["status"], "active");
    assert_eq!(membership["paymentId"], payment_id.as_str());
    assert_eq!(decimal(&membership["amount"]), dec!(999));
    let days = (timestamp(&membership["endDate"]) - timestamp(&membership["startDate"])).num_days();
    assert_eq!(days, 30);

    let (_, body) = app.send(api_get("/api/payments", Some(&token))).await;
    let payments = body["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0]["status"], PaymentStatus::Paid.as_str());
    assert_eq!(payments[0]["gatewayPaymentId"], gateway_payment_id.as_str());

    let (_, body) = app.send(api_get("/api/memberships", Some(&token))).await;
    assert_eq!(body["memberships"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_verify_replay_is_idempotent() -> Result<()> {
    let app = TestApp::new();
    let token = app.sign_up("Ana", "ana@example.com", "9000000001").await;
    let (_, body) = app.create_order(&token, 1999, "standard").await;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    let payment_id = body["paymentId"].as_str().unwrap().to_string();
    let (gateway_payment_id, signature) = app.gateway.simulate_checkout(&order_id);

    let request = || {
        api_request(
            "POST",
            "/api/payment/verify",
            Some(&token),
            verify_body(&order_id, &gateway_payment_id, &signature, &payment_id),
        )
    };
    let (status, first) = app.send(request()).await;
    assert_eq!(status, StatusCode::OK);
    let (status, second) = app.send(request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["membership"]["id"], second["membership"]["id"]);

    let (_, body) = app.send(api_get("/api/memberships", Some(&token))).await;
    assert_eq!(body["memberships"].as_array().unwrap().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_verify_rejects_bad_signature() -> Result<()> {
    let app = TestApp::new();
    let token = app.sign_up("Ana", "ana@example.com", "9000000001").await;
    let (_, body) = app.create_order(&token, 999, "basic").await;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    let payment_id = body["paymentId"].as_str().unwrap().to_string();
    let (gateway_payment_id, _) = app.gateway.simulate_checkout(&order_id);

    let (status, body) = app
        .send(api_request(
            "POST",
            "/api/payment/verify",
            Some(&token),
            verify_body(&order_id, &gateway_payment_id, &"0".repeat(64), &payment_id),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_SIGNATURE");
    assert_eq!(body["retryable"], false);

    let (_, body) = app.send(api_get("/api/memberships", Some(&token))).await;
    assert!(body["memberships"].as_array().unwrap().is_empty());
    let (_, body) = app.send(api_get("/api/payments", Some(&token))).await;
    assert_eq!(body["payments"][0]["status"], "created");
    Ok(())
}

#[tokio::test]
async fn test_verify_foreign_payment_is_not_found() -> Result<()> {
    let app = TestApp::new();
    let owner = app.sign_up("Ana", "ana@example.com", "9000000001").await;
    let intruder = app.sign_up("Bob", "bob@example.com", "9000000002").await;

    let (_, body) = app.create_order(&owner, 999, "basic").await;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    let payment_id = body["paymentId"].as_str().unwrap().to_string();
    let (gateway_payment_id, signature) = app.gateway.simulate_checkout(&order_id);

    let (status, body) = app
        .send(api_request(
            "POST",
            "/api/payment/verify",
            Some(&intruder),
            verify_body(&order_id, &gateway_payment_id, &signature, &payment_id),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");

    let (_, body) = app.send(api_get("/api/payments", Some(&intruder))).await;
    assert!(body["payments"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_verify_with_malformed_payment_id() -> Result<()> {
    let app = TestApp::new();
    let token = app.sign_up("Ana", "ana@example.com", "9000000001").await;

    let (status, body) = app
        .send(api_request(
            "POST",
            "/api/payment/verify",
            Some(&token),
            verify_body("order_1", "pay_1", "abc", "not-an-id"),
        ))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn test_order_rejects_unknown_plan() -> Result<()> {
    let app = TestApp::new();
    let token = app.sign_up("Ana", "ana@example.com", "9000000001").await;

    let (status, body) = app.create_order(&token, 999, "platinum").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn test_gateway_failure_is_generic_500() -> Result<()> {
    let app = TestApp::new();
    let token = app.sign_up("Ana", "ana@example.com", "9000000001").await;
    app.gateway.set_unavailable(true);

    let (status, body) = app.create_order(&token, 999, "basic").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "GATEWAY_ERROR");
    assert!(!body["error"].as_str().unwrap().contains("mock"));
    assert_eq!(body["retryable"], true);

    let (_, body) = app.send(api_get("/api/payments", Some(&token))).await;
    assert!(body["payments"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_payments_disabled_without_gateway() -> Result<()> {
    let app = TestApp::without_payments();
    let token = app.sign_up("Ana", "ana@example.com", "9000000001").await;

    let (status, body) = app.create_order(&token, 999, "basic").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "PAYMENTS_DISABLED");

    let (_, body) = app.send(api_get("/health", None)).await;
    assert_eq!(body["payments_configured"], false);
    Ok(())
}

#[tokio::test]
async fn test_payment_routes_require_token() -> Result<()> {
    let app = TestApp::new();
    let (status, _) = app
        .send(api_request(
            "POST",
            "/api/payment/order",
            None,
            json!({"amount": 999, "plan": "basic"}),
        ))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send(api_get("/api/payments", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    Ok(())
}

// ─── Public endpoints ──────────────────────────────────────────────────

#[tokio::test]
async fn test_contacts_create_and_list() -> Result<()> {
    let app = TestApp::new();
    for name in ["First", "Second"] {
        let (status, body) = app
            .send(api_request(
                "POST",
                "/api/contact",
                None,
                json!({"name": name, "email": "x@example.com", "phone": "1", "message": "hi"}),
            ))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
    }

    let (status, body) = app.send(api_get("/api/contacts", None)).await;
    assert_eq!(status, StatusCode::OK);
    let contacts = body.as_array().unwrap();
    assert_eq!(contacts.len(), 2);
    assert_eq!(contacts[0]["name"], "Second");
    Ok(())
}

#[tokio::test]
async fn test_plans_and_health() -> Result<()> {
    let app = TestApp::new();

    let (status, body) = app.send(api_get("/api/plans", None)).await;
    assert_eq!(status, StatusCode::OK);
    let plans = body["plans"].as_array().unwrap();
    assert_eq!(plans.len(), 3);
    assert_eq!(plans[0]["plan"], "basic");
    assert_eq!(decimal(&plans[0]["monthlyPrice"]), dec!(999));

    let (status, body) = app.send(api_get("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store_connected"], true);
    assert_eq!(body["payments_configured"], true);
    Ok(())
}

#[tokio::test]
async fn test_root_banner() -> Result<()> {
    let app = TestApp::new();
    let response = app.router.clone().oneshot(api_get("/", None)).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await?.to_bytes();
    assert!(String::from_utf8_lossy(&bytes).starts_with("Gym Website Backend is running"));
    Ok(())
}
