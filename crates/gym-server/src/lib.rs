//! Gym Membership HTTP Server
//!
//! Axum router exposing registration and login, bearer-protected payment
//! endpoints (order creation and signature verification), membership and
//! payment listings, and the public contact form.

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use crate::config::{AuthConfig, ServerConfig};
pub use crate::error::ApiError;
pub use crate::state::AppState;

use crate::handlers::{
    create_contact, create_order, health_check, list_contacts, list_memberships, list_payments,
    list_plans, login, profile, register, root, verify_payment,
};

/// Build the API router with CORS and request tracing
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/plans", get(list_plans))

        // Contact form
        .route("/api/contact", post(create_contact))
        .route("/api/contacts", get(list_contacts))

        // Accounts
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/user/profile", get(profile))

        // Payments & memberships
        .route("/api/payment/order", post(create_order))
        .route("/api/payment/verify", post(verify_payment))
        .route("/api/memberships", get(list_memberships))
        .route("/api/payments", get(list_payments))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
