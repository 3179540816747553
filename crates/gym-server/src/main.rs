//! gym-server binary
//!
//! Picks the store and payment gateway from the environment, then serves the
//! API.

use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gym_core::{GymStore, MemoryStore};
use gym_db::{create_pool, run_migrations, PgStore};
use gym_payments::{PaymentGateway, PaymentLedger, RazorpayClient};
use gym_server::{build_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    // Initialize store
    let store: Arc<dyn GymStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            run_migrations(&pool).await?;
            tracing::info!("✓ Connected to PostgreSQL");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("⚠ DATABASE_URL not set - using in-memory store");
            tracing::warn!("  Data is lost when the server stops");
            Arc::new(MemoryStore::new())
        }
    };

    // Initialize payments
    let ledger = match config.razorpay.clone() {
        Some(razorpay) => {
            let gateway: Arc<dyn PaymentGateway> = Arc::new(RazorpayClient::new(razorpay)?);
            tracing::info!("✓ Razorpay configured");
            Some(Arc::new(PaymentLedger::new(store.clone(), gateway)))
        }
        None => {
            tracing::warn!("⚠ Razorpay not configured - payments disabled");
            tracing::warn!("  Set RAZORPAY_KEY_ID and RAZORPAY_SECRET in .env");
            None
        }
    };

    // Build application state
    let state = AppState::new(store, ledger, config.auth.clone());

    let mut app = build_router(state);
    if let Some(dir) = &config.static_dir {
        tracing::info!("Serving static files from {}", dir.display());
        app = app.fallback_service(tower_http::services::ServeDir::new(dir));
    }

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🏋 gym-server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health              - Health check");
    tracing::info!("  GET  /api/plans           - Membership plans");
    tracing::info!("  POST /api/contact         - Submit contact form");
    tracing::info!("  GET  /api/contacts        - List contact submissions");
    tracing::info!("  POST /api/register        - Create account");
    tracing::info!("  POST /api/login           - Get bearer token");
    tracing::info!("  GET  /api/user/profile    - Caller profile");
    tracing::info!("  POST /api/payment/order   - Create payment order");
    tracing::info!("  POST /api/payment/verify  - Verify payment, activate membership");
    tracing::info!("  GET  /api/memberships     - Caller memberships");
    tracing::info!("  GET  /api/payments        - Caller payments");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
