//! Server Configuration
//!
//! Everything is read from the environment (after `.env` is loaded).

use std::path::PathBuf;

use gym_payments::RazorpayConfig;

const DEV_JWT_SECRET: &str = "dev-only-jwt-secret-change-me";

/// Bearer token settings
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig").finish_non_exhaustive()
    }
}

/// Server configuration
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address
    pub bind_addr: String,

    pub auth: AuthConfig,

    /// PostgreSQL URL (None = in-memory store)
    pub database_url: Option<String>,

    /// Gateway credentials (None = payments disabled)
    pub razorpay: Option<RazorpayConfig>,

    /// Front-end files served for unmatched paths
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:5000".into());

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("⚠ JWT_SECRET not set - using an insecure development secret");
            DEV_JWT_SECRET.into()
        });

        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let razorpay = match RazorpayConfig::from_env() {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::debug!("Razorpay not configured: {}", e);
                None
            }
        };

        let static_dir = std::env::var("STATIC_DIR").ok().map(PathBuf::from);

        Self {
            bind_addr,
            auth: AuthConfig { jwt_secret },
            database_url,
            razorpay,
            static_dir,
        }
    }
}
