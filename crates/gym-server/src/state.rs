//! Application State

use std::sync::Arc;

use gym_core::GymStore;
use gym_payments::PaymentLedger;

use crate::config::AuthConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Users, payments, memberships and contacts
    pub store: Arc<dyn GymStore>,

    /// Payment ledger (optional - None if the gateway is not configured)
    pub ledger: Option<Arc<PaymentLedger>>,

    /// Bearer token settings
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn GymStore>,
        ledger: Option<Arc<PaymentLedger>>,
        auth: AuthConfig,
    ) -> Self {
        Self {
            store,
            ledger,
            auth: Arc::new(auth),
        }
    }
}
