// =============================================================================
// Application State — shared, read-only after startup
// =============================================================================
//
// Handlers receive `Arc<AppState>`. Nothing in here is mutable: every
// dashboard update is computed from the request alone, with no per-session
// bookkeeping.
// =============================================================================

use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::provider::MarketDataProvider;

pub struct AppState {
    pub config: DashboardConfig,
    pub provider: Arc<dyn MarketDataProvider>,
}

impl AppState {
    pub fn new(config: DashboardConfig, provider: Arc<dyn MarketDataProvider>) -> Self {
        Self { config, provider }
    }
}
