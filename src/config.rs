// =============================================================================
// Dashboard Configuration — deployment settings with serde defaults
// =============================================================================
//
// Nothing here changes what a single dashboard request does; these are the
// knobs an operator needs to run the server (listen address, provider URL,
// transport timeout). Every field carries `#[serde(default)]` so a partial or
// missing config file still loads. Environment variables override the file.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::types::Indicator;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:8050".to_string()
}

fn default_provider_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_session_cookie_url() -> String {
    "https://fc.yahoo.com".to_string()
}

fn default_user_agent() -> String {
    concat!("svf-dashboard/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_indicators() -> Vec<Indicator> {
    vec![Indicator::Close]
}

// =============================================================================
// DashboardConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the market-data provider.
    #[serde(default = "default_provider_base_url")]
    pub provider_base_url: String,

    /// Page that hands out the session cookie quoteSummary requires.
    #[serde(default = "default_session_cookie_url")]
    pub session_cookie_url: String,

    /// Whole-request timeout for provider calls. `None` leaves it to the
    /// transport.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// User-Agent sent to the provider.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Indicators preselected in the form.
    #[serde(default = "default_indicators")]
    pub default_indicators: Vec<Indicator>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            provider_base_url: default_provider_base_url(),
            session_cookie_url: default_session_cookie_url(),
            request_timeout_secs: None,
            user_agent: default_user_agent(),
            default_indicators: default_indicators(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        info!(
            path = %path.display(),
            bind_addr = %config.bind_addr,
            provider = %config.provider_base_url,
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Apply `SVF_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("SVF_BIND_ADDR").filter(|s| !s.trim().is_empty()) {
            self.bind_addr = addr.trim().to_string();
        }
        if let Some(url) = lookup("SVF_PROVIDER_URL").filter(|s| !s.trim().is_empty()) {
            self.provider_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup("SVF_REQUEST_TIMEOUT_SECS") {
            match raw.trim().parse::<u64>() {
                Ok(0) => self.request_timeout_secs = None,
                Ok(secs) => self.request_timeout_secs = Some(secs),
                Err(e) => warn!(value = %raw, error = %e, "ignoring invalid SVF_REQUEST_TIMEOUT_SECS"),
            }
        }
    }
}
