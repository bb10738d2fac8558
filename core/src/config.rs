//! Client configuration, read from the environment by hosts that want it.

use std::time::Duration;

use crate::error::ApiError;
use crate::types::BudgetTier;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    /// Tier the host passes to `ResultSetLoader::load`; the loader itself
    /// takes the tier per call.
    pub budget: BudgetTier,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            budget: BudgetTier::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Reads `VENUE_API_BASE_URL`, `VENUE_BUDGET_TIER` and
    /// `VENUE_TIMEOUT_SECS`; unset variables keep their defaults.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let mut config = Self::default();

        if let Some(url) = lookup("VENUE_API_BASE_URL") {
            url::Url::parse(&url).map_err(|e| ApiError::Config {
                key: "VENUE_API_BASE_URL",
                message: e.to_string(),
            })?;
            config.base_url = url;
        }

        if let Some(raw) = lookup("VENUE_BUDGET_TIER") {
            config.budget = raw
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(BudgetTier::new)
                .ok_or_else(|| ApiError::Config {
                    key: "VENUE_BUDGET_TIER",
                    message: format!("expected {}..={}, got {raw:?}", BudgetTier::MIN, BudgetTier::MAX),
                })?;
        }

        if let Some(raw) = lookup("VENUE_TIMEOUT_SECS") {
            let secs = raw.trim().parse::<u64>().map_err(|e| ApiError::Config {
                key: "VENUE_TIMEOUT_SECS",
                message: e.to_string(),
            })?;
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
