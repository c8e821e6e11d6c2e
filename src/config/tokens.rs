use serde::Deserialize;
use std::time::Duration;

use crate::config::settings::SettingsConfig;
use crate::utils::constants::DEFAULT_CHECK_INTERVAL_MINUTES;

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Non-positive or missing values fall back to the default interval.
    #[serde(default)]
    pub check_interval_minutes: i64,
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
    #[serde(default)]
    pub settings: SettingsConfig,
}

impl ServiceConfig {
    pub fn check_interval(&self) -> Duration {
        let minutes = if self.check_interval_minutes > 0 {
            self.check_interval_minutes as u64
        } else {
            DEFAULT_CHECK_INTERVAL_MINUTES
        };
        Duration::from_secs(minutes.saturating_mul(60))
    }
}

/// ================================
/// Tokens
/// ================================
/// Desired state for a single token: where its secret lives on disk.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct TokenConfig {
    pub name: String,
    pub path: String,
}

impl TokenConfig {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self { name: name.into(), path: path.into() }
    }
}
