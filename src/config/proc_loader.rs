use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, error};

use crate::config::proc_validator;
use crate::config::settings::LoggingConfig;
use crate::config::tokens::ServiceConfig;
use crate::error::{Result, TokenError};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::DEFAULT_CHECK_INTERVAL_MINUTES;

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{(\w+)(?::([^\}]+))?\}").expect("static env var pattern"));

/// Load, default and validate config from a YAML file
pub async fn file_to_config(path: &Path) -> Result<ServiceConfig> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        error!("read config '{}' error: {}", path.display(), e);
        config_load_failure(format!("{}: {}", path.display(), e))
    })?;

    let expanded = expand_env_vars(&content);
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<ServiceConfig> {
    let mut service_config: ServiceConfig = serde_yaml::from_str(content).map_err(|e| {
        error!("parse config error: {}", e);
        config_load_failure(e.to_string())
    })?;

    // Apply defaults
    if service_config.settings.logging.is_none() {
        service_config.settings.logging = Some(LoggingConfig::default());
    }
    if service_config.check_interval_minutes <= 0 {
        service_config.check_interval_minutes = DEFAULT_CHECK_INTERVAL_MINUTES as i64;
    }

    debug!("validating config ...");
    proc_validator::validate_service_config(&service_config)
        .map_err(|errors| config_load_failure(errors.join("; ")))?;

    Ok(service_config)
}

fn config_load_failure(reason: String) -> TokenError {
    get_metrics().config_load_failures.inc();
    TokenError::ConfigLoadFailure(reason)
}

fn expand_env_vars(input: &str) -> String {
    ENV_VAR
        .replace_all(input, |caps: &regex::Captures| {
            let var = &caps[1];
            let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var).unwrap_or_else(|_| default.to_string())
        })
        .to_string()
}
