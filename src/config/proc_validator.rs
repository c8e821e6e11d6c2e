//! Configuration validation with aggregated errors.
//! - every token has a non-empty name and path
//! - token names are unique
//! - an enabled metrics route does not shadow the token or health routes

use std::collections::HashSet;
use tracing::{error, info};

use crate::config::tokens::ServiceConfig;

const RESERVED_PATHS: [&str; 2] = ["/health", "/tokens"];

/// Returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_service_config(cfg: &ServiceConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();
    let mut names: HashSet<&str> = HashSet::new();

    for (idx, token) in cfg.tokens.iter().enumerate() {
        if token.name.trim().is_empty() {
            errors.push(format!("tokens[{}]: 'name' must not be empty", idx));
        } else if !names.insert(token.name.as_str()) {
            errors.push(format!("tokens[{}]: duplicate token name '{}'", idx, token.name));
        }
        if token.path.trim().is_empty() {
            errors.push(format!("tokens[{}]: 'path' must not be empty", idx));
        }
    }

    validate_metrics_path(cfg, &mut errors);

    if errors.is_empty() {
        info!("config validation passed, {} tokens configured", cfg.tokens.len());
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_metrics_path(cfg: &ServiceConfig, errors: &mut Vec<String>) {
    let metrics = &cfg.settings.metrics;
    if !metrics.path.starts_with('/') {
        errors.push(format!("settings.metrics.path '{}' must start with '/'", metrics.path));
    }
    if !metrics.enabled {
        return;
    }
    if metrics.path.contains('{') || metrics.path.contains('*') {
        errors.push(format!(
            "settings.metrics.path '{}' must be a literal path",
            metrics.path
        ));
    }
    let trimmed = metrics.path.trim_end_matches('/');
    for reserved in RESERVED_PATHS {
        if trimmed == reserved || trimmed.starts_with(&format!("{}/", reserved)) {
            errors.push(format!(
                "settings.metrics.path '{}' collides with the '{}' route",
                metrics.path, reserved
            ));
        }
    }
}
