use std::collections::HashMap;

use tokio::time::Instant;
use tracing::{error, info};

use crate::cache::token_store::TokenStore;
use crate::config::tokens::TokenConfig;
use crate::error::{Result, TokenError};
use crate::helpers::time::now_i64;
use crate::observability::metrics::{get_metrics, RESULT_OK, RESULT_READ_FAILURE, RESULT_STORE_FAILURE};

/// Drives the store's mapping toward the configured token set.
///
/// Remembers the names applied by the last successful pass so that tokens
/// dropped from the config are deleted on the next one.
pub struct Reconciler {
    store: TokenStore,
    tracked: Vec<String>,
}

impl Reconciler {
    pub fn new(store: TokenStore) -> Self {
        Self { store, tracked: Vec::new() }
    }

    pub fn store(&self) -> &TokenStore {
        &self.store
    }

    /// Names applied by the last successful pass, in config order.
    pub fn tracked(&self) -> &[String] {
        &self.tracked
    }

    /// Apply one reconciliation pass.
    ///
    /// Files are read and applied in order. The first failure aborts the
    /// pass: updates already issued stay applied, no deletions happen and
    /// the tracked set is left as it was.
    pub async fn reconcile(&mut self, desired: &[TokenConfig]) -> Result<()> {
        let metrics = get_metrics();
        let start = Instant::now();

        let result = self.apply(desired).await;
        metrics.reconcile_duration.observe(start.elapsed().as_secs_f64());

        match &result {
            Ok(()) => {
                metrics.reconcile_runs.with_label_values(&[RESULT_OK]).inc();
                metrics.last_successful_reconcile_unix.set(now_i64());
                info!("reconciled {} tokens", self.tracked.len());
            }
            Err(TokenError::ReadFailure { name, .. }) => {
                metrics.reconcile_runs.with_label_values(&[RESULT_READ_FAILURE]).inc();
                metrics.token_file_read_failures.with_label_values(&[name.as_str()]).inc();
            }
            Err(e) => {
                metrics.reconcile_runs.with_label_values(&[RESULT_STORE_FAILURE]).inc();
                error!("reconcile aborted: {}", e);
            }
        }
        result
    }

    async fn apply(&mut self, desired: &[TokenConfig]) -> Result<()> {
        let mut seen: HashMap<&str, bool> =
            self.tracked.iter().map(|name| (name.as_str(), false)).collect();

        for token in desired {
            let data = tokio::fs::read_to_string(&token.path).await.map_err(|source| {
                error!("unable to read token '{}' from '{}': {}", token.name, token.path, source);
                TokenError::ReadFailure {
                    name: token.name.clone(),
                    path: token.path.clone(),
                    source,
                }
            })?;
            self.store.update(&token.name, data.trim()).await?;
            seen.insert(token.name.as_str(), true);
        }

        for name in &self.tracked {
            if seen.get(name.as_str()) == Some(&false) {
                info!("token '{}' no longer configured, removing", name);
                self.store.delete(name).await?;
            }
        }

        let mut next: Vec<String> = Vec::with_capacity(desired.len());
        for token in desired {
            if !next.contains(&token.name) {
                next.push(token.name.clone());
            }
        }
        self.tracked = next;
        Ok(())
    }
}
