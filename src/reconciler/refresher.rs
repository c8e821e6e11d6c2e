use std::path::PathBuf;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::proc_loader::file_to_config;
use crate::observability::metrics::{get_metrics, RESULT_CONFIG_FAILURE};
use crate::reconciler::reconcile::Reconciler;

/// Periodically reloads the config file and reconciles the store against it.
pub struct Refresher {
    config_path: PathBuf,
    interval: Duration,
    reconciler: Reconciler,
}

impl Refresher {
    /// `interval` comes from the config loaded at startup.
    pub fn new(config_path: impl Into<PathBuf>, interval: Duration, reconciler: Reconciler) -> Self {
        Self { config_path: config_path.into(), interval, reconciler }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// One refresh attempt. Returns the interval to wait before the next one.
    ///
    /// A config that fails to load keeps the previous interval; a config that
    /// loads sets the interval even when its token files fail to reconcile.
    pub async fn tick(&mut self) -> Duration {
        info!("refreshing config and tokens");
        let config = match file_to_config(&self.config_path).await {
            Ok(config) => config,
            Err(e) => {
                get_metrics().reconcile_runs.with_label_values(&[RESULT_CONFIG_FAILURE]).inc();
                warn!("unable to refresh config file: {}", e);
                return self.interval;
            }
        };

        self.interval = config.check_interval();
        if let Err(e) = self.reconciler.reconcile(&config.tokens).await {
            error!("unable to refresh tokens: {}", e);
        }
        self.interval
    }

    /// Run until `shutdown` flips to `true` or its sender is dropped.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> Reconciler {
        info!("config refresher started, interval {:?}", self.interval);
        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = sleep(self.interval) => {
                    let next = self.tick().await;
                    info!("next refresh in {:?}", next);
                }
            }
        }
        info!("config refresher stopping");
        self.reconciler
    }
}
