use std::path::PathBuf;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::cache::token_store::TokenStore;
use crate::config::tokens::ServiceConfig;
use crate::error::Result;
use crate::reconciler::reconcile::Reconciler;
use crate::reconciler::refresher::Refresher;

/// Everything the background tasks share, owned by whoever starts the service.
pub struct AppContext {
    pub store: TokenStore,
    pub config_path: PathBuf,
    shutdown_tx: watch::Sender<bool>,
    refresher: Option<JoinHandle<Reconciler>>,
}

impl AppContext {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            store: TokenStore::new(),
            config_path: config_path.into(),
            shutdown_tx,
            refresher: None,
        }
    }

    /// Receiver flipped to `true` once shutdown starts.
    pub fn shutdown_signal(&self) -> watch::Receiver<bool> {
        self.shutdown_tx.subscribe()
    }

    /// Start the store, load the initial token set and launch the refresher.
    pub async fn bootstrap(&mut self, config: &ServiceConfig) -> Result<()> {
        info!("starting token store");
        self.store.start().await?;

        info!("loading tokens");
        let mut reconciler = Reconciler::new(self.store.clone());
        reconciler.reconcile(&config.tokens).await?;

        info!("starting config and token refresher");
        let refresher = Refresher::new(self.config_path.clone(), config.check_interval(), reconciler);
        self.refresher = Some(tokio::spawn(refresher.run(self.shutdown_signal())));
        Ok(())
    }

    /// Cancel the refresher and wait for it, returning its reconciler.
    pub async fn stop_refresher(&mut self) -> Option<Reconciler> {
        let _ = self.shutdown_tx.send(true);
        let handle = self.refresher.take()?;
        match handle.await {
            Ok(reconciler) => Some(reconciler),
            Err(e) => {
                error!("config refresher ended abnormally: {}", e);
                None
            }
        }
    }

    /// Cancel the refresher, wait for it and stop the store.
    pub async fn shutdown(mut self) -> Result<()> {
        self.stop_refresher().await;
        self.store.stop().await
    }
}
