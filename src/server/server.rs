use anyhow::Result;
use axum::Router;
use tokio::sync::watch;
use tracing::info;

use crate::cache::token_store::TokenStore;
use crate::config::settings::SettingsConfig;
use crate::observability::metrics::{get_metrics, Metrics};
use crate::observability::routes::MetricsState;
use crate::server::routes;

#[derive(Clone)]
pub struct AppState {
    pub metrics_state: MetricsState,
    pub store: TokenStore,
}

impl AppState {
    pub fn new(metrics: &Metrics, store: TokenStore) -> Self {
        Self {
            metrics_state: MetricsState::new(metrics.registry.clone()),
            store,
        }
    }
}

pub fn router(settings_config: &SettingsConfig, store: TokenStore) -> Router {
    let state = AppState::new(get_metrics(), store);

    Router::new()
        .merge(state.metrics_state.router(&settings_config.metrics))
        .merge(routes::router())
        .with_state(state)
}

/// Serve token lookups until `shutdown` flips to `true`.
pub async fn start(
    settings_config: &SettingsConfig,
    store: TokenStore,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let app = router(settings_config, store);

    let bind_addr = &settings_config.server.host;
    let port = settings_config.server.port;
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", bind_addr, port)).await?;
    info!("listening for HTTP requests on {}:{}", bind_addr, port);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.wait_for(|stop| *stop).await;
        })
        .await?;

    info!("HTTP server stopped");
    Ok(())
}
