use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::TokenError;
use crate::observability::metrics::{get_metrics, RESULT_NOT_FOUND, RESULT_OK, RESULT_UNAVAILABLE};
use crate::server::server::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub name: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/tokens/{name}", get(get_token))
}

async fn health(State(state): State<AppState>) -> Response {
    match state.store.len().await {
        Ok(_) => (StatusCode::OK, "ok").into_response(),
        Err(_) => (StatusCode::SERVICE_UNAVAILABLE, "token store not running").into_response(),
    }
}

async fn get_token(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let metrics = get_metrics();
    match state.store.get(&name).await {
        Ok(token) => {
            debug!("serving token '{}'", name);
            metrics.token_requests.with_label_values(&[RESULT_OK]).inc();
            (StatusCode::OK, Json(TokenResponse { name, token })).into_response()
        }
        Err(e @ TokenError::NotFound(_)) => {
            debug!("token '{}' requested but not found", name);
            metrics.token_requests.with_label_values(&[RESULT_NOT_FOUND]).inc();
            error_response(StatusCode::NOT_FOUND, e)
        }
        Err(e) => {
            warn!("token '{}' requested while unavailable: {}", name, e);
            metrics.token_requests.with_label_values(&[RESULT_UNAVAILABLE]).inc();
            error_response(StatusCode::SERVICE_UNAVAILABLE, e)
        }
    }
}

fn error_response(status: StatusCode, e: TokenError) -> Response {
    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}
