//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub module: String,
    pub version: String,
    pub variant: String,
    pub lookup_backend: String,
    pub billing_backend: String,
}

/// GET /health
///
/// No session required.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        module: "moodtunes-web".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        variant: state.config.variant.to_string(),
        lookup_backend: state.flows.backend_name().to_string(),
        billing_backend: state.session.billing().backend_name().to_string(),
    })
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
