//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;
use tasklist_core::cache::CacheService;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    store: String,
    cache: CacheHealth,
}

#[derive(Serialize)]
struct CacheHealth {
    provider: String,
    enabled: bool,
    healthy: bool,
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = match state.store().ping().await {
        Ok(()) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Store health check failed");
            "unavailable"
        }
    };

    let cache = state.cache();
    let healthy = cache.health_check().await.unwrap_or(false);

    Json(HealthResponse {
        status: if store == "ok" { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: store.to_string(),
        cache: CacheHealth {
            provider: cache.provider_name().to_string(),
            enabled: cache.is_enabled(),
            healthy,
        },
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
