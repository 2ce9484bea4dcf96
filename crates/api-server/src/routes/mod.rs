//! Route handlers

pub mod health;
pub mod task;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Full application router with request tracing
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(task::router())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
