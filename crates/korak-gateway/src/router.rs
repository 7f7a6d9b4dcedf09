//! Axum router wiring.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, webhook};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/clerk/webhook", post(webhook::clerk_webhook))
        .route("/api/metrics", get(ops::metrics))
        .route("/metrics", get(ops::metrics))
        .route("/healthz", get(ops::healthz))
        .with_state(state)
}
