//! Orchestrator-facing probe endpoints.
//!
//! Read-only view over the health store: the response is the status code
//! alone, with an empty body. No input, no side effects.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::health::store::HealthStore;

/// Build the probe-facing router.
pub fn router(store: Arc<HealthStore>) -> Router {
    Router::new()
        .route("/liveness", get(liveness_handler))
        .route("/readiness", get(readiness_handler))
        .with_state(store)
        .layer(TraceLayer::new_for_http())
}

async fn liveness_handler(State(store): State<Arc<HealthStore>>) -> StatusCode {
    store.liveness().as_http()
}

async fn readiness_handler(State(store): State<Arc<HealthStore>>) -> StatusCode {
    store.readiness().as_http()
}
