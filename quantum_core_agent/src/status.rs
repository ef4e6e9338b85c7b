//! HTTP status endpoint: every GET takes a fresh local sample and returns it as JSON.

use axum::{extract::State, routing::get, Json, Router};
use quantum_core::types::MetricSample;
use tracing::debug;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(status_handler))
        .route("/*path", get(status_handler))
        .with_state(state)
}

pub async fn status_handler(State(state): State<AppState>) -> Json<MetricSample> {
    let sample = state.sampler.lock().await.sample();
    debug!(cpu = sample.cpu, mem = sample.mem, "served sample");
    Json(sample)
}
