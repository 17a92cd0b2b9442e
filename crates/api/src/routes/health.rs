use axum::extract::State;
use axum::{routing::get, Json, Router};
use hub_worker::WorkerState;
use serde::Serialize;

use crate::state::AppState;

/// Liveness probe for the check-in frontend.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// `true` whenever the agent answers at all.
    pub ok: bool,
    pub status: &'static str,
    pub version: &'static str,
    pub worker: WorkerState,
    /// Jobs waiting for the worker.
    pub queue_depth: usize,
}

/// GET /health
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let stats = state.queue.stats().await;

    Json(HealthResponse {
        ok: true,
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        worker: stats.worker,
        queue_depth: stats.depth,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
