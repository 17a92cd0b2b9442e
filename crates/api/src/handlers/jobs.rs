//! Print job status lookups.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::Json;
use hub_core::error::CoreError;
use hub_core::job::PrintJob;
use hub_core::types::JobId;
use hub_worker::QueueStats;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response for GET /jobs.
#[derive(Debug, Serialize)]
pub struct QueueOverview {
    #[serde(flatten)]
    pub stats: QueueStats,
    /// Known jobs in submission order.
    pub jobs: Vec<PrintJob>,
}

/// GET /jobs
///
/// Queue counters, worker state, and every job still in the status map.
pub async fn list_jobs(State(state): State<AppState>) -> Json<QueueOverview> {
    let stats = state.queue.stats().await;
    let jobs = state.queue.list().await;
    Json(QueueOverview { stats, jobs })
}

/// GET /jobs/{id}
///
/// Current status of one job. `404` once the job is unknown or has been
/// swept by the retention task.
pub async fn get_job(
    State(state): State<AppState>,
    id: Result<Path<JobId>, PathRejection>,
) -> AppResult<Json<PrintJob>> {
    let Path(id) = id.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let job = state.queue.get(id).await.ok_or(CoreError::NotFound {
        entity: "Print job",
        id,
    })?;

    Ok(Json(job))
}
