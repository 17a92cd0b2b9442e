//! Badge print submission.
//!
//! Submission is fire-and-forget: the handler validates, enqueues, and
//! answers with the job id straight away. Callers poll `GET /jobs/{id}`
//! for the outcome.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use hub_core::badge::PrintRequest;
use hub_core::job::JobStatus;
use hub_core::types::JobId;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Response for POST /print.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}

/// POST /print
///
/// Validates the badge request and queues it. Returns `400` for invalid
/// requests (nothing is queued) and `503` when the queue is full.
pub async fn submit_print_job(
    State(state): State<AppState>,
    body: Result<Json<PrintRequest>, JsonRejection>,
) -> AppResult<Json<SubmitResponse>> {
    let Json(request) = body.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let payload = request.into_payload().inspect_err(|e| {
        tracing::info!(error = %e, "Rejected print request");
    })?;

    let job = state.queue.submit(payload).await?;

    Ok(Json(SubmitResponse {
        job_id: job.id,
        status: job.status,
    }))
}
