pub mod health;

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the print agent route tree.
///
/// ```text
/// /print                 submit a badge print job (POST)
/// /jobs                  queue overview and job list (GET)
/// /jobs/{id}             single job status (GET)
/// ```
///
/// `/health` is mounted separately by [`health::router`].
pub fn agent_routes() -> Router<AppState> {
    Router::new()
        .route("/print", post(handlers::print::submit_print_job))
        .route("/jobs", get(handlers::jobs::list_jobs))
        .route("/jobs/{id}", get(handlers::jobs::get_job))
}
