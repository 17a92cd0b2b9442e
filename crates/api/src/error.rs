use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use hub_core::error::CoreError;
use hub_worker::QueueError;
use serde::Serialize;

/// Errors a handler can return.
///
/// Every variant renders as `{ "error": ..., "code": ... }` with a status
/// derived from its source.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The print queue refused the job.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Malformed body or path parameter.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// No route matched the request path.
    #[error("No route for {0}")]
    UnknownRoute(String),
}

pub type AppResult<T> = Result<T, AppError>;

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error) = match self {
            AppError::Core(err) => classify_core_error(err),
            AppError::Queue(err) => classify_queue_error(err),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            AppError::UnknownRoute(path) => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("No route for {path}"),
            ),
        };

        (status, Json(ErrorBody { error, code })).into_response()
    }
}

/// Domain errors: lookups, validation, and illegal state changes.
fn classify_core_error(err: CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
    }
}

/// Submission failures. Both are temporary from the caller's view.
fn classify_queue_error(err: QueueError) -> (StatusCode, &'static str, String) {
    let code = match err {
        QueueError::Full { .. } => {
            tracing::warn!(error = %err, "Rejecting print job");
            "QUEUE_FULL"
        }
        QueueError::Closed => {
            tracing::error!(error = %err, "Print queue closed");
            "QUEUE_CLOSED"
        }
    };
    (StatusCode::SERVICE_UNAVAILABLE, code, err.to_string())
}
