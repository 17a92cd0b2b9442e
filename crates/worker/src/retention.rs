//! Periodic cleanup of finished print jobs.
//!
//! Finished jobs stay in the status map so the check-in desk can poll
//! them. This loop removes the ones older than the retention window.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::queue::PrintQueue;

/// Default retention for finished jobs: 1 hour.
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(3600);

/// How often the sweep runs.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Run the retention sweep until `cancel` is triggered.
pub async fn run(queue: Arc<PrintQueue>, retention: Duration, cancel: CancellationToken) {
    tracing::info!(
        retention_secs = retention.as_secs(),
        interval_secs = SWEEP_INTERVAL.as_secs(),
        "Job retention sweep started"
    );

    let mut interval = tokio::time::interval(SWEEP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Job retention sweep stopping");
                break;
            }
            _ = interval.tick() => {
                let removed = queue.prune_finished(retention).await;
                if removed > 0 {
                    tracing::info!(removed, "Job retention: purged finished jobs");
                } else {
                    tracing::debug!("Job retention: nothing to purge");
                }
            }
        }
    }
}
