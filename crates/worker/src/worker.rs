//! The print queue drain loop.
//!
//! [`PrintWorker::run`] takes job ids off the queue one at a time and runs
//! each to a terminal state before looking at the next:
//!
//! ```text
//! queued -> rendering -> printing -> printed
//!               |            |
//!               +-> failed <-+
//! ```
//!
//! Rendering and printing each run in a spawned task that the loop awaits,
//! so a panic inside a renderer or printer fails that job only. The rendered
//! document is deleted after the print sequence whatever its outcome.

use std::path::Path;
use std::sync::Arc;

use hub_core::job::JobStatus;
use hub_core::types::JobId;
use hub_printer::{LabelRenderer, PrintDispatcher};
use tokio_util::sync::CancellationToken;

use crate::queue::{PrintQueue, QueueReceiver};

pub struct PrintWorker {
    queue: Arc<PrintQueue>,
    renderer: Arc<dyn LabelRenderer>,
    dispatcher: Arc<PrintDispatcher>,
}

impl PrintWorker {
    pub fn new(
        queue: Arc<PrintQueue>,
        renderer: Arc<dyn LabelRenderer>,
        dispatcher: Arc<PrintDispatcher>,
    ) -> Self {
        Self {
            queue,
            renderer,
            dispatcher,
        }
    }

    /// Drain the queue until `cancel` fires or every sender is dropped.
    ///
    /// Cancellation is only observed between jobs; a job that has been
    /// dequeued always reaches a terminal state.
    pub async fn run(self, mut receiver: QueueReceiver, cancel: CancellationToken) {
        tracing::info!(
            capacity = self.queue.capacity(),
            max_attempts = self.dispatcher.max_attempts(),
            "Print worker started",
        );

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Print worker shutting down");
                    break;
                }
                next = receiver.recv() => next,
            };

            let Some(job_id) = next else {
                tracing::info!("Print queue closed, worker exiting");
                break;
            };

            self.process(job_id).await;
        }
    }

    /// Run a single job through render and print.
    async fn process(&self, job_id: JobId) {
        let mut payload = None;
        let started = self
            .queue
            .update(job_id, |job| {
                job.transition(JobStatus::Rendering)?;
                payload = Some(job.payload.clone());
                Ok(())
            })
            .await;
        let Some(payload) = payload.filter(|_| started) else {
            return;
        };

        tracing::info!(%job_id, badge_type = payload.kind(), "Rendering label");

        let renderer = Arc::clone(&self.renderer);
        let rendered =
            match tokio::spawn(async move { renderer.render(job_id, &payload).await }).await {
                Ok(Ok(rendered)) => rendered,
                Ok(Err(e)) => {
                    self.fail(job_id, format!("render failed: {e}")).await;
                    return;
                }
                Err(e) => {
                    self.fail(job_id, format!("render task aborted: {e}")).await;
                    return;
                }
            };

        self.queue
            .update(job_id, |job| job.transition(JobStatus::Printing))
            .await;
        tracing::info!(%job_id, document = %rendered.path.display(), "Printing label");

        let dispatcher = Arc::clone(&self.dispatcher);
        let document = rendered.path.clone();
        let outcome = tokio::spawn(async move { dispatcher.dispatch(&document).await }).await;

        remove_document(&rendered.path).await;

        match outcome {
            Ok(Ok(attempts)) => {
                self.queue
                    .update(job_id, |job| {
                        job.attempts = attempts;
                        job.transition(JobStatus::Printed)
                    })
                    .await;
                tracing::info!(%job_id, attempts, "Label printed");
            }
            Ok(Err(failure)) => {
                let attempts = failure.attempts;
                let reason = format!(
                    "print failed after {attempts} attempt(s): {}",
                    failure.error
                );
                self.queue
                    .update(job_id, |job| {
                        job.attempts = attempts;
                        job.fail(reason)
                    })
                    .await;
                tracing::error!(%job_id, attempts, error = %failure.error, "Print job failed");
            }
            Err(e) => {
                self.fail(job_id, format!("print task aborted: {e}")).await;
            }
        }
    }

    async fn fail(&self, job_id: JobId, reason: String) {
        tracing::error!(%job_id, error = %reason, "Print job failed");
        self.queue.update(job_id, |job| job.fail(reason)).await;
    }
}

/// Delete a rendered document. Missing files are fine.
async fn remove_document(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove rendered label");
        }
    }
}
