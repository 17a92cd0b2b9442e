//! Bounded FIFO of pending print jobs plus the job status map.
//!
//! The queue is created once at start-up. The HTTP layer holds an
//! `Arc<PrintQueue>` to submit and read jobs; the [`QueueReceiver`] is moved
//! into the single [`PrintWorker`](crate::PrintWorker). Because the receiver
//! cannot be cloned, at most one drain loop can exist.

use std::time::Duration;

use chrono::Utc;
use hub_core::badge::BadgePayload;
use hub_core::error::CoreError;
use hub_core::job::{JobStatus, PrintJob};
use hub_core::types::JobId;
use indexmap::IndexMap;
use serde::Serialize;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, RwLock};

/// Default maximum number of jobs waiting to be printed.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("print queue is full ({capacity} jobs waiting)")]
    Full { capacity: usize },

    #[error("print queue is closed")]
    Closed,
}

/// Whether the worker currently has anything to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Idle,
    Processing,
}

/// Snapshot of queue occupancy and per-status job counts.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueStats {
    pub worker: WorkerState,
    /// Jobs waiting in the channel.
    pub depth: usize,
    pub capacity: usize,
    pub queued: usize,
    pub rendering: usize,
    pub printing: usize,
    pub printed: usize,
    pub failed: usize,
}

/// Receiving half of the queue, owned by the worker.
pub struct QueueReceiver {
    rx: mpsc::Receiver<JobId>,
}

impl QueueReceiver {
    /// Wait for the next job id. `None` once every sender is gone.
    pub async fn recv(&mut self) -> Option<JobId> {
        self.rx.recv().await
    }
}

pub struct PrintQueue {
    sender: mpsc::Sender<JobId>,
    /// Every known job, in submission order.
    jobs: RwLock<IndexMap<JobId, PrintJob>>,
}

impl PrintQueue {
    /// Create a queue holding at most `capacity` waiting jobs.
    ///
    /// Returns the shared queue handle and the receiver for the worker.
    pub fn new(capacity: usize) -> (std::sync::Arc<Self>, QueueReceiver) {
        let (sender, rx) = mpsc::channel(capacity.max(1));
        let queue = std::sync::Arc::new(Self {
            sender,
            jobs: RwLock::new(IndexMap::new()),
        });
        (queue, QueueReceiver { rx })
    }

    /// Accept a validated badge and enqueue it.
    ///
    /// Returns a snapshot of the new job in the `queued` state. The job is
    /// recorded in the status map before its id reaches the worker.
    pub async fn submit(&self, payload: BadgePayload) -> Result<PrintJob, QueueError> {
        let permit = self.sender.try_reserve().map_err(|e| match e {
            TrySendError::Full(()) => QueueError::Full {
                capacity: self.capacity(),
            },
            TrySendError::Closed(()) => QueueError::Closed,
        })?;

        let job = PrintJob::new(payload);
        {
            // Send under the lock so map order always matches channel order.
            let mut jobs = self.jobs.write().await;
            jobs.insert(job.id, job.clone());
            permit.send(job.id);
        }

        tracing::info!(
            job_id = %job.id,
            badge_type = job.payload.kind(),
            depth = self.depth(),
            "Print job queued",
        );

        Ok(job)
    }

    /// Look up a job by id.
    pub async fn get(&self, id: JobId) -> Option<PrintJob> {
        self.jobs.read().await.get(&id).cloned()
    }

    /// All known jobs in submission order.
    pub async fn list(&self) -> Vec<PrintJob> {
        self.jobs.read().await.values().cloned().collect()
    }

    /// Number of jobs waiting for the worker.
    pub fn depth(&self) -> usize {
        self.sender.max_capacity() - self.sender.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }

    pub async fn stats(&self) -> QueueStats {
        let jobs = self.jobs.read().await;
        let count = |status: JobStatus| jobs.values().filter(|j| j.status == status).count();

        let depth = self.depth();
        let rendering = count(JobStatus::Rendering);
        let printing = count(JobStatus::Printing);
        let worker = if depth > 0 || rendering + printing > 0 {
            WorkerState::Processing
        } else {
            WorkerState::Idle
        };

        QueueStats {
            worker,
            depth,
            capacity: self.capacity(),
            queued: count(JobStatus::Queued),
            rendering,
            printing,
            printed: count(JobStatus::Printed),
            failed: count(JobStatus::Failed),
        }
    }

    /// Drop finished jobs whose `finished_at` is at least `retention` old.
    ///
    /// Returns the number of jobs removed. Unfinished jobs are never removed.
    pub async fn prune_finished(&self, retention: Duration) -> usize {
        let retention = chrono::Duration::from_std(retention).unwrap_or(chrono::Duration::MAX);
        let cutoff = Utc::now().checked_sub_signed(retention);

        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| match (job.finished_at, cutoff) {
            (Some(finished), Some(cutoff)) => finished > cutoff,
            _ => true,
        });
        before - jobs.len()
    }

    /// Apply a state change to a job. Only the worker calls this.
    pub(crate) async fn update<F>(&self, id: JobId, f: F) -> bool
    where
        F: FnOnce(&mut PrintJob) -> Result<(), CoreError>,
    {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.get_mut(&id) else {
            tracing::warn!(job_id = %id, "Job missing from status map");
            return false;
        };
        match f(job) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(job_id = %id, error = %e, "Invalid job state change");
                false
            }
        }
    }
}
