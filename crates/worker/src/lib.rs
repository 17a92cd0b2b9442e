//! In-process badge print queue.
//!
//! [`PrintQueue`] owns the pending-job channel and the status map. The
//! receiving half of the channel is handed to exactly one [`PrintWorker`],
//! which drains it strictly in submission order, one job at a time.
//! [`retention`] sweeps finished jobs out of the status map.

pub mod queue;
pub mod retention;
pub mod worker;

pub use queue::{PrintQueue, QueueError, QueueReceiver, QueueStats, WorkerState};
pub use worker::PrintWorker;
