//! Print job lifecycle.
//!
//! A [`PrintJob`] moves through
//! `queued -> rendering -> printing -> printed | failed`. Rendering may also
//! go straight to `failed`. Transitions are checked by
//! [`JobStatus::can_transition_to`]; the queue worker is the only writer.

use chrono::Utc;
use serde::Serialize;

use crate::badge::BadgePayload;
use crate::error::CoreError;
use crate::types::{JobId, Timestamp};

/// Lifecycle state of a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Rendering,
    Printing,
    Printed,
    Failed,
}

impl JobStatus {
    /// Whether the job has finished (successfully or not).
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Printed | JobStatus::Failed)
    }

    /// Whether the job currently holds the printer pipeline.
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Rendering | JobStatus::Printing)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Rendering => "rendering",
            JobStatus::Printing => "printing",
            JobStatus::Printed => "printed",
            JobStatus::Failed => "failed",
        }
    }

    /// Check whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(self, next: JobStatus) -> bool {
        use JobStatus::*;
        matches!(
            (self, next),
            (Queued, Rendering)
                | (Queued, Failed)
                | (Rendering, Printing)
                | (Rendering, Failed)
                | (Printing, Printed)
                | (Printing, Failed)
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single badge print job as tracked in the status map.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrintJob {
    #[serde(rename = "jobId")]
    pub id: JobId,
    pub payload: BadgePayload,
    pub status: JobStatus,
    /// Print attempts made so far.
    pub attempts: u32,
    /// Human-readable failure reason, set when `status` is `failed`.
    pub error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub started_at: Option<Timestamp>,
    pub finished_at: Option<Timestamp>,
}

impl PrintJob {
    /// Create a freshly submitted job in the `queued` state.
    pub fn new(payload: BadgePayload) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4(),
            payload,
            status: JobStatus::Queued,
            attempts: 0,
            error: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            finished_at: None,
        }
    }

    /// Move the job to `next`, stamping the relevant timestamps.
    pub fn transition(&mut self, next: JobStatus) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::Conflict(format!(
                "job {} cannot move from {} to {}",
                self.id, self.status, next
            )));
        }

        let now = Utc::now();
        if next == JobStatus::Rendering {
            self.started_at = Some(now);
        }
        if next.is_terminal() {
            self.finished_at = Some(now);
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Mark the job failed with a reason.
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), CoreError> {
        self.transition(JobStatus::Failed)?;
        self.error = Some(reason.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::badge::StudentBadge;

    fn job() -> PrintJob {
        PrintJob::new(BadgePayload::Student(StudentBadge {
            full_name: "Anna Lie".to_string(),
            study_program: "Informatikk".to_string(),
            university: None,
        }))
    }

    #[test]
    fn new_job_is_queued() {
        let job = job();
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.attempts, 0);
        assert!(job.started_at.is_none());
        assert!(job.finished_at.is_none());
    }

    #[test]
    fn happy_path_sets_timestamps() {
        let mut job = job();
        job.transition(JobStatus::Rendering).unwrap();
        assert!(job.started_at.is_some());

        job.transition(JobStatus::Printing).unwrap();
        job.transition(JobStatus::Printed).unwrap();
        assert!(job.finished_at.is_some());
        assert!(job.status.is_terminal());
    }

    #[test]
    fn render_failure_records_reason() {
        let mut job = job();
        job.transition(JobStatus::Rendering).unwrap();
        job.fail("browser crashed").unwrap();

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.error.as_deref(), Some("browser crashed"));
    }

    #[test]
    fn terminal_states_are_final() {
        let mut job = job();
        job.transition(JobStatus::Rendering).unwrap();
        job.fail("boom").unwrap();

        assert_matches!(
            job.transition(JobStatus::Printing),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn cannot_skip_rendering() {
        assert!(!JobStatus::Queued.can_transition_to(JobStatus::Printing));
        assert!(!JobStatus::Queued.can_transition_to(JobStatus::Printed));
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_value(JobStatus::Rendering).unwrap();
        assert_eq!(json, "rendering");
    }

    #[test]
    fn job_serializes_job_id_field() {
        let job = job();
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["jobId"], job.id.to_string());
        assert_eq!(json["status"], "queued");
        assert_eq!(json["payload"]["type"], "student");
    }
}
