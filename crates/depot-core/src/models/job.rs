use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    InProgress,
    Done,
    Failed,
}

impl JobStatus {
    /// Terminal states reject further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }

    /// Position in the lifecycle; transitions never move backwards.
    fn rank(&self) -> u8 {
        match self {
            JobStatus::Queued => 0,
            JobStatus::InProgress => 1,
            JobStatus::Done | JobStatus::Failed => 2,
        }
    }

    /// Whether a job in `self` may move to `next`.
    ///
    /// `queued -> in_progress -> {done, failed}`, with same-state updates
    /// allowed for non-terminal states (progress/message refreshes) and
    /// short-circuiting `queued -> {done, failed}` permitted.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }
}

impl Display for JobStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::InProgress => write!(f, "in_progress"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for JobStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(JobStatus::Queued),
            "in_progress" => Ok(JobStatus::InProgress),
            "done" => Ok(JobStatus::Done),
            "failed" => Ok(JobStatus::Failed),
            _ => Err(anyhow::anyhow!("Invalid job status: {}", s)),
        }
    }
}

/// An asynchronous analysis job tracked by the registry.
///
/// Owned by the registry; mutated only through `advance`, never deleted during
/// the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    /// 0-100, monotonically non-decreasing while the job is not terminal.
    pub progress: u8,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn new(id: Uuid) -> Self {
        let now = Utc::now();
        Job {
            id,
            status: JobStatus::Queued,
            progress: 0,
            message: "Analysis has been queued".to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Response model for the status endpoint.
#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub status: JobStatus,
    pub job_id: Uuid,
    pub progress: u8,
    pub message: String,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        Self {
            status: job.status,
            job_id: job.id,
            progress: job.progress,
            message: job.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display_round_trip() {
        for status in [
            JobStatus::Queued,
            JobStatus::InProgress,
            JobStatus::Done,
            JobStatus::Failed,
        ] {
            assert_eq!(status.to_string().parse::<JobStatus>().unwrap(), status);
        }
        assert!("cancelled".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_forward_transitions_allowed() {
        assert!(JobStatus::Queued.can_transition_to(JobStatus::InProgress));
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Done));
        assert!(JobStatus::Queued.can_transition_to(JobStatus::Failed));
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::InProgress));
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::Done));
        assert!(JobStatus::InProgress.can_transition_to(JobStatus::Failed));
    }

    #[test]
    fn test_backward_and_terminal_transitions_rejected() {
        assert!(!JobStatus::InProgress.can_transition_to(JobStatus::Queued));
        assert!(!JobStatus::Done.can_transition_to(JobStatus::InProgress));
        assert!(!JobStatus::Done.can_transition_to(JobStatus::Done));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Queued));
    }

    #[test]
    fn test_new_job_starts_queued_at_zero() {
        let job = Job::new(Uuid::new_v4());
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 0);
    }
}
