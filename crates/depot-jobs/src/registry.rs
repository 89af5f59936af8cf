//! In-memory job registry.
//!
//! The registry owns every `Job` for the lifetime of the process. The outer
//! `RwLock` guards map membership only; each entry carries its own `Mutex` so
//! concurrent `advance` calls on the same job serialize without blocking
//! unrelated jobs. Reads snapshot the entry and return a clone.

use chrono::Utc;
use depot_core::models::{Job, JobStatus};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

pub type JobId = Uuid;

/// Job registry and runner errors
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(JobId),

    #[error("Illegal transition for job {id}: {from} -> {to}")]
    IllegalTransition {
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    },

    #[error("Progress may not decrease for job {id}: {from} -> {to}")]
    ProgressRegression { id: JobId, from: u8, to: u8 },

    #[error("Progress out of range for job {id}: {progress}")]
    ProgressOutOfRange { id: JobId, progress: u8 },

    #[error("Job id collision on create: {0}")]
    IdCollision(JobId),

    #[error("Analysis queue is full")]
    QueueFull,

    #[error("Analysis worker is not running")]
    WorkerStopped,
}

/// Registry of asynchronous jobs, injected at process start and torn down at
/// shutdown. Entries are never deleted during the process lifetime.
#[derive(Default)]
pub struct JobRegistry {
    entries: RwLock<HashMap<JobId, Arc<Mutex<Job>>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new job in state `queued` with progress 0.
    ///
    /// Identifier collisions cannot happen short of a broken id source; one is
    /// a defect, not a runtime condition, so it is logged and surfaced rather
    /// than retried.
    pub async fn create(&self) -> Result<JobId, JobError> {
        let id = Uuid::new_v4();
        let mut entries = self.entries.write().await;

        if entries.contains_key(&id) {
            tracing::error!(job_id = %id, "Job id collision on create");
            return Err(JobError::IdCollision(id));
        }

        entries.insert(id, Arc::new(Mutex::new(Job::new(id))));
        tracing::debug!(job_id = %id, "Job created");
        Ok(id)
    }

    /// Transition a job, enforcing the state machine and progress monotonicity.
    ///
    /// Returns the updated job snapshot on success.
    pub async fn advance(
        &self,
        id: JobId,
        status: JobStatus,
        progress: u8,
        message: impl Into<String>,
    ) -> Result<Job, JobError> {
        let entry = {
            let entries = self.entries.read().await;
            entries.get(&id).cloned()
        }
        .ok_or(JobError::NotFound(id))?;

        let mut job = entry.lock().await;

        if !job.status.can_transition_to(status) {
            return Err(JobError::IllegalTransition {
                id,
                from: job.status,
                to: status,
            });
        }

        if progress > 100 {
            return Err(JobError::ProgressOutOfRange { id, progress });
        }

        if progress < job.progress {
            return Err(JobError::ProgressRegression {
                id,
                from: job.progress,
                to: progress,
            });
        }

        job.status = status;
        job.progress = progress;
        job.message = message.into();
        job.updated_at = Utc::now();

        tracing::debug!(
            job_id = %id,
            status = %job.status,
            progress = job.progress,
            "Job advanced"
        );

        Ok(job.clone())
    }

    /// Snapshot read of a job.
    pub async fn get(&self, id: JobId) -> Option<Job> {
        let entry = {
            let entries = self.entries.read().await;
            entries.get(&id).cloned()
        }?;

        let job = entry.lock().await;
        Some(job.clone())
    }

    /// Number of jobs tracked since process start.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
