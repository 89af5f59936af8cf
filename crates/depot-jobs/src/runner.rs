//! Analysis submission and the worker that drives submitted jobs.
//!
//! The gateway hands an opaque payload to [`AnalysisRunner::submit`] and gets
//! a job id back; it never assumes how or when the job completes. A spawned
//! worker loop consumes submissions from a bounded channel and drives the
//! injected [`AnalysisTask`], advancing the shared [`JobRegistry`] as the only
//! contract between the two sides.

use crate::registry::{JobError, JobId, JobRegistry};
use async_trait::async_trait;
use depot_core::models::JobStatus;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Submission interface exposed to the gateway.
#[async_trait]
pub trait AnalysisRunner: Send + Sync {
    /// Register a new job and enqueue its payload for the worker.
    async fn submit(&self, payload: Value) -> Result<JobId, JobError>;
}

/// The analysis computation itself, treated as an opaque async task.
///
/// Implementations may report intermediate progress through the registry;
/// the worker sets `in_progress` before calling `run` and records the
/// terminal state from the returned result.
#[async_trait]
pub trait AnalysisTask: Send + Sync {
    async fn run(
        &self,
        job_id: JobId,
        payload: Value,
        registry: &JobRegistry,
    ) -> Result<String, anyhow::Error>;
}

/// One queued unit of work.
#[derive(Debug)]
pub struct Submission {
    pub job_id: JobId,
    pub payload: Value,
}

/// Channel-backed [`AnalysisRunner`] with a single spawned worker.
pub struct TaskRunner {
    registry: Arc<JobRegistry>,
    tx: mpsc::Sender<Submission>,
}

impl TaskRunner {
    /// Spawn the worker and return the submitter half.
    ///
    /// `queue_depth` bounds how many submissions may wait behind the one in
    /// flight; a full queue fails the submission rather than blocking the
    /// request handler.
    pub fn new(
        registry: Arc<JobRegistry>,
        task: Arc<dyn AnalysisTask>,
        queue_depth: usize,
    ) -> Self {
        let (tx, rx) = mpsc::channel(queue_depth.max(1));

        let worker_registry = registry.clone();
        tokio::spawn(async move {
            run_worker(worker_registry, task, rx).await;
        });

        Self { registry, tx }
    }
}

#[async_trait]
impl AnalysisRunner for TaskRunner {
    async fn submit(&self, payload: Value) -> Result<JobId, JobError> {
        let job_id = self.registry.create().await?;

        match self.tx.try_send(Submission { job_id, payload }) {
            Ok(()) => {
                tracing::info!(job_id = %job_id, "Analysis submission queued");
                Ok(job_id)
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::warn!(job_id = %job_id, "Analysis queue full, rejecting submission");
                // Best-effort: leave the registry consistent for pollers.
                let _ = self
                    .registry
                    .advance(job_id, JobStatus::Failed, 0, "Analysis queue is full")
                    .await;
                Err(JobError::QueueFull)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                tracing::error!(job_id = %job_id, "Analysis worker channel closed");
                let _ = self
                    .registry
                    .advance(job_id, JobStatus::Failed, 0, "Analysis worker is not running")
                    .await;
                Err(JobError::WorkerStopped)
            }
        }
    }
}

async fn run_worker(
    registry: Arc<JobRegistry>,
    task: Arc<dyn AnalysisTask>,
    mut rx: mpsc::Receiver<Submission>,
) {
    while let Some(Submission { job_id, payload }) = rx.recv().await {
        if let Err(e) = registry
            .advance(job_id, JobStatus::InProgress, 0, "Analysis in progress")
            .await
        {
            tracing::error!(job_id = %job_id, error = %e, "Failed to start job");
            continue;
        }

        match task.run(job_id, payload, &registry).await {
            Ok(message) => {
                if let Err(e) = registry
                    .advance(job_id, JobStatus::Done, 100, message)
                    .await
                {
                    tracing::error!(job_id = %job_id, error = %e, "Failed to complete job");
                }
            }
            Err(err) => {
                tracing::warn!(job_id = %job_id, error = %err, "Analysis task failed");
                let progress = registry
                    .get(job_id)
                    .await
                    .map(|job| job.progress)
                    .unwrap_or(0);
                if let Err(e) = registry
                    .advance(
                        job_id,
                        JobStatus::Failed,
                        progress,
                        format!("Analysis failed: {}", err),
                    )
                    .await
                {
                    tracing::error!(job_id = %job_id, error = %e, "Failed to fail job");
                }
            }
        }
    }

    tracing::debug!("Analysis worker stopped");
}
