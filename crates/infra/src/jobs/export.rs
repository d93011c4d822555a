//! Export orchestration
//!
//! Submits an export job, polls it to completion, then downloads and extracts
//! the resulting artifact. Progress is reported per phase (`export`,
//! `download`, `extract`), each phase ending with exactly one `1.0`.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use nexus_core::{ArtifactsApi, ExportProgress, JobsApi};
use nexus_domain::constants::{DEFAULT_JOB_POLL_INTERVAL_MS, PROGRESS_EXPORT, PROGRESS_EXTRACT};
use nexus_domain::{ApiError, ExportParameters, Result, TaskStatus};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{download_to_file, extract_archive, report};

/// Drives export jobs through the jobs and artifacts sub-clients.
#[derive(Clone)]
pub struct JobOrchestrator {
    jobs: Arc<dyn JobsApi>,
    artifacts: Arc<dyn ArtifactsApi>,
    poll_interval: Duration,
    deadline: Option<Duration>,
}

impl JobOrchestrator {
    /// Orchestrator polling once per second without a deadline.
    pub fn new(jobs: Arc<dyn JobsApi>, artifacts: Arc<dyn ArtifactsApi>) -> Self {
        Self {
            jobs,
            artifacts,
            poll_interval: Duration::from_millis(DEFAULT_JOB_POLL_INTERVAL_MS),
            deadline: None,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Give up polling once `deadline` has elapsed since submission.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Export `parameters` into `target_folder`.
    ///
    /// Without a file format the job only computes the data server-side and
    /// the call returns after the job completes.
    ///
    /// # Errors
    /// - [`ApiError::JobCanceled`] / [`ApiError::JobFaulted`] from the server
    /// - [`ApiError::InvalidJobResult`] if the job completes without an
    ///   artifact id
    /// - [`ApiError::Cancelled`] / [`ApiError::Timeout`] when `cancel` fires
    ///   or the deadline elapses
    /// - any sub-client, download or extraction error
    #[instrument(skip_all, fields(target = %target_folder.display()))]
    pub async fn export(
        &self,
        parameters: &ExportParameters,
        target_folder: &Path,
        on_progress: Option<&ExportProgress>,
        cancel: Option<&CancellationToken>,
    ) -> Result<()> {
        let job = self.jobs.export(parameters).await?;
        info!(job_id = %job.id, "Export job submitted");

        let artifact_id = self.wait_for_artifact(job.id, on_progress, cancel).await?;
        report(on_progress, 1.0, PROGRESS_EXPORT);
        info!(job_id = %job.id, "Export job completed");

        if parameters.file_format.is_none() {
            return Ok(());
        }

        let body = self.artifacts.download(&artifact_id).await?;
        let scratch = download_to_file(body, on_progress, cancel).await?;
        info!(artifact_id = %artifact_id, "Artifact downloaded");

        extract_archive(scratch, target_folder).await?;
        report(on_progress, 1.0, PROGRESS_EXTRACT);
        info!(artifact_id = %artifact_id, "Artifact extracted");

        Ok(())
    }

    async fn wait_for_artifact(
        &self,
        job_id: Uuid,
        on_progress: Option<&ExportProgress>,
        cancel: Option<&CancellationToken>,
    ) -> Result<String> {
        let started = Instant::now();

        loop {
            self.pause(started, cancel).await?;

            let status = self.jobs.get_job_status(job_id).await?;
            debug!(%job_id, status = %status.status, progress = status.progress, "Polled job status");

            match status.status {
                TaskStatus::Canceled => return Err(ApiError::JobCanceled),
                TaskStatus::Faulted => {
                    return Err(ApiError::JobFaulted {
                        reason: status.exception_message.unwrap_or_default(),
                    })
                }
                TaskStatus::RanToCompletion => {
                    return status
                        .artifact_id()
                        .map(str::to_owned)
                        .ok_or(ApiError::InvalidJobResult);
                }
                TaskStatus::Scheduled | TaskStatus::Running => {
                    if status.progress < 1.0 {
                        report(on_progress, status.progress, PROGRESS_EXPORT);
                    }
                }
            }
        }
    }

    /// Sleep one poll interval, bounded by the deadline and the cancellation
    /// token.
    async fn pause(&self, started: Instant, cancel: Option<&CancellationToken>) -> Result<()> {
        let mut delay = self.poll_interval;

        if let Some(deadline) = self.deadline {
            let remaining = deadline.saturating_sub(started.elapsed());
            if remaining.is_zero() {
                return Err(ApiError::Timeout(deadline));
            }
            delay = delay.min(remaining);
        }

        match cancel {
            Some(token) => tokio::select! {
                () = token.cancelled() => Err(ApiError::Cancelled),
                () = tokio::time::sleep(delay) => Ok(()),
            },
            None => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
        }
    }
}

impl std::fmt::Debug for JobOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobOrchestrator")
            .field("poll_interval", &self.poll_interval)
            .field("deadline", &self.deadline)
            .finish_non_exhaustive()
    }
}
