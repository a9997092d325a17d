//! Waiting for an asynchronous job to reach a terminal status.
//!
//! The poller queries the job until the service reports SUCCEEDED or
//! FAILED, appending the blocks of every page to the [`Job`] as they arrive.
//! A terminal page that still carries a continuation token is followed by
//! the remaining pages, fetched back to back, so the returned job always
//! holds the complete result.
//!
//! Every poll is bounded twice: by a number of status requests and by an
//! overall deadline. Neither the remote job nor the service is touched when
//! the bound is hit or when waiting is cancelled.

use crate::error::{Error, Result};
use crate::model::{Job, TerminalStatus};
use crate::service::{AnalysisService, PageRequest, DEFAULT_MAX_RESULTS};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout_at, Instant};

/// Limits and pacing of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollOptions {
    /// Maximum blocks requested per page
    pub max_results: u32,

    /// Delay between status requests while the job is in progress
    pub interval: Duration,

    /// Maximum number of status requests, draining included
    pub max_attempts: u32,

    /// Overall deadline, measured from the start of the poll
    pub timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            interval: Duration::from_secs(5),
            max_attempts: 360,
            timeout: Duration::from_secs(30 * 60),
        }
    }
}

impl PollOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the page size cap.
    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    /// Set the delay between status requests.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the maximum number of status requests (at least one).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set the overall deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Where a poll stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No status request issued yet
    Submitted,
    /// The last page reported a non-terminal status
    InProgress,
    /// Terminal status seen, more pages remain
    Draining(TerminalStatus),
    /// Terminal status seen and every page fetched
    Finished(TerminalStatus),
}

impl PollState {
    fn after_page(status: Option<TerminalStatus>, has_more: bool) -> Self {
        match (status, has_more) {
            (Some(status), true) => PollState::Draining(status),
            (Some(status), false) => PollState::Finished(status),
            (None, _) => PollState::InProgress,
        }
    }
}

/// A job that reached a terminal status.
#[derive(Debug, Clone)]
pub struct JobOutcome {
    /// The job with every page recorded
    pub job: Job,
    /// Terminal status reported by the service
    pub status: TerminalStatus,
}

impl JobOutcome {
    /// Check if the job succeeded.
    pub fn is_success(&self) -> bool {
        self.status == TerminalStatus::Succeeded
    }

    /// Return the job if it succeeded, or [`Error::JobFailed`].
    pub fn into_result(self) -> Result<Job> {
        match self.status {
            TerminalStatus::Succeeded => Ok(self.job),
            TerminalStatus::Failed => Err(Error::JobFailed {
                job_id: self.job.id.to_string(),
                message: self.job.status_message,
            }),
        }
    }
}

/// Drives status requests for one job.
pub struct JobPoller<'a, S: AnalysisService + ?Sized> {
    service: &'a S,
    options: PollOptions,
}

impl<'a, S: AnalysisService + ?Sized> JobPoller<'a, S> {
    /// Create a poller over a service.
    pub fn new(service: &'a S, options: PollOptions) -> Self {
        Self { service, options }
    }

    /// Options in use.
    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    /// Poll until the job reaches a terminal status.
    ///
    /// A FAILED job is a normal outcome; inspect [`JobOutcome::status`].
    /// Errors are [`Error::PollLimitExceeded`], [`Error::PollTimeout`], or
    /// whatever the service returned for a status request.
    pub async fn poll(&self, job: Job) -> Result<JobOutcome> {
        self.run(job).await
    }

    /// Poll like [`JobPoller::poll`], giving up with [`Error::Cancelled`]
    /// as soon as `shutdown` completes.
    pub async fn poll_until<F>(&self, job: Job, shutdown: F) -> Result<JobOutcome>
    where
        F: Future,
    {
        let job_id = job.id.to_string();
        tokio::select! {
            biased;
            _ = shutdown => {
                log::info!("Stopped waiting for job {}; it keeps running remotely", job_id);
                Err(Error::Cancelled { job_id })
            }
            result = self.run(job) => result,
        }
    }

    async fn run(&self, mut job: Job) -> Result<JobOutcome> {
        let started = Instant::now();
        // A timeout too large to represent means no deadline.
        let deadline = started.checked_add(self.options.timeout);
        let mut state = PollState::Submitted;
        let mut next_token: Option<String> = None;
        let mut attempts: u32 = 0;

        loop {
            if let PollState::Finished(status) = state {
                log::info!(
                    "Job {} finished with status {} after {} requests ({}s since submission)",
                    job.id,
                    job.status,
                    attempts,
                    (chrono::Utc::now() - job.submitted_at).num_seconds()
                );
                return Ok(JobOutcome { job, status });
            }

            if attempts >= self.options.max_attempts {
                return Err(Error::PollLimitExceeded {
                    job_id: job.id.to_string(),
                    attempts,
                });
            }

            if state == PollState::InProgress
                && within(deadline, sleep(self.options.interval))
                    .await
                    .is_none()
            {
                return Err(timed_out(&job, started));
            }

            let request = PageRequest::first(job.id.clone(), job.features)
                .with_max_results(self.options.max_results)
                .with_next_token(next_token.take());

            attempts += 1;
            let page = match within(deadline, self.service.fetch(&request)).await {
                Some(page) => page?,
                None => return Err(timed_out(&job, started)),
            };

            let block_count = page.blocks.len();
            next_token = job.record_page(page);
            state = PollState::after_page(job.status.terminal(), next_token.is_some());

            log::debug!(
                "Job {} request {}: status {}, {} blocks, {}",
                job.id,
                attempts,
                job.status,
                block_count,
                if next_token.is_some() {
                    "more pages"
                } else {
                    "last page"
                }
            );
        }
    }
}

/// Run `future` to completion, or until `deadline` passes.
async fn within<F: Future>(deadline: Option<Instant>, future: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => timeout_at(deadline, future).await.ok(),
        None => Some(future.await),
    }
}

fn timed_out(job: &Job, started: Instant) -> Error {
    Error::PollTimeout {
        job_id: job.id.to_string(),
        elapsed: started.elapsed(),
    }
}

/// Poll a job on a background task.
///
/// The task owns a handle to the shared service; dropping the returned
/// handle does not stop it, aborting it stops local waiting only.
pub fn spawn_poll<S>(service: Arc<S>, options: PollOptions, job: Job) -> JoinHandle<Result<JobOutcome>>
where
    S: AnalysisService + ?Sized + 'static,
{
    tokio::spawn(async move { JobPoller::new(service.as_ref(), options).poll(job).await })
}
