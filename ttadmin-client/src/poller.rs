//! Job poller
//!
//! Submits maintenance jobs and polls their status until the backend
//! reports a terminal state, the client-side timeout elapses, or the
//! caller cancels. One poller serves every job kind; kinds differ only by
//! endpoint and parameters.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, info, warn};
use ttadmin_core::domain::job::{JobHandle, JobKind, JobRequest, JobStatus};

use crate::error::Result;

/// Client-side limit for a single job
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(600);

/// Pause between two status queries
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Backend that accepts jobs and reports their status
///
/// Implemented by [`crate::AdminClient`] over HTTP; tests plug in scripted
/// backends.
#[async_trait]
pub trait JobBackend: Send + Sync {
    /// Starts a job and returns its handle
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle>;

    /// Reads the current status of a job. Must not change backend state.
    async fn status(&self, kind: JobKind, handle: &JobHandle) -> Result<JobStatus>;
}

/// Submit a job, collapsing every failure into `None`
///
/// `None` means no job exists on the backend and nothing should be polled.
pub async fn submit<B: JobBackend + ?Sized>(backend: &B, request: &JobRequest) -> Option<JobHandle> {
    match backend.submit(request).await {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Failed to start {} job: {}", request.kind().label(), e);
            None
        }
    }
}

/// What to do when a status query itself fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TransientPolicy {
    /// Count the failed query as "still running" and retry next interval
    #[default]
    TreatAsRunning,
    /// Double the wait after each consecutive failure, capped at
    /// `max_delay`; give up after `max_failures` in a row
    Backoff {
        max_failures: u32,
        max_delay: Duration,
    },
}

impl TransientPolicy {
    /// Backoff with 10 attempts and a 30 second cap
    pub fn backoff() -> Self {
        TransientPolicy::Backoff {
            max_failures: 10,
            max_delay: Duration::from_secs(30),
        }
    }
}

/// Poller settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Wall-clock limit measured from the first query
    pub timeout: Duration,
    /// Pause between queries
    pub interval: Duration,
    pub transient: TransientPolicy,
}

impl PollOptions {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self {
            timeout,
            interval,
            transient: TransientPolicy::default(),
        }
    }

    pub fn with_transient(mut self, transient: TransientPolicy) -> Self {
        self.transient = transient;
        self
    }
}

impl Default for PollOptions {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_TIMEOUT, DEFAULT_POLL_INTERVAL)
    }
}

/// How a poll loop ended
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// The backend reported `success` or `error`
    Finished(JobStatus),
    /// The timeout elapsed while the job was still running
    TimedOut { polls: u32 },
    /// The caller cancelled the loop
    Cancelled { polls: u32 },
    /// Too many consecutive failed queries (backoff policy only)
    Unreachable { polls: u32, last_error: String },
}

impl PollOutcome {
    /// Status as last known to the client
    ///
    /// Anything that did not finish reads as `Running`.
    pub fn status(&self) -> JobStatus {
        match self {
            PollOutcome::Finished(status) => status.clone(),
            _ => JobStatus::Running,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PollOutcome::Finished(status) if status.is_success())
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, PollOutcome::Finished(_))
    }
}

/// Create a cancellation pair for one or more poll loops
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}

/// Cancels every loop watching the paired [`CancelSignal`]
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observed by poll loops; fires once the paired handle cancels
///
/// If the handle is dropped without cancelling, the signal never fires.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal with no handle
    pub fn never() -> Self {
        let (_, signal) = cancel_pair();
        signal
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancelled
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|cancelled| *cancelled).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::never()
    }
}

/// Polls job status against a [`JobBackend`]
pub struct JobPoller<B: ?Sized> {
    backend: Arc<B>,
    options: PollOptions,
}

impl<B: JobBackend + ?Sized> JobPoller<B> {
    /// Creates a new job poller
    pub fn new(backend: Arc<B>, options: PollOptions) -> Self {
        Self { backend, options }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn options(&self) -> &PollOptions {
        &self.options
    }

    /// Poll a job until it finishes, times out or is cancelled
    pub async fn poll(&self, kind: JobKind, handle: &JobHandle, cancel: &CancelSignal) -> PollOutcome {
        self.poll_observed(kind, handle, cancel, |_| {}).await
    }

    /// Like [`JobPoller::poll`], calling `on_poll` with the running query
    /// count after every non-terminal query
    ///
    /// At least one query is issued, even with a zero timeout or a signal
    /// that is already cancelled. Both the queries and the sleeps
    /// between them are bounded by the deadline and by `cancel`, so a
    /// job that stays `running` or a query that never answers ends the
    /// loop exactly at `timeout`.
    pub async fn poll_observed<F>(
        &self,
        kind: JobKind,
        handle: &JobHandle,
        cancel: &CancelSignal,
        mut on_poll: F,
    ) -> PollOutcome
    where
        F: FnMut(u32),
    {
        let deadline = Instant::now() + self.options.timeout;
        let mut polls = 0u32;
        let mut failures = 0u32;

        debug!(
            "Polling {} job {} (timeout: {:?}, interval: {:?})",
            kind, handle, self.options.timeout, self.options.interval
        );

        loop {
            if polls > 0 && cancel.is_cancelled() {
                info!("Polling of {} job {} cancelled", kind, handle);
                return PollOutcome::Cancelled { polls };
            }

            polls += 1;

            let reply = tokio::select! {
                biased;
                reply = self.backend.status(kind, handle) => reply,
                _ = cancel.cancelled() => {
                    info!("Polling of {} job {} cancelled", kind, handle);
                    return PollOutcome::Cancelled { polls };
                }
                _ = time::sleep_until(deadline) => {
                    return self.timed_out(kind, handle, polls);
                }
            };

            let delay = match reply {
                Ok(status) if status.is_terminal() => {
                    info!("{} job {} finished: {}", kind.label(), handle, status);
                    return PollOutcome::Finished(status);
                }
                Ok(_) => {
                    failures = 0;
                    self.options.interval
                }
                Err(e) => match self.options.transient {
                    TransientPolicy::TreatAsRunning => {
                        debug!("Status query {} for job {} failed: {}", polls, handle, e);
                        self.options.interval
                    }
                    TransientPolicy::Backoff {
                        max_failures,
                        max_delay,
                    } => {
                        failures += 1;
                        if failures >= max_failures {
                            warn!(
                                "Giving up on {} job {} after {} failed queries: {}",
                                kind, handle, failures, e
                            );
                            return PollOutcome::Unreachable {
                                polls,
                                last_error: e.to_string(),
                            };
                        }
                        let delay = backoff_delay(self.options.interval, failures, max_delay);
                        warn!(
                            "Status query for job {} failed ({}/{}), retrying in {:?}: {}",
                            handle, failures, max_failures, delay, e
                        );
                        delay
                    }
                },
            };

            on_poll(polls);

            let now = Instant::now();
            if now >= deadline {
                return self.timed_out(kind, handle, polls);
            }

            tokio::select! {
                _ = time::sleep_until((now + delay).min(deadline)) => {}
                _ = cancel.cancelled() => {
                    info!("Polling of {} job {} cancelled", kind, handle);
                    return PollOutcome::Cancelled { polls };
                }
            }

            if Instant::now() >= deadline {
                return self.timed_out(kind, handle, polls);
            }
        }
    }

    fn timed_out(&self, kind: JobKind, handle: &JobHandle, polls: u32) -> PollOutcome {
        warn!(
            "{} job {} still running after {:?} ({} queries)",
            kind.label(),
            handle,
            self.options.timeout,
            polls
        );
        PollOutcome::TimedOut { polls }
    }
}

/// `interval * 2^failures`, capped at `max_delay`
fn backoff_delay(interval: Duration, failures: u32, max_delay: Duration) -> Duration {
    let factor = 2u32.checked_pow(failures).unwrap_or(u32::MAX);
    interval.saturating_mul(factor).min(max_delay)
}
