//! Job runner
//!
//! Submit-then-poll flow shared by every maintenance operation. Callers
//! plug in a [`JobObserver`] to drive their own progress display instead
//! of each operation carrying a copy of the loop.

use tracing::warn;
use ttadmin_core::domain::job::{JobHandle, JobRequest};

use crate::poller::{CancelSignal, JobBackend, JobPoller, PollOutcome, submit};

/// Progress callbacks for [`run_job`]; every method defaults to a no-op
pub trait JobObserver {
    /// The backend accepted the job
    fn on_submitted(&mut self, _request: &JobRequest, _handle: &JobHandle) {}

    /// The backend refused the job; nothing will be polled
    fn on_rejected(&mut self, _request: &JobRequest) {}

    /// A status query returned without a terminal status
    fn on_poll(&mut self, _polls: u32) {}

    /// Polling ended
    fn on_finished(&mut self, _request: &JobRequest, _outcome: &PollOutcome) {}
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl JobObserver for NoopObserver {}

/// Result of [`run_job`]
#[derive(Debug, Clone, PartialEq)]
pub enum JobRun {
    /// Submission failed or was cancelled before the backend answered
    Rejected,
    /// The job was started and polled
    Completed {
        handle: JobHandle,
        outcome: PollOutcome,
    },
}

impl JobRun {
    pub fn outcome(&self) -> Option<&PollOutcome> {
        match self {
            JobRun::Rejected => None,
            JobRun::Completed { outcome, .. } => Some(outcome),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome().is_some_and(PollOutcome::is_success)
    }
}

/// Submit `request` and poll it with `poller`'s options
///
/// # Returns
/// `JobRun::Rejected` if submission failed, otherwise the handle and how
/// polling ended
pub async fn run_job<B, O>(
    poller: &JobPoller<B>,
    request: &JobRequest,
    cancel: &CancelSignal,
    observer: &mut O,
) -> JobRun
where
    B: JobBackend + ?Sized,
    O: JobObserver + ?Sized,
{
    let submitted = tokio::select! {
        biased;
        handle = submit(poller.backend(), request) => handle,
        _ = cancel.cancelled() => {
            warn!("Submission of {} job cancelled", request.kind().label());
            None
        }
    };

    let Some(handle) = submitted else {
        observer.on_rejected(request);
        return JobRun::Rejected;
    };

    observer.on_submitted(request, &handle);

    let outcome = poller
        .poll_observed(request.kind(), &handle, cancel, |polls| observer.on_poll(polls))
        .await;

    observer.on_finished(request, &outcome);

    JobRun::Completed { handle, outcome }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::poller::PollOptions;
    use crate::poller::tests::{Reply, ScriptedBackend};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use ttadmin_core::domain::job::JobStatus;
    use ttadmin_core::domain::snapshot::{SnapshotType, StorageComponent};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl JobObserver for Recorder {
        fn on_submitted(&mut self, request: &JobRequest, handle: &JobHandle) {
            self.events
                .push(format!("submitted {} as {}", request.action(), handle));
        }

        fn on_rejected(&mut self, request: &JobRequest) {
            self.events.push(format!("rejected {}", request.action()));
        }

        fn on_poll(&mut self, polls: u32) {
            self.events.push(format!("poll {}", polls));
        }

        fn on_finished(&mut self, _request: &JobRequest, outcome: &PollOutcome) {
            self.events.push(format!("finished {}", outcome.status()));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_submission_starts_no_poll() {
        let backend = Arc::new(ScriptedBackend::rejecting());
        let poller = JobPoller::new(Arc::clone(&backend), PollOptions::default());
        let mut recorder = Recorder::default();

        let run = run_job(
            &poller,
            &JobRequest::snapshot(SnapshotType::WholeSystem),
            &CancelSignal::never(),
            &mut recorder,
        )
        .await;

        assert_eq!(run, JobRun::Rejected);
        assert_eq!(backend.queries(), 0);
        assert_eq!(recorder.events, vec!["rejected make_new"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_observer_sees_full_lifecycle() {
        let backend = Arc::new(ScriptedBackend::new(vec![
            Reply::Status(JobStatus::Running),
            Reply::Status(JobStatus::Success { result: None }),
        ]));
        let poller = JobPoller::new(Arc::clone(&backend), PollOptions::default());
        let mut recorder = Recorder::default();

        let run = run_job(
            &poller,
            &JobRequest::cleanse(StorageComponent::LocalStorage),
            &CancelSignal::never(),
            &mut recorder,
        )
        .await;

        assert!(run.is_success());
        assert_eq!(backend.submits.load(Ordering::SeqCst), 1);
        assert_eq!(
            recorder.events,
            vec!["submitted dell as 1", "poll 1", "finished success"]
        );
    }

    /// Backend that never answers a submission
    struct StalledSubmit;

    #[async_trait::async_trait]
    impl JobBackend for StalledSubmit {
        async fn submit(&self, _request: &JobRequest) -> crate::Result<JobHandle> {
            std::future::pending().await
        }

        async fn status(
            &self,
            _kind: ttadmin_core::domain::job::JobKind,
            _handle: &JobHandle,
        ) -> crate::Result<JobStatus> {
            Ok(JobStatus::Running)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_interrupts_unanswered_submission() {
        let poller = JobPoller::new(Arc::new(StalledSubmit), PollOptions::default());
        let (cancel, signal) = crate::poller::cancel_pair();
        let request = JobRequest::update_timetable();
        let mut recorder = Recorder::default();
        let started = tokio::time::Instant::now();

        let (run, _) = tokio::join!(
            run_job(&poller, &request, &signal, &mut recorder),
            async {
                tokio::time::sleep(std::time::Duration::from_secs(2)).await;
                cancel.cancel();
            }
        );

        assert_eq!(run, JobRun::Rejected);
        assert_eq!(started.elapsed(), std::time::Duration::from_secs(2));
        assert_eq!(recorder.events, vec!["rejected update_timetable"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_run_is_not_success() {
        let backend = Arc::new(ScriptedBackend::new(vec![]));
        let options = PollOptions::new(
            std::time::Duration::from_secs(3),
            std::time::Duration::from_secs(1),
        );
        let poller = JobPoller::new(backend, options);

        let run = run_job(
            &poller,
            &JobRequest::update_timetable(),
            &CancelSignal::never(),
            &mut NoopObserver,
        )
        .await;

        assert!(!run.is_success());
        assert!(matches!(
            run.outcome(),
            Some(PollOutcome::TimedOut { polls: 3 })
        ));
    }
}
