//! Console progress for running jobs
//!
//! Stands in for the spinner of the web console: one line when the job
//! starts, a dot per status check, and the elapsed time at the end.

use chrono::{DateTime, Local};
use colored::*;
use std::io::Write;
use tracing::debug;
use ttadmin_client::PollOutcome;
use ttadmin_client::runner::JobObserver;
use ttadmin_core::domain::job::{JobHandle, JobRequest};

/// Prints job progress to stdout
#[derive(Debug, Default)]
pub struct ConsoleProgress {
    started: Option<DateTime<Local>>,
    polls: u32,
}

impl ConsoleProgress {
    /// Status queries issued over the whole run
    fn status_checks(&self, outcome: &PollOutcome) -> u32 {
        match outcome {
            PollOutcome::TimedOut { polls }
            | PollOutcome::Cancelled { polls }
            | PollOutcome::Unreachable { polls, .. } => *polls,
            // the terminal query does not reach on_poll
            PollOutcome::Finished(_) => self.polls + 1,
        }
    }
}

/// Print without a newline and push it to the terminal right away
fn print_now(text: impl std::fmt::Display) {
    let mut stdout = std::io::stdout().lock();
    if let Err(e) = write!(stdout, "{}", text).and_then(|_| stdout.flush()) {
        debug!("Failed to write progress: {}", e);
    }
}

impl JobObserver for ConsoleProgress {
    fn on_submitted(&mut self, request: &JobRequest, handle: &JobHandle) {
        let now = Local::now();
        self.started = Some(now);
        print_now(format!(
            "{} {} job {} started at {} ",
            "▸".cyan(),
            request.kind().label(),
            handle.to_string().dimmed(),
            now.format("%H:%M:%S").to_string().dimmed()
        ));
    }

    fn on_poll(&mut self, polls: u32) {
        self.polls = polls;
        print_now(".".dimmed());
    }

    fn on_finished(&mut self, _request: &JobRequest, outcome: &PollOutcome) {
        println!();
        if let Some(started) = self.started {
            let seconds = Local::now().signed_duration_since(started).num_seconds();
            println!(
                "  {} after {}s ({} status checks)",
                match outcome {
                    PollOutcome::Finished(_) => "Finished",
                    PollOutcome::TimedOut { .. } => "Timed out",
                    PollOutcome::Cancelled { .. } => "Cancelled",
                    PollOutcome::Unreachable { .. } => "Gave up",
                }
                .dimmed(),
                seconds,
                self.status_checks(outcome)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ttadmin_core::domain::job::JobStatus;

    fn after_polls(n: u32) -> ConsoleProgress {
        let mut progress = ConsoleProgress::default();
        for polls in 1..=n {
            progress.on_poll(polls);
        }
        progress
    }

    #[test]
    fn test_finished_counts_the_terminal_query() {
        let progress = after_polls(3);
        let done = PollOutcome::Finished(JobStatus::Success { result: None });
        assert_eq!(progress.status_checks(&done), 4);
    }

    #[test]
    fn test_unfinished_runs_use_the_outcome_count() {
        // a query interrupted by cancellation never reaches on_poll
        let progress = after_polls(2);
        assert_eq!(
            progress.status_checks(&PollOutcome::Cancelled { polls: 3 }),
            3
        );
        assert_eq!(
            progress.status_checks(&PollOutcome::TimedOut { polls: 600 }),
            600
        );
        assert_eq!(
            progress.status_checks(&PollOutcome::Unreachable {
                polls: 10,
                last_error: "connection refused".to_string(),
            }),
            10
        );
    }
}
