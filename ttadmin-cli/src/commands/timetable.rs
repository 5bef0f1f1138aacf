//! Timetable command handlers

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::*;
use std::sync::Arc;
use ttadmin_client::runner::{JobRun, run_job};
use ttadmin_core::domain::job::{JobRequest, JobStatus};

use super::{cancel_on_ctrl_c, job_poller, unfinished_reason};
use crate::config::Config;
use crate::progress::ConsoleProgress;

/// Timetable subcommands
#[derive(Subcommand)]
pub enum TimetableCommands {
    /// Re-read the timetable from the source site and wait for it
    Update,
}

/// Handle timetable commands
pub async fn handle_timetable_command(command: TimetableCommands, config: &Config) -> Result<()> {
    match command {
        TimetableCommands::Update => update(config).await,
    }
}

/// Failure text for an `error` status, detail included
fn failure_text(message: &str, detail: Option<&serde_json::Value>) -> String {
    let detail = detail
        .map(|d| serde_json::to_string_pretty(d).unwrap_or_else(|_| d.to_string()))
        .unwrap_or_else(|| "{}".to_string());
    format!("Update failed: {}\nDetails: {}", message, detail)
}

async fn update(config: &Config) -> Result<()> {
    let poller = job_poller(Arc::new(config.client()));
    let run = run_job(
        &poller,
        &JobRequest::update_timetable(),
        &cancel_on_ctrl_c(),
        &mut ConsoleProgress::default(),
    )
    .await;

    let outcome = match run {
        JobRun::Rejected => bail!("Could not start the timetable update"),
        JobRun::Completed { outcome, .. } => outcome,
    };

    match outcome.status() {
        JobStatus::Success { .. } => {
            println!(
                "{}",
                "✓ Timetable update completed successfully!".green().bold()
            );
            Ok(())
        }
        JobStatus::Error { message, detail } => bail!(failure_text(&message, detail.as_ref())),
        JobStatus::Running => {
            let reason = unfinished_reason(&outcome).unwrap_or_default();
            bail!("Timetable update did not finish: {}", reason)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_text_includes_detail() {
        let text = failure_text("parse error", Some(&json!({"line": 4})));
        assert!(text.starts_with("Update failed: parse error\nDetails: "));
        assert!(text.contains("\"line\": 4"));
    }

    #[test]
    fn test_failure_text_without_detail() {
        assert_eq!(
            failure_text("boom", None),
            "Update failed: boom\nDetails: {}"
        );
    }
}
