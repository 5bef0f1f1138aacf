//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod settings;
mod snapshot;
mod storage;
mod timetable;

pub use settings::SettingsCommands;
pub use snapshot::SnapshotCommands;
pub use storage::StorageCommands;
pub use timetable::TimetableCommands;

use anyhow::Result;
use clap::Subcommand;
use std::sync::Arc;
use ttadmin_client::poller::{DEFAULT_POLL_TIMEOUT, cancel_pair};
use ttadmin_client::{AdminClient, CancelSignal, JobPoller, PollOptions, PollOutcome};

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// System settings and credentials
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
    /// System snapshots
    Snapshot {
        #[command(subcommand)]
        command: SnapshotCommands,
    },
    /// Storage cleansing
    Storage {
        #[command(subcommand)]
        command: StorageCommands,
    },
    /// Timetable refresh
    Timetable {
        #[command(subcommand)]
        command: TimetableCommands,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Settings { command } => settings::handle_settings_command(command, config).await,
        Commands::Snapshot { command } => snapshot::handle_snapshot_command(command, config).await,
        Commands::Storage { command } => storage::handle_storage_command(command, config).await,
        Commands::Timetable { command } => {
            timetable::handle_timetable_command(command, config).await
        }
    }
}

/// Poller with the fixed 600s / 1s schedule
fn job_poller(client: Arc<AdminClient>) -> JobPoller<AdminClient> {
    JobPoller::new(client, PollOptions::default())
}

/// Signal that fires on Ctrl-C
fn cancel_on_ctrl_c() -> CancelSignal {
    let (handle, signal) = cancel_pair();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.cancel();
        }
    });
    signal
}

/// Why a job ended without a terminal status
fn unfinished_reason(outcome: &PollOutcome) -> Option<String> {
    match outcome {
        PollOutcome::Finished(_) => None,
        PollOutcome::TimedOut { polls } => Some(format!(
            "still running after {}s ({} status checks)",
            DEFAULT_POLL_TIMEOUT.as_secs(),
            polls
        )),
        PollOutcome::Cancelled { .. } => Some("interrupted before the job finished".to_string()),
        PollOutcome::Unreachable { last_error, .. } => {
            Some(format!("backend unreachable: {}", last_error))
        }
    }
}
