//! Snapshot command handlers

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;
use ttadmin_client::AdminClient;
use ttadmin_client::runner::{JobRun, run_job};
use ttadmin_core::domain::job::JobRequest;
use ttadmin_core::domain::snapshot::{SnapshotLinks, SnapshotType};

use super::{cancel_on_ctrl_c, job_poller, unfinished_reason};
use crate::config::Config;
use crate::progress::ConsoleProgress;

/// Snapshot subcommands
#[derive(Subcommand)]
pub enum SnapshotCommands {
    /// Create a new snapshot and wait for it
    Create {
        /// Snapshot type (whole-system, database, google-drive, yandex-drive, local-storage)
        snapshot_type: SnapshotType,

        /// Download the resulting snapshot into this directory
        #[arg(long)]
        download: Option<PathBuf>,
    },
    /// Show the latest link of every snapshot type
    Links,
    /// Download the latest snapshot of a type
    Download {
        /// Snapshot type
        snapshot_type: SnapshotType,

        /// Directory to save the file into
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

/// Handle snapshot commands
pub async fn handle_snapshot_command(command: SnapshotCommands, config: &Config) -> Result<()> {
    match command {
        SnapshotCommands::Create {
            snapshot_type,
            download,
        } => create_snapshot(config, snapshot_type, download).await,
        SnapshotCommands::Links => list_links(config).await,
        SnapshotCommands::Download {
            snapshot_type,
            output,
        } => download_latest(config, snapshot_type, &output).await,
    }
}

async fn create_snapshot(
    config: &Config,
    snapshot_type: SnapshotType,
    download: Option<PathBuf>,
) -> Result<()> {
    let client = Arc::new(config.client());

    let mut links = SnapshotLinks::new();
    match client.last_snapshot_url(snapshot_type).await {
        Ok(url) => links.set(snapshot_type, url),
        Err(e) => warn!("Could not look up the previous '{}' snapshot: {}", snapshot_type, e),
    }

    let poller = job_poller(Arc::clone(&client));
    let request = JobRequest::snapshot(snapshot_type);
    let run = run_job(
        &poller,
        &request,
        &cancel_on_ctrl_c(),
        &mut ConsoleProgress::default(),
    )
    .await;

    let created = match &run {
        JobRun::Rejected => false,
        JobRun::Completed { outcome, .. } => {
            let status = outcome.status();
            if status.is_success() {
                links.set(snapshot_type, status.download_url().map(str::to_string));
                println!(
                    "{}",
                    format!(
                        "✓ Snapshot \"{}\" created and ready to download!",
                        snapshot_type
                    )
                    .green()
                    .bold()
                );
                true
            } else {
                let reason = status
                    .error_message()
                    .map(str::to_string)
                    .or_else(|| unfinished_reason(outcome));
                if let Some(reason) = reason {
                    println!("  {} {}", "Reason:".yellow(), reason);
                }
                false
            }
        }
    };

    match links.get(snapshot_type) {
        Some(link) => {
            if !created {
                println!(
                    "  {} the previous snapshot is still available: {}",
                    "Note:".yellow(),
                    link
                );
            }
            if let Some(dir) = &download {
                save(&client, link, dir).await?;
            }
        }
        None if created && download.is_some() => {
            warn!("Snapshot finished without a download link");
        }
        None => {}
    }

    if !created {
        bail!("Could not create snapshot \"{}\"!", snapshot_type);
    }
    Ok(())
}

async fn list_links(config: &Config) -> Result<()> {
    let client = config.client();
    let mut links = SnapshotLinks::new();
    let refreshed = client.refresh_snapshot_links(&mut links).await;
    if refreshed == 0 {
        bail!("Could not fetch any snapshot links from {}", client.base_url());
    }

    println!("{}", "Latest snapshots:".bold());
    for (snapshot_type, link) in links.iter() {
        match link {
            Some(link) => println!("  {} {:<22} {}", "▸".cyan(), snapshot_type, link),
            None => println!("  {} {:<22} {}", "▸".cyan(), snapshot_type, "-".dimmed()),
        }
    }

    Ok(())
}

async fn download_latest(config: &Config, snapshot_type: SnapshotType, output: &Path) -> Result<()> {
    let client = config.client();
    let link = client
        .last_snapshot_url(snapshot_type)
        .await
        .with_context(|| format!("Failed to look up the latest '{}' snapshot", snapshot_type))?;

    let Some(link) = link else {
        bail!("No \"{}\" snapshot has been made yet", snapshot_type);
    };

    save(&client, &link, output).await
}

async fn save(client: &AdminClient, link: &str, dir: &Path) -> Result<()> {
    let path = client
        .download_snapshot(link, dir)
        .await
        .with_context(|| format!("Failed to download {}", link))?;
    println!("{} Saved to {}", "✓".green(), path.display());
    Ok(())
}
