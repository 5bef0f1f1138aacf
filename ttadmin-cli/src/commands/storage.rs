//! Storage cleansing command handlers

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use std::io::{BufRead, Write};
use std::sync::Arc;
use ttadmin_client::runner::{JobRun, run_job};
use ttadmin_core::domain::job::JobRequest;
use ttadmin_core::domain::snapshot::StorageComponent;

use super::{cancel_on_ctrl_c, job_poller, unfinished_reason};
use crate::config::Config;
use crate::progress::ConsoleProgress;

/// Storage subcommands
#[derive(Subcommand)]
pub enum StorageCommands {
    /// Clear a storage component
    Clean {
        /// Component (whole-system, all-storages, google-drive, yandex-drive, local-storage)
        component: StorageComponent,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Handle storage commands
pub async fn handle_storage_command(command: StorageCommands, config: &Config) -> Result<()> {
    match command {
        StorageCommands::Clean { component, yes } => clean(config, component, yes).await,
    }
}

/// `true` for an answer starting with y/Y
fn is_confirmed(answer: &str) -> bool {
    matches!(answer.trim().chars().next(), Some('y' | 'Y'))
}

fn confirm(target: &str) -> Result<bool> {
    print!("Are you sure you want to clear: {}? [y/N] ", target.bold());
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;
    Ok(is_confirmed(&answer))
}

async fn clean(config: &Config, component: StorageComponent, yes: bool) -> Result<()> {
    let target = component.as_str().to_lowercase();
    if !yes && !confirm(&target)? {
        println!("Cleansing cancelled.");
        return Ok(());
    }

    let poller = job_poller(Arc::new(config.client()));
    let request = JobRequest::cleanse(component);
    let run = run_job(
        &poller,
        &request,
        &cancel_on_ctrl_c(),
        &mut ConsoleProgress::default(),
    )
    .await;

    if run.is_success() {
        println!(
            "{}",
            format!("✓ Cleansing \"{}\" completed successfully!", target)
                .green()
                .bold()
        );
        return Ok(());
    }

    if let JobRun::Completed { outcome, .. } = &run {
        let status = outcome.status();
        let reason = status
            .error_message()
            .map(str::to_string)
            .or_else(|| unfinished_reason(outcome));
        if let Some(reason) = reason {
            println!("  {} {}", "Reason:".yellow(), reason);
        }
    }

    bail!("Could not complete cleansing \"{}\"!", target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(clap::Parser)]
    struct StorageCli {
        #[command(subcommand)]
        command: StorageCommands,
    }

    #[test]
    fn test_help_lists_every_component() {
        use clap::CommandFactory;

        let cli = StorageCli::command();
        let help = cli
            .find_subcommand("clean")
            .and_then(|clean| clean.get_arguments().find(|arg| arg.get_id() == "component"))
            .and_then(|arg| arg.get_help())
            .map(|help| help.to_string())
            .unwrap();

        for component in StorageComponent::ALL {
            assert!(help.contains(component.slug()), "{} missing", component.slug());
        }
    }

    #[test]
    fn test_whole_system_is_accepted() {
        use clap::Parser;

        let cli = StorageCli::try_parse_from(["storage", "clean", "whole-system", "--yes"]).unwrap();
        let StorageCommands::Clean { component, yes } = cli.command;
        assert_eq!(component, StorageComponent::WholeSystem);
        assert!(yes);
    }

    #[test]
    fn test_confirmation_answers() {
        assert!(is_confirmed("y\n"));
        assert!(is_confirmed("Yes"));
        assert!(!is_confirmed("\n"));
        assert!(!is_confirmed("n"));
        assert!(!is_confirmed("  "));
    }
}
