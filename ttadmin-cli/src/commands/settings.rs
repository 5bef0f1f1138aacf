//! Settings command handlers
//!
//! Saves system parameters and uploads the Google Drive credentials file.

use anyhow::{Context, Result, bail};
use clap::Subcommand;
use colored::*;
use std::path::PathBuf;
use ttadmin_core::domain::settings::{SettingsDraft, SystemParams};

use crate::config::Config;

/// Settings subcommands
#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Change system parameters (only the given ones are sent)
    Set {
        /// Timetable refresh period in minutes
        #[arg(long)]
        time_update: Option<String>,

        /// Root url of the site the timetable is read from
        #[arg(long)]
        analyze_url: Option<String>,

        /// Storage for downloaded files (e.g. "google drive", "local")
        #[arg(long)]
        storage: Option<String>,
    },
    /// Upload the Google Drive credentials file
    UploadAuth {
        /// Path to the .json credentials file
        file: PathBuf,
    },
}

/// Handle settings commands
pub async fn handle_settings_command(command: SettingsCommands, config: &Config) -> Result<()> {
    match command {
        SettingsCommands::Set {
            time_update,
            analyze_url,
            storage,
        } => set_params(config, time_update, analyze_url, storage).await,
        SettingsCommands::UploadAuth { file } => upload_auth(config, file).await,
    }
}

/// Build the draft the operator's flags describe
fn draft_from_flags(
    time_update: Option<String>,
    analyze_url: Option<String>,
    storage: Option<String>,
) -> SettingsDraft {
    let mut draft = SettingsDraft::new(SystemParams::default());
    if let Some(minutes) = time_update {
        draft.set_time_update(minutes);
    }
    if let Some(url) = analyze_url {
        draft.set_analyze_url(url);
    }
    if let Some(storage) = storage {
        draft.set_download_storage(storage);
    }
    draft
}

async fn set_params(
    config: &Config,
    time_update: Option<String>,
    analyze_url: Option<String>,
    storage: Option<String>,
) -> Result<()> {
    let mut draft = draft_from_flags(time_update, analyze_url, storage);
    if !draft.is_dirty() {
        bail!("Nothing to change: pass --time-update, --analyze-url or --storage");
    }

    let changes = draft.changes();
    config
        .client()
        .set_system_params(&changes)
        .await
        .context("Failed to save settings")?;
    draft.commit();

    println!("{}", "✓ Settings saved!".green().bold());
    let saved = draft.baseline();
    for (name, value) in [
        ("time_update", &saved.time_update),
        ("analyze_url", &saved.analyze_url),
        ("download_storage", &saved.download_storage),
    ] {
        if let Some(value) = value {
            println!("  {} = {}", name.cyan(), value);
        }
    }

    Ok(())
}

async fn upload_auth(config: &Config, file: PathBuf) -> Result<()> {
    config
        .client()
        .upload_auth_file(&file)
        .await
        .with_context(|| format!("Failed to upload {}", file.display()))?;

    println!(
        "{}",
        "✓ Credentials file uploaded successfully!".green().bold()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_contains_only_given_flags() {
        let draft = draft_from_flags(Some("45".to_string()), None, None);
        assert!(draft.is_dirty());
        assert_eq!(
            draft.changes(),
            SystemParams {
                time_update: Some("45".to_string()),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_no_flags_is_clean() {
        assert!(!draft_from_flags(None, None, None).is_dirty());
    }
}
