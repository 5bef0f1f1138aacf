//! ttadmin CLI
//!
//! Command-line interface for the admin surface of the timetable service:
//! system settings, credentials, snapshots, storage cleansing and
//! timetable refresh.

mod commands;
mod config;
mod progress;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ttadmin")]
#[command(about = "Timetable service admin CLI", long_about = None)]
struct Cli {
    /// Base URL of the timetable service
    #[arg(long, env = "TTADMIN_BASE_URL", default_value = "http://localhost:8000")]
    base_url: String,

    /// CSRF token sent with mutating requests
    #[arg(long, env = "TTADMIN_CSRF_TOKEN")]
    csrf_token: Option<String>,

    /// Session id of a logged-in staff user
    #[arg(long, env = "TTADMIN_SESSION_ID")]
    session_id: Option<String>,

    /// Raw Cookie header (overrides --session-id; supplies the CSRF token
    /// from its csrftoken entry when --csrf-token is not given)
    #[arg(long, env = "TTADMIN_COOKIE")]
    cookie: Option<String>,

    /// Log client activity to stderr
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "ttadmin=debug,ttadmin_client=debug"
    } else {
        "ttadmin=warn,ttadmin_client=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config {
        base_url: cli.base_url,
        csrf_token: cli.csrf_token,
        session_id: cli.session_id,
        cookie: cli.cookie,
    };
    config.validate()?;

    handle_command(cli.command, &config).await
}
