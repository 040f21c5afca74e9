//! ctfd-alerts — watch a CTFd competition and push ntfy alerts when the
//! tracked team is overtaken or a new challenge is released.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::tty::IsTty;
use tracing::info;

use ctfd_alerts::config::{AppConfig, CONFIG_PATH};
use ctfd_alerts::ctfd::{CtfdClient, SnapshotSource};
use ctfd_alerts::dashboard;
use ctfd_alerts::monitor::{self, Monitor};
use ctfd_alerts::ntfy::NtfyClient;
use ctfd_alerts::state::StateStore;

#[derive(Parser)]
#[command(
    name = "ctfd-alerts",
    version,
    about = "A tool for monitoring CTFd competitions",
    long_about = "Monitors CTFd-based competitions and sends ntfy notifications when \
                  someone bypasses you or a new challenge is announced."
)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Continuously monitor the scoreboard and challenges, sending alerts
    #[command(alias = "serve")]
    Monitor,
    /// Show the current scoreboard and challenge list
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)?;
    init_tracing(config.debug);
    info!(
        "Loaded config from {} (user: {}, interval: {}s)",
        cli.config.display(),
        config.user,
        config.interval
    );

    let ctfd = CtfdClient::new(
        &config.ctfd.api_base,
        &config.ctfd.api_key,
        config.ctfd.insecure_skip_verify,
    )
    .context("failed to build CTFd client")?;

    match cli.command {
        Command::Monitor => run_monitor(&config, ctfd).await,
        Command::Status => run_status(&ctfd).await,
    }
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run_monitor(config: &AppConfig, ctfd: CtfdClient) -> Result<()> {
    let ntfy = NtfyClient::new(
        &config.ntfy.topic,
        &config.ntfy.api_base,
        &config.ntfy.access_token,
        config.ntfy.insecure_skip_verify,
    )
    .context("failed to build ntfy client")?;

    let monitor = Monitor::new(
        ctfd,
        ntfy,
        StateStore::default(),
        &config.user,
        Duration::from_secs(config.interval),
    );
    monitor.run(monitor::shutdown_signal()).await;
    Ok(())
}

async fn run_status(ctfd: &CtfdClient) -> Result<()> {
    let scoreboard = ctfd
        .fetch_scoreboard()
        .await
        .context("error fetching scoreboard")?;
    let challenges = ctfd
        .fetch_challenges()
        .await
        .context("error fetching challenges")?;

    let color = std::io::stdout().is_tty();
    print!("{}", dashboard::render(&scoreboard, &challenges, color));
    Ok(())
}
