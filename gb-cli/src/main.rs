//! Gatrabali Functions CLI - Local invocation runtime for the handlers.
//!
//! Feeds a trigger message from a file or stdin to `SyncData` or
//! `SendPushNotification` and reports the outcome through the exit status.
//! Also manages the local SQLite document store and the configuration file.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use gb_core::config::AppConfig;
use gb_core::error::GbResult;
use gb_core::init_logging;

/// Gatrabali functions, run locally.
#[derive(Parser)]
#[command(
    name = "gatrabali-fn",
    version,
    about = "Run the Gatrabali sync and push notification handlers locally",
    long_about = "Invoke the SyncData and SendPushNotification handlers with a Pub/Sub message\n\
                  read from a file or stdin, and manage the local document store."
)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the SyncData handler.
    SyncData {
        #[command(flatten)]
        input: commands::invoke::InputArgs,
    },
    /// Run the SendPushNotification handler.
    SendPush {
        #[command(flatten)]
        input: commands::invoke::InputArgs,
    },
    /// Manage the local document store.
    Store {
        #[command(subcommand)]
        action: commands::store::StoreAction,
    },
    /// View or create the configuration file.
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() -> GbResult<()> {
    let cli = Cli::parse();

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => AppConfig::default_config_path()?,
    };
    let mut config = if config_path.exists() {
        AppConfig::load_from_file(&config_path)?
    } else {
        AppConfig::default()
    };
    config.apply_env_overrides();

    let _guard = init_logging(&config.logging, cli.verbose)?;

    debug!("gatrabali-fn v{}", gb_core::constants::APP_VERSION);

    match cli.command {
        Commands::SyncData { input } => commands::invoke::sync_data(config, input).await,
        Commands::SendPush { input } => commands::invoke::send_push(config, input).await,
        Commands::Store { action } => commands::store::run(&config, action),
        Commands::Config { action } => commands::config::run(&config, &config_path, action),
    }
}
