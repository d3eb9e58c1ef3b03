//! Configuration file commands.

use std::path::Path;

use clap::Subcommand;
use console::style;

use gb_core::config::AppConfig;
use gb_core::error::{GbError, GbResult};

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective configuration (file plus environment) as TOML.
    Show,
    /// Write a default configuration file.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

pub fn run(config: &AppConfig, path: &Path, action: ConfigAction) -> GbResult<()> {
    match action {
        ConfigAction::Show => {
            println!("# {}", path.display());
            println!("{}", render(config)?);
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(GbError::Config(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )));
            }
            AppConfig::default().save_to_file(path)?;
            println!("{} wrote {}", style("ok").green(), path.display());
        }
    }
    Ok(())
}

/// Effective configuration as TOML with the access token masked.
fn render(config: &AppConfig) -> GbResult<String> {
    let mut shown = config.clone();
    if !shown.credentials.access_token.is_empty() {
        shown.credentials.access_token = "<redacted>".into();
    }
    toml::to_string_pretty(&shown).map_err(|e| GbError::Config(format!("failed to serialize config: {e}")))
}
