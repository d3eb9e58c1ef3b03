//! Platform directory helpers.

use std::path::PathBuf;
use crate::constants::APP_NAME;
use crate::error::{GbError, GbResult};

/// Platform-specific locations for configuration and local data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform;

impl Platform {
    /// Get the platform-specific application data directory.
    ///
    /// - Windows: `%APPDATA%/gatrabali`
    /// - macOS: `~/Library/Application Support/gatrabali`
    /// - Linux: `~/.local/share/gatrabali`
    pub fn data_dir() -> GbResult<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| GbError::Config("could not determine data directory".into()))?;
        Ok(base.join(APP_NAME))
    }

    /// Get the platform-specific configuration directory.
    ///
    /// - Windows: `%APPDATA%/gatrabali`
    /// - macOS: `~/Library/Application Support/gatrabali`
    /// - Linux: `~/.config/gatrabali`
    pub fn config_dir() -> GbResult<PathBuf> {
        let base = dirs::config_dir()
            .ok_or_else(|| GbError::Config("could not determine config directory".into()))?;
        Ok(base.join(APP_NAME))
    }
}
