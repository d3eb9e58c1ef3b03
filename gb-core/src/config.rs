//! Function configuration management.
//!
//! Handles loading, saving, and accessing the configuration that the client
//! provider needs: the Google Cloud project, which document store backend to
//! use, where credentials come from, and how push and sync calls are made.
//! Configuration is persisted as TOML on disk, with a small environment
//! override layer for values the hosting runtime injects.

use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{GbError, GbResult};
use crate::platform::Platform;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Google Cloud project settings.
    #[serde(default)]
    pub project: ProjectConfig,

    /// Document store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Credential settings for Google APIs.
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Push notification settings.
    #[serde(default)]
    pub push: PushConfig,

    /// External sync collaborator settings.
    #[serde(default)]
    pub sync: SyncConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Google Cloud project configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project id used by both Firestore and FCM.
    #[serde(default)]
    pub id: String,
}

/// Which document store implementation backs the handlers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Cloud Firestore over its REST API.
    #[default]
    Firestore,
    /// Local SQLite document table.
    Sqlite,
}

/// Document store configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Firestore REST endpoint (overridable for the emulator).
    #[serde(default = "default_firestore_endpoint")]
    pub firestore_endpoint: String,

    /// Firestore database name.
    #[serde(default = "default_firestore_database")]
    pub firestore_database: String,

    /// Path to the SQLite database file. If empty, uses default location.
    #[serde(default)]
    pub sqlite_path: String,

    /// Maximum number of SQLite connections in the pool.
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_true")]
    pub wal_mode: bool,

    /// Request timeout for Firestore calls in milliseconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_ms: u64,
}

/// Credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// Static OAuth2 access token. If empty, the metadata server is used.
    #[serde(default)]
    pub access_token: String,

    /// Metadata server token URL.
    #[serde(default = "default_metadata_endpoint")]
    pub metadata_endpoint: String,
}

/// What to do with a token whose send failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrunePolicy {
    /// Drop the token on any send error.
    #[default]
    AnyError,
    /// Drop the token only when the push service says it is unregistered,
    /// not found, or bound to another sender. `INVALID_ARGUMENT` keeps it.
    InvalidToken,
}

/// Push notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// FCM HTTP v1 endpoint.
    #[serde(default = "default_fcm_endpoint")]
    pub endpoint: String,

    /// Android notification icon URL.
    #[serde(default = "default_icon_url")]
    pub icon_url: String,

    /// Android notification accent color.
    #[serde(default = "default_color")]
    pub color: String,

    /// Token pruning policy on send failure.
    #[serde(default)]
    pub prune_policy: PrunePolicy,

    /// Log messages instead of sending them.
    #[serde(default)]
    pub dry_run: bool,

    /// Request timeout for FCM calls in milliseconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_ms: u64,
}

/// External sync collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the sync service. Payloads are posted to `{endpoint}/{type}`.
    #[serde(default)]
    pub endpoint: String,

    /// Request timeout for sync calls in milliseconds.
    #[serde(default = "default_http_timeout")]
    pub timeout_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for log files. If empty, logs go to the console only.
    #[serde(default)]
    pub directory: String,

    /// Enable JSON structured logging output.
    #[serde(default)]
    pub json_output: bool,
}

// Default value functions for serde

fn default_true() -> bool {
    true
}

fn default_pool_size() -> u32 {
    4
}

fn default_http_timeout() -> u64 {
    constants::DEFAULT_HTTP_TIMEOUT_MS
}

fn default_firestore_endpoint() -> String {
    constants::DEFAULT_FIRESTORE_ENDPOINT.to_string()
}

fn default_firestore_database() -> String {
    constants::DEFAULT_FIRESTORE_DATABASE.to_string()
}

fn default_metadata_endpoint() -> String {
    constants::DEFAULT_METADATA_TOKEN_URL.to_string()
}

fn default_fcm_endpoint() -> String {
    constants::DEFAULT_FCM_ENDPOINT.to_string()
}

fn default_icon_url() -> String {
    constants::android::ICON_URL.to_string()
}

fn default_color() -> String {
    constants::android::COLOR.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            firestore_endpoint: default_firestore_endpoint(),
            firestore_database: default_firestore_database(),
            sqlite_path: String::new(),
            pool_size: default_pool_size(),
            wal_mode: true,
            timeout_ms: default_http_timeout(),
        }
    }
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            metadata_endpoint: default_metadata_endpoint(),
        }
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: default_fcm_endpoint(),
            icon_url: default_icon_url(),
            color: default_color(),
            prune_policy: PrunePolicy::default(),
            dry_run: false,
            timeout_ms: default_http_timeout(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            timeout_ms: default_http_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: String::new(),
            json_output: false,
        }
    }
}

impl LoggingConfig {
    /// The log file directory, if file logging is enabled.
    pub fn log_dir(&self) -> Option<PathBuf> {
        let dir = self.directory.trim();
        (!dir.is_empty()).then(|| PathBuf::from(dir))
    }
}

impl AppConfig {
    /// Load configuration from the default config file path.
    pub fn load_default() -> GbResult<Self> {
        let path = Self::default_config_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> GbResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a specific file path.
    pub fn save_to_file(&self, path: &Path) -> GbResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| GbError::Config(format!("failed to serialize config: {e}")))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> GbResult<PathBuf> {
        Ok(Platform::config_dir()?.join("config.toml"))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides using the given variable lookup.
    ///
    /// The project id is only taken from the environment when the file left
    /// it empty; a non-empty access token variable always wins.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.project.id.is_empty() {
            if let Some(id) = constants::ENV_PROJECT_IDS
                .iter()
                .filter_map(|key| lookup(key))
                .find(|v| !v.trim().is_empty())
            {
                self.project.id = id.trim().to_string();
            }
        }

        if let Some(token) = lookup(constants::ENV_ACCESS_TOKEN) {
            if !token.trim().is_empty() {
                self.credentials.access_token = token.trim().to_string();
            }
        }
    }

    /// The configured project id, or an error if none is set.
    pub fn project_id(&self) -> GbResult<&str> {
        if self.project.id.is_empty() {
            Err(GbError::MissingConfig(format!(
                "project.id (or one of {})",
                constants::ENV_PROJECT_IDS.join(", ")
            )))
        } else {
            Ok(&self.project.id)
        }
    }

    /// Get the effective SQLite path, using the configured path or the default.
    pub fn effective_sqlite_path(&self) -> GbResult<PathBuf> {
        if self.store.sqlite_path.is_empty() {
            Ok(Platform::data_dir()?.join("documents.db"))
        } else {
            Ok(PathBuf::from(&self.store.sqlite_path))
        }
    }
}
