#[cfg(feature = "cli")]
pub mod cli;
pub mod credentials;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use credentials::RemoteCredentials;

use crate::utils::error::{DeliveryError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_TRIGGER_PREFIX: &str = "processed/";
pub const DEFAULT_SOURCE_REMOTE: &str = "gcs";
pub const DEFAULT_DESTINATION: &str = "otc:planet-data-prod";
pub const DEFAULT_RCLONE_VERSION: &str = "v1.68.2";
pub const DEFAULT_RCLONE_PLATFORM: &str = "linux-amd64";
pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://downloads.rclone.org";
pub const DEFAULT_DOWNLOAD_TIMEOUT_SECS: u64 = 300;

/// Runtime settings for one delivery function deployment.
///
/// Values are layered: built-in defaults, then an optional TOML file, then
/// environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub trigger_prefix: String,
    pub source_remote: String,
    pub destination: String,
    pub rclone_version: String,
    pub rclone_platform: String,
    pub download_base_url: String,
    pub download_timeout_secs: u64,
    pub scratch_root: Option<PathBuf>,
    pub tool_cache_dir: Option<PathBuf>,
    pub fail_on_transfer_error: bool,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            trigger_prefix: DEFAULT_TRIGGER_PREFIX.to_string(),
            source_remote: DEFAULT_SOURCE_REMOTE.to_string(),
            destination: DEFAULT_DESTINATION.to_string(),
            rclone_version: DEFAULT_RCLONE_VERSION.to_string(),
            rclone_platform: DEFAULT_RCLONE_PLATFORM.to_string(),
            download_base_url: DEFAULT_DOWNLOAD_BASE_URL.to_string(),
            download_timeout_secs: DEFAULT_DOWNLOAD_TIMEOUT_SECS,
            scratch_root: None,
            tool_cache_dir: None,
            fail_on_transfer_error: false,
        }
    }
}

impl DeliveryConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Defaults (or the given file) overlaid with the process environment, validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get("DELIVERY_TRIGGER_PREFIX") {
            self.trigger_prefix = value;
        }
        if let Some(value) = get("DELIVERY_SOURCE_REMOTE") {
            self.source_remote = value;
        }
        if let Some(value) = get("DELIVERY_DESTINATION") {
            self.destination = value;
        }
        if let Some(value) = get("RCLONE_VERSION") {
            self.rclone_version = value;
        }
        if let Some(value) = get("RCLONE_PLATFORM") {
            self.rclone_platform = value;
        }
        if let Some(value) = get("RCLONE_DOWNLOAD_BASE_URL") {
            self.download_base_url = value;
        }
        if let Some(value) = get("RCLONE_DOWNLOAD_TIMEOUT_SECS") {
            self.download_timeout_secs =
                value
                    .parse()
                    .map_err(|_| DeliveryError::InvalidConfigValueError {
                        field: "RCLONE_DOWNLOAD_TIMEOUT_SECS".to_string(),
                        value: value.clone(),
                        reason: "Expected a whole number of seconds".to_string(),
                    })?;
        }
        if let Some(value) = get("DELIVERY_SCRATCH_ROOT") {
            self.scratch_root = Some(PathBuf::from(value));
        }
        if let Some(value) = get("RCLONE_CACHE_DIR") {
            self.tool_cache_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = get("DELIVERY_FAIL_ON_TRANSFER_ERROR") {
            self.fail_on_transfer_error = parse_flag("DELIVERY_FAIL_ON_TRANSFER_ERROR", &value)?;
        }
        Ok(())
    }

    pub fn scratch_root(&self) -> PathBuf {
        self.scratch_root
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}

fn parse_flag(field: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DeliveryError::InvalidConfigValueError {
            field: field.to_string(),
            value: value.to_string(),
            reason: "Expected true or false".to_string(),
        }),
    }
}

impl Validate for DeliveryConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("trigger_prefix", &self.trigger_prefix)?;
        validation::validate_non_empty_string("source_remote", &self.source_remote)?;
        validation::validate_remote_location("destination", &self.destination)?;
        validation::validate_non_empty_string("rclone_version", &self.rclone_version)?;
        validation::validate_non_empty_string("rclone_platform", &self.rclone_platform)?;
        validation::validate_url("download_base_url", &self.download_base_url)?;
        validation::validate_range("download_timeout_secs", self.download_timeout_secs, 1, 3600)?;

        if let Some(root) = &self.scratch_root {
            validation::validate_path("scratch_root", &root.to_string_lossy())?;
        }
        if let Some(cache) = &self.tool_cache_dir {
            validation::validate_path("tool_cache_dir", &cache.to_string_lossy())?;
        }

        tracing::debug!("Delivery configuration validation passed");
        Ok(())
    }
}
