//! Configuration management for aqportal.
//!
//! Settings cover where the JSON collections live, the admin credentials,
//! the default size of the top regions report and sample data seeding.
//! Values are layered with figment: defaults, then the TOML file, then
//! `AQPORTAL_` environment variables.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default application directory name.
const APP_DIR_NAME: &str = "aqportal";

/// Sub-directory holding the JSON collections.
const DATA_SUBDIR_NAME: &str = "data";

/// Stock admin login, stored in config as a digest only.
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `AQPORTAL_`, sections split by `__`)
/// 2. TOML config file at `~/.config/aqportal/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Administrator credentials.
    pub admin: AdminConfig,
    /// Report configuration.
    pub reports: ReportsConfig,
    /// Sample data configuration.
    pub seed: SeedConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the JSON collection files.
    /// Defaults to `~/.local/share/aqportal/data`
    pub data_dir: Option<PathBuf>,
}

/// Administrator credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Admin login name.
    pub username: String,
    /// Lowercase hex BLAKE3 digest of the admin password.
    pub password_blake3: String,
}

/// Report-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Number of regions shown in the top polluted regions report.
    /// Set to 0 for all.
    pub top_regions: usize,
}

/// Sample data configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Populate an empty store with sample data on first run.
    pub sample_data: bool,
    /// Seed for the sample data generator.
    pub rng_seed: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            password_blake3: crate::auth::digest(DEFAULT_ADMIN_PASSWORD),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            sample_data: true,
            rng_seed: 42,
        }
    }
}

fn is_hex_digest(value: &str) -> bool {
    value.len() == 64 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `AQPORTAL_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("AQPORTAL_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(APP_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(APP_DIR_NAME)
            .join(DATA_SUBDIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.admin.username.trim().is_empty() {
            return Err(Error::config_validation("admin.username must not be empty"));
        }

        if !is_hex_digest(&self.admin.password_blake3) {
            return Err(Error::config_validation(
                "admin.password_blake3 must be a 64 character hex BLAKE3 digest",
            ));
        }

        Ok(())
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.storage
            .data_dir
            .clone()
            .unwrap_or_else(Self::default_data_dir)
    }

    /// Get the report limit, `None` meaning all regions.
    #[must_use]
    pub fn top_regions_limit(&self) -> Option<usize> {
        match self.reports.top_regions {
            0 => None,
            n => Some(n),
        }
    }
}
