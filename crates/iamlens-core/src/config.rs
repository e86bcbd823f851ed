//! Configuration for iamlens
//!
//! Loaded in this order, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. `~/.iamlens/config.toml`
//! 3. The file named by `IAMLENS_CONFIG_PATH`
//! 4. `IAMLENS_*` environment variables (e.g. `IAMLENS_CATALOG_URL`)

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{LensError, Result};

/// Public service reference catalog
pub const DEFAULT_CATALOG_URL: &str = "https://servicereference.us-east-1.amazonaws.com/";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LensConfig {
    /// Where the service catalog is fetched from
    pub catalog_url: String,
    pub user_agent: String,
    /// Per-request timeout for document fetches
    pub timeout_secs: u64,
}

impl Default for LensConfig {
    fn default() -> Self {
        Self {
            catalog_url: DEFAULT_CATALOG_URL.to_string(),
            user_agent: format!("iamlens/{}", env!("CARGO_PKG_VERSION")),
            timeout_secs: 30,
        }
    }
}

impl LensConfig {
    /// Load from the default file locations and the environment
    pub fn load() -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(LensConfig::default()));

        if let Some(path) = default_config_path() {
            figment = figment.merge(Toml::file(path));
        }
        if let Ok(path) = std::env::var("IAMLENS_CONFIG_PATH") {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("IAMLENS_").ignore(&["config_path"]));

        Self::extract(figment)
    }

    /// Load from one file on top of the defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let figment = Figment::from(Serialized::defaults(LensConfig::default()))
            .merge(Toml::file(path.as_ref()));
        Self::extract(figment)
    }

    /// Replace the catalog location, e.g. from a command-line flag
    pub fn with_catalog_url(mut self, url: impl Into<String>) -> Result<Self> {
        self.catalog_url = url.into();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let url = self.catalog_url.trim();
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(LensError::Config(format!(
                "catalog_url must be an http(s) URL, got '{}'",
                self.catalog_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(LensError::Config("timeout_secs must be greater than zero".into()));
        }
        Ok(())
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: LensConfig = figment
            .extract()
            .map_err(|e| LensError::Config(format!("Failed to load configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

/// `~/.iamlens/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".iamlens").join("config.toml"))
}
