//! Application configuration loading from `maintenance-gate.toml`.
//!
//! Every field has a default, so a missing file is not an error. Selected
//! fields can be overridden from the environment (after `.env` is loaded).

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "maintenance-gate.toml";

/// Settings for the web host around the gate
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Socket address the server listens on
    pub bind_addr: String,
    /// `SeaORM` connection string for the option store
    pub database_url: String,
    /// Directory holding the site's static content
    pub site_root: PathBuf,
    /// Public base URL of the site, used for the emergency login link
    pub home_url: String,
    /// Bearer tokens that identify an administrator
    pub admin_tokens: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            database_url: DEFAULT_DATABASE_URL.to_string(),
            site_root: PathBuf::from("public"),
            home_url: "http://localhost:8080".to_string(),
            admin_tokens: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Applies `DATABASE_URL`, `MAINTENANCE_BIND_ADDR` and `MAINTENANCE_ADMIN_TOKENS`.
    ///
    /// `lookup` abstracts the environment so tests don't touch process state.
    #[must_use]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = url;
        }
        if let Some(addr) = lookup("MAINTENANCE_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(tokens) = lookup("MAINTENANCE_ADMIN_TOKENS") {
            self.admin_tokens = tokens
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        self
    }
}

/// Parses an `AppConfig` from a TOML file.
///
/// # Errors
/// Returns `Error::Config` if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads the configuration the binary runs with.
///
/// Reads `path` (or [`DEFAULT_CONFIG_PATH`]) when it exists, falls back to
/// defaults otherwise, then applies environment overrides.
pub fn load_app_configuration(path: Option<&Path>) -> Result<AppConfig> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH));
    let config = if path.exists() {
        load_config(path)?
    } else {
        info!(
            "No configuration file at {}, using defaults",
            path.display()
        );
        AppConfig::default()
    };

    Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
}
