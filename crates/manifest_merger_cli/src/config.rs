//! Configuration management for the manifest-merger CLI.
//!
//! The configuration is stored in TOML format and can be loaded from a
//! specified file path or from the default location in the current directory.
//! It carries the section layout handed to the merge engine.

use std::{
    fs,
    path::{Path, PathBuf},
};

use manifest_merger::MergeSettings;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::Error;

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "manifest-merger.toml";

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

/// Main configuration structure for the manifest-merger CLI application.
///
/// # Example TOML Configuration
///
/// ```toml
/// [merge]
/// ordered_entity_sections = ["require", "require-dev"]
/// unordered_entity_sections = ["conflict", "provide", "replace"]
/// excluded_entities = ["acme/product-community-edition"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Section layout used by the merge engine
    #[serde(default)]
    pub merge: MergeSettings,
}

impl AppConfig {
    /// Loads configuration from a TOML file at the specified path.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if:
    /// - The specified file does not exist
    /// - The file cannot be read due to permissions or I/O issues
    /// - The file contains invalid TOML syntax or unknown value types
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use std::path::Path;
    /// use manifest_merger_cli::config::AppConfig;
    ///
    /// let config_path = Path::new("./manifest-merger.toml");
    /// match AppConfig::load(config_path) {
    ///     Ok(config) => println!("Ignoring {} sections", config.merge.ignored_sections.len()),
    ///     Err(e) => eprintln!("Failed to load config: {}", e),
    /// }
    /// ```
    pub fn load(path: &Path) -> Result<Self, Error> {
        debug!("Loading configuration from {:?}", path);

        if !path.exists() {
            return Err(Error::Config(format!(
                "Configuration file not found: {:?}",
                path
            )));
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read configuration file: {}", e)))?;

        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse configuration file: {}", e)))?;

        Ok(config)
    }

    /// Loads the configuration the command line asks for.
    ///
    /// An explicit path must exist. Without one, the default file in the
    /// current directory is used when present, and built-in defaults when not.
    pub fn resolve(config_path: Option<&str>) -> Result<Self, Error> {
        let path = get_config_path(config_path);
        if config_path.is_none() && !path.exists() {
            debug!("No configuration file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(&path)
    }
}

/// Returns the configuration file path, defaulting to the current directory.
pub fn get_config_path(config_path: Option<&str>) -> PathBuf {
    if let Some(path) = config_path {
        PathBuf::from(path)
    } else {
        let current_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        current_dir.join(DEFAULT_CONFIG_FILENAME)
    }
}
