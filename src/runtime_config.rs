//! # Runtime Configuration Module
//!
//! Locates the declaration documents the route resolver reads at startup.
//!
//! ## Resource Directory
//!
//! All documents live in one resource directory:
//!
//! ```text
//! resources/
//! ├── configuration-files.yaml   # optional: names the two documents below
//! ├── packages-to-scan.yaml      # scan listing (scan-based configuration)
//! └── actions-config.yaml        # legacy declaration file
//! ```
//!
//! `configuration-files.yaml` has two keys, `old` for the legacy declaration
//! file and `new` for the scan listing:
//!
//! ```yaml
//! old: struts-like.yaml
//! new: scan.yaml
//! ```
//!
//! ## Environment Variables
//!
//! - `ACTIONROUTE_RESOURCE_DIR` - resource directory (default `resources`)
//! - `ACTIONROUTE_SCAN_FILE` - scan listing file name
//! - `ACTIONROUTE_LEGACY_FILE` - legacy declaration file name
//!
//! Environment values override `configuration-files.yaml`, which overrides
//! the defaults.

use crate::config::load::{parse_document, read_optional};
use crate::config::ConfigError;
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_RESOURCE_DIR: &str = "resources";
pub const DEFAULT_SCAN_FILE: &str = "packages-to-scan.yaml";
pub const DEFAULT_LEGACY_FILE: &str = "actions-config.yaml";
/// Optional document naming the scan listing and the legacy file
pub const CONFIGURATION_FILES: &str = "configuration-files.yaml";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigurationFiles {
    old: Option<String>,
    new: Option<String>,
}

/// Where the declaration documents are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    pub resource_dir: PathBuf,
    /// Scan listing file name, relative to `resource_dir`
    pub scan_file: String,
    /// Legacy declaration file name, relative to `resource_dir`
    pub legacy_file: String,
}

impl RuntimeConfig {
    /// Defaults rooted at `resource_dir`, ignoring any configuration file.
    #[must_use]
    pub fn new(resource_dir: impl Into<PathBuf>) -> Self {
        Self {
            resource_dir: resource_dir.into(),
            scan_file: DEFAULT_SCAN_FILE.to_string(),
            legacy_file: DEFAULT_LEGACY_FILE.to_string(),
        }
    }

    /// Defaults plus `configuration-files.yaml` from `resource_dir`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::ParseError`] or [`ConfigError::Io`] when the file
    /// exists but cannot be used.
    pub fn load(resource_dir: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::new(resource_dir);
        let path = config.resource_dir.join(CONFIGURATION_FILES);
        if let Some(content) = read_optional(&path)? {
            let files: ConfigurationFiles = if content.trim().is_empty() {
                ConfigurationFiles::default()
            } else {
                parse_document(&path, &content)?
            };
            if let Some(old) = files.old {
                config.legacy_file = old;
            }
            if let Some(new) = files.new {
                config.scan_file = new;
            }
        }
        Ok(config)
    }

    /// Configuration from the process environment.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// See [`load`](Self::load).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dir = lookup("ACTIONROUTE_RESOURCE_DIR").unwrap_or_else(|| DEFAULT_RESOURCE_DIR.to_string());
        let mut config = Self::load(dir)?;
        if let Some(scan) = lookup("ACTIONROUTE_SCAN_FILE") {
            config.scan_file = scan;
        }
        if let Some(legacy) = lookup("ACTIONROUTE_LEGACY_FILE") {
            config.legacy_file = legacy;
        }
        Ok(config)
    }

    #[must_use]
    pub fn scan_listing_path(&self) -> PathBuf {
        self.resource_dir.join(&self.scan_file)
    }

    #[must_use]
    pub fn legacy_path(&self) -> PathBuf {
        self.resource_dir.join(&self.legacy_file)
    }

    #[must_use]
    pub fn resource_dir(&self) -> &Path {
        &self.resource_dir
    }
}
