//! Run configuration.
//!
//! [`AuditConfig`] tunes the engine itself. [`AppConfig`] is the full
//! process configuration as read from a TOML file; the command-line
//! front end layers flags and environment variables on top of it.
//!
//! ```toml
//! drive_id = "0AExampleDriveId"
//! service_account_file = "/etc/drive-audit/key.json"
//! impersonate_user = "admin@example.com"
//! output = "audit.csv"
//!
//! [audit]
//! concurrency = 8
//! inheritance_policy = "first-detail"
//! root_scope = "all"
//!
//! [drive]
//! page_size = 1000
//! max_retries = 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AuditError, Result};

/// Directory name under the platform config dir.
const CONFIG_DIR_NAME: &str = "drive-audit";

/// Config file name inside [`CONFIG_DIR_NAME`].
const CONFIG_FILE_NAME: &str = "config.toml";

/// Largest page the Drive API accepts for file listings.
const MAX_PAGE_SIZE: u32 = 1000;

// ============================================================================
// Engine options
// ============================================================================

/// How a grant with several detail entries is classified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InheritancePolicy {
    /// Only the first detail entry decides.
    #[default]
    FirstDetail,
    /// Included when any detail entry is direct.
    AnyDirect,
}

/// Which direct children of the root are audited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootScope {
    /// Folders and leaves directly under the root.
    #[default]
    All,
    /// Only folders directly under the root; root-level leaves are skipped.
    FoldersOnly,
}

/// Engine tuning for one audit run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum permission lookups in flight at once.
    pub concurrency: usize,
    /// Path separator placed between a parent path and a child name.
    pub separator: String,
    /// Root-level scope.
    pub root_scope: RootScope,
    /// Inherited-grant classification.
    pub inheritance_policy: InheritancePolicy,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            concurrency: 8,
            separator: "/".to_string(),
            root_scope: RootScope::default(),
            inheritance_policy: InheritancePolicy::default(),
        }
    }
}

impl AuditConfig {
    /// Checks the options for values the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(AuditError::config("concurrency must be at least 1"));
        }
        if self.separator.is_empty() {
            return Err(AuditError::config("path separator must not be empty"));
        }
        Ok(())
    }
}

// ============================================================================
// Store client options
// ============================================================================

/// Options for the Google Drive store client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveSettings {
    /// Items requested per listing page (1..=1000).
    pub page_size: u32,
    /// Retries for transient failures before a call is reported failed.
    pub max_retries: usize,
    /// Override for the Drive API base URL (tests, proxies).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_retries: 3,
            api_base_url: None,
        }
    }
}

impl DriveSettings {
    /// Checks the page size is one the API accepts.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(AuditError::config(format!(
                "page_size must be between 1 and {MAX_PAGE_SIZE}, got {}",
                self.page_size
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Process configuration
// ============================================================================

/// Full process configuration.
///
/// Every field is optional in the file; required values are checked by
/// [`AppConfig::validate`] after command-line overrides are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Shared drive to audit (its id doubles as the root container id).
    pub drive_id: Option<String>,
    /// Service account JSON key file.
    pub service_account_file: Option<PathBuf>,
    /// User impersonated through domain-wide delegation.
    pub impersonate_user: Option<String>,
    /// CSV output destination.
    pub output: Option<PathBuf>,
    /// Engine options.
    pub audit: AuditConfig,
    /// Store client options.
    pub drive: DriveSettings,
}

impl AppConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| AuditError::config(format!("invalid config: {e}")))
    }

    /// Loads a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AuditError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads `explicit` if given, else the default config file if it
    /// exists, else the built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_config_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "Loading default config file");
                Self::load(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// `<platform config dir>/drive-audit/config.toml`, if the platform has one.
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Checks required fields are present and options are valid.
    pub fn validate(&self) -> Result<()> {
        if self.drive_id.as_deref().is_none_or(str::is_empty) {
            return Err(AuditError::config("drive id is required"));
        }
        if self.service_account_file.is_none() {
            return Err(AuditError::config("service account file is required"));
        }
        if self.output.is_none() {
            return Err(AuditError::config("output path is required"));
        }
        self.audit.validate()?;
        self.drive.validate()
    }
}
