//! Configuration for the form wizard.
//!
//! Stored in a machine-readable TOML file located at:
//!   %APPDATA%/FormWizard/config/config.toml on Windows
//!   $XDG_DATA_HOME/FormWizard/config/config.toml on Linux
//!   ~/Library/Application Support/FormWizard/config/config.toml on macOS
//!
//! `FORMWIZARD_HOME` overrides the workspace root on every platform.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::catalog::{application_catalog, feedback_catalog, load_catalog, QuestionCatalog};
use crate::validation::GatingPolicy;

/// Standard relative path to the config file (resolved per OS at runtime).
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable overriding the workspace root.
pub const HOME_ENV: &str = "FORMWIZARD_HOME";

/// Root configuration persisted per installation.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub submission: SubmissionSettings,
    #[serde(default)]
    pub wizard: WizardSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

/// Where and how completed answer sets are sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionSettings {
    /// Endpoint receiving the JSON POST. Submissions fail fast while unset.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SubmissionSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SubmissionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct WizardSettings {
    #[serde(default)]
    pub gating: GatingPolicy,
    #[serde(default)]
    pub catalog: CatalogSource,
}

/// Which question catalog to run.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(tag = "kind", content = "path", rename_all = "snake_case")]
pub enum CatalogSource {
    #[default]
    Feedback,
    Application,
    File(PathBuf),
}

impl CatalogSource {
    /// Parses a command-line value: a built-in name or a file path.
    pub fn parse_arg(value: &str) -> Self {
        match value {
            "feedback" => CatalogSource::Feedback,
            "application" => CatalogSource::Application,
            path => CatalogSource::File(PathBuf::from(path)),
        }
    }

    pub fn load(&self) -> Result<Arc<QuestionCatalog>> {
        let catalog = match self {
            CatalogSource::Feedback => feedback_catalog(),
            CatalogSource::Application => application_catalog(),
            CatalogSource::File(path) => load_catalog(path)?,
        };
        Ok(Arc::new(catalog))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StorageSettings {
    /// Directory for persisted progress. Defaults to `<workspace>/progress`.
    #[serde(default)]
    pub progress_dir: Option<PathBuf>,
}

/// Returns the root directory where the wizard stores data.
///
/// Order of precedence:
/// 1. `FORMWIZARD_HOME` environment variable.
/// 2. OS-specific data directory via `directories::BaseDirs`.
pub fn workspace_root() -> Result<PathBuf> {
    if let Ok(path) = env::var(HOME_ENV) {
        return Ok(PathBuf::from(path));
    }
    let base_dirs = BaseDirs::new().context("Unable to determine OS data directory")?;
    Ok(base_dirs.data_dir().join("FormWizard"))
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(workspace_root()?.join("config"))
}

pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Directory holding the persisted progress entries.
pub fn progress_dir(config: &AppConfig) -> Result<PathBuf> {
    match &config.storage.progress_dir {
        Some(dir) => Ok(dir.clone()),
        None => Ok(workspace_root()?.join("progress")),
    }
}

/// Loads the configuration from disk or returns defaults.
pub fn load_or_default() -> Result<AppConfig> {
    load_from(config_file_path()?)
}

pub fn load_from<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;
    let cfg: AppConfig = toml::from_str(&data)
        .with_context(|| format!("Failed to parse config file {:?}", path))?;
    Ok(cfg)
}

/// Persists the configuration to disk.
pub fn save(config: &AppConfig) -> Result<()> {
    save_to(config, config_file_path()?)
}

pub fn save_to<P: AsRef<Path>>(config: &AppConfig, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {:?}", parent))?;
    }
    let data = toml::to_string_pretty(config)?;
    fs::write(path, data).with_context(|| format!("Failed to write config file {:?}", path))?;
    Ok(())
}
