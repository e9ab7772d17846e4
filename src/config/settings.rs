//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data.

use crate::error::{ConfigError, ConfigResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/smartbin)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/smartbin)
    pub data_dir: PathBuf,
}

impl Paths {
    /// Resolve paths using XDG directories.
    pub fn resolve() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "smartbin", "smartbin")
            .ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
        })
    }

    /// Place both directories under a single root.
    pub fn rooted(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    /// Create the directories if they do not exist yet.
    pub fn ensure(&self) -> ConfigResult<()> {
        fs::create_dir_all(&self.config_dir)?;
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the default path of the scan ledger.
    pub fn database_file(&self) -> PathBuf {
        self.data_dir.join("waste.db")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Base URL of the classification service, `None` to always use the fallback.
    pub api_base_url: Option<String>,
    /// Upper bound on one remote classification attempt, in milliseconds.
    pub classify_timeout_ms: u64,
    /// Artificial latency of the fallback generator, in milliseconds.
    pub fallback_delay_ms: u64,
    /// Current-weather endpoint.
    pub weather_api_url: String,
    /// API key for the weather endpoint.
    pub weather_api_key: Option<String>,
    /// City used when none is given.
    pub default_city: String,
    /// Ledger location, defaults to the data directory.
    pub database_path: Option<PathBuf>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: Some("https://api.example.com".to_string()),
            classify_timeout_ms: 10_000,
            fallback_delay_ms: 1_500,
            weather_api_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            weather_api_key: None,
            default_city: "Bangkok".to_string(),
            database_path: None,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, falling back to defaults.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        let file = paths.settings_file();

        if !file.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&file)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Save settings to the default location.
    pub fn save(&self, paths: &Paths) -> ConfigResult<()> {
        paths.ensure()?;
        self.save_to(&paths.settings_file())
    }

    /// Save settings to a specific file, creating its parent directory.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Remote classification timeout.
    pub fn classify_timeout(&self) -> Duration {
        Duration::from_millis(self.classify_timeout_ms)
    }

    /// Fallback generator delay.
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }

    /// Resolved ledger location.
    pub fn database_file(&self, paths: &Paths) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| paths.database_file())
    }
}
