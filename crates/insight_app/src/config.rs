use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use insight_engine::{ProviderSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
use insight_logging::LevelFilter;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILENAME: &str = "config.ron";
const APP_DIR: &str = "insight";
const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
    #[error("no data directory available on this platform; set data_dir in the config")]
    NoDataDir,
    #[error("unknown log level {0:?}")]
    LogLevel(String),
    #[error("no API key found; set GEMINI_API_KEY or API_KEY")]
    MissingApiKey,
}

/// Settings read from `config.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub model: String,
    pub base_url: String,
    /// Where `tasks.json` lives. Defaults to the platform data dir.
    pub data_dir: Option<PathBuf>,
    /// Download sink for exports without a folder.
    pub downloads_dir: Option<PathBuf>,
    /// Folder granted for exports unless `--folder` overrides it.
    pub export_folder: Option<PathBuf>,
    pub log_level: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            data_dir: None,
            downloads_dir: None,
            export_folder: None,
            log_level: "info".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl AppConfig {
    /// A missing file yields the defaults. Runs before logging is set up,
    /// so it does not log.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        ron::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    /// Configured, else the user's downloads folder, else `downloads/` in
    /// the data dir.
    pub fn downloads_dir(&self) -> Result<PathBuf, ConfigError> {
        if let Some(dir) = &self.downloads_dir {
            return Ok(dir.clone());
        }
        match dirs::download_dir() {
            Some(dir) => Ok(dir),
            None => Ok(self.data_dir()?.join("downloads")),
        }
    }

    pub fn log_level(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn provider_settings(&self, api_key: String) -> ProviderSettings {
        ProviderSettings {
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            api_key,
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}

pub fn default_data_dir() -> Result<PathBuf, ConfigError> {
    Ok(dirs::data_dir().ok_or(ConfigError::NoDataDir)?.join(APP_DIR))
}

/// `--config` if given, else `config.ron` in the default data dir.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => Ok(default_data_dir()?.join(CONFIG_FILENAME)),
    }
}

/// One line for the log saying where the settings came from.
pub fn describe_source(path: &Path) -> String {
    if path.is_file() {
        format!("Loaded config {}", path.display())
    } else {
        format!("No config at {}, using defaults", path.display())
    }
}

pub fn api_key_from_env() -> Result<String, ConfigError> {
    api_key_from(|name| std::env::var(name).ok())
}

fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
        .ok_or(ConfigError::MissingApiKey)
}
