use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;
use thiserror::Error;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api/v1";
pub const SETTINGS_FILE_NAME: &str = "concierge.toml";
const SETTINGS_DIR_NAME: &str = "obsidian-concierge";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid api base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.into(),
            request_timeout_secs: 30,
            log_filter: "info".into(),
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_base_url: Option<String>,
    request_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

/// Defaults, then the settings file, then environment variables. Command-line
/// overrides are applied by the caller afterwards.
///
/// An explicit `path` must exist; otherwise `concierge.toml` is looked up in the
/// working directory and then in the user config directory, and skipped when absent.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    let file = match path {
        Some(path) => Some(read_file_settings(path)?),
        None => match default_settings_path() {
            Some(path) => Some(read_file_settings(&path)?),
            None => None,
        },
    };
    if let Some(file) = file {
        if let Some(v) = file.api_base_url {
            settings.api_base_url = v;
        }
        if let Some(v) = file.request_timeout_secs {
            settings.request_timeout_secs = v;
        }
        if let Some(v) = file.log_filter {
            settings.log_filter = v;
        }
    }

    apply_env_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

fn default_settings_path() -> Option<PathBuf> {
    let local = PathBuf::from(SETTINGS_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    let user = dirs::config_dir()?
        .join(SETTINGS_DIR_NAME)
        .join(SETTINGS_FILE_NAME);
    user.is_file().then_some(user)
}

fn read_file_settings(path: &Path) -> Result<FileSettings, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn apply_env_overrides(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    let read = |names: &[&str]| names.iter().rev().find_map(|name| var(name));

    if let Some(v) = read(&["CONCIERGE_API_BASE_URL", "APP__API_BASE_URL"]) {
        settings.api_base_url = v;
    }
    if let Some(v) = read(&["CONCIERGE_REQUEST_TIMEOUT_SECS", "APP__REQUEST_TIMEOUT_SECS"]) {
        match v.trim().parse::<u64>() {
            Ok(parsed) => settings.request_timeout_secs = parsed,
            Err(_) => tracing::warn!(value = %v, "ignoring non-numeric request timeout"),
        }
    }
    if let Some(v) = read(&["CONCIERGE_LOG", "APP__LOG"]) {
        settings.log_filter = v;
    }
}

/// Parses and normalizes the API base URL (no trailing slash).
pub fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(trimmed).map_err(|err| ConfigError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "scheme must be http or https".into(),
        });
    }
    Ok(url)
}
