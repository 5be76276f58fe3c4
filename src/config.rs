use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const CONFIG_FILE_NAME: &str = "config.json";
const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:5001";
const DEFAULT_SESSION_TTL_SECS: u64 = 86_400;
const DEFAULT_ISSUE_TYPE: &str = "Story";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DRAFT_LIMIT: usize = 64;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: String,
    pub session_ttl: Duration,
    pub issue_type: String,
    pub request_timeout: Duration,
    pub draft_limit: usize,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        let mut config = Self::from_stored(&stored)?;

        if let Ok(listen) = env::var("UATDASH_LISTEN") {
            config.listen_addr = listen;
        }
        if let Ok(ttl) = env::var("UATDASH_SESSION_TTL_SECS") {
            config.session_ttl = Duration::from_secs(parse_secs("UATDASH_SESSION_TTL_SECS", &ttl)?);
        }
        if let Ok(issue_type) = env::var("UATDASH_ISSUE_TYPE") {
            config.issue_type = issue_type;
        }
        if let Ok(timeout) = env::var("UATDASH_REQUEST_TIMEOUT_SECS") {
            config.request_timeout =
                Duration::from_secs(parse_secs("UATDASH_REQUEST_TIMEOUT_SECS", &timeout)?);
        }

        Ok(config)
    }

    pub fn from_stored(stored: &StoredConfig) -> AppResult<Self> {
        let parse_stored = |field: &str, value: Option<&str>, default: u64| -> AppResult<u64> {
            match value.filter(|v| !v.trim().is_empty()) {
                Some(raw) => parse_secs(field, raw),
                None => Ok(default),
            }
        };

        let draft_limit = match stored.draft_limit.as_deref().filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|err| {
                AppError::Configuration(format!("draft_limit must be a number: {err}"))
            })?,
            None => DEFAULT_DRAFT_LIMIT,
        };

        Ok(Self {
            listen_addr: non_empty(&stored.listen_addr)
                .unwrap_or(DEFAULT_LISTEN_ADDR)
                .to_string(),
            session_ttl: Duration::from_secs(parse_stored(
                "session_ttl_secs",
                stored.session_ttl_secs.as_deref(),
                DEFAULT_SESSION_TTL_SECS,
            )?),
            issue_type: non_empty(&stored.issue_type)
                .unwrap_or(DEFAULT_ISSUE_TYPE)
                .to_string(),
            request_timeout: Duration::from_secs(parse_stored(
                "request_timeout_secs",
                stored.request_timeout_secs.as_deref(),
                DEFAULT_REQUEST_TIMEOUT_SECS,
            )?),
            draft_limit: draft_limit.max(1),
        })
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECS),
            issue_type: DEFAULT_ISSUE_TYPE.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            draft_limit: DEFAULT_DRAFT_LIMIT,
        }
    }
}

/// On-disk settings edited by `uatdash config init`. Every value is optional;
/// unset entries fall back to the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen_addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_ttl_secs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft_limit: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        let path = config_file_path()?;
        match fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        let path = config_file_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)
            .map_err(|err| AppError::Configuration(format!("failed to write config: {err}")))?;
        fs::write(&path, data)?;
        Ok(())
    }
}

pub fn config_directory() -> AppResult<PathBuf> {
    if let Ok(dir) = env::var("UATDASH_CONFIG_DIR") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    dirs::config_dir()
        .map(|dir| dir.join("uatdash"))
        .ok_or_else(|| AppError::Configuration("unable to locate a config directory".to_string()))
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_secs(field: &str, raw: &str) -> AppResult<u64> {
    raw.trim()
        .parse::<u64>()
        .map_err(|err| AppError::Configuration(format!("{field} must be whole seconds: {err}")))
}
