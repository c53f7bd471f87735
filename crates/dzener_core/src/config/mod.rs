use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "DZENER_CONFIG_PATH";
const HOME_ENV_VAR: &str = "DZENER_HOME";
const DATA_DIR_NAME: &str = ".dzener-linux";
const WINDOWS_DATA_DIR_NAME: &str = "dzener-linux";

pub const STATE_FILE_NAME: &str = "state.json";
pub const EXPORT_FILE_NAME: &str = "tasks_export.json";

pub const POINTS_PER_TASK: u64 = 2;
pub const EXCHANGE_TASK_COUNT: i64 = 6;
/// Upper bound for one processing run, whatever `--count` or `batch_size` ask for.
pub const MAX_BATCH_SIZE: i64 = 1_000;
pub const DEFAULT_PAUSE_MS: u64 = 250;

/// Where the profile and the export document live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_dir: PathBuf,
    pub state_file_name: String,
    pub export_file_name: String,
}

impl StoreConfig {
    pub fn in_dir<P: Into<PathBuf>>(base_dir: P) -> Self {
        Self {
            base_dir: base_dir.into(),
            state_file_name: STATE_FILE_NAME.to_string(),
            export_file_name: EXPORT_FILE_NAME.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        Ok(Self::in_dir(data_dir()?))
    }

    pub fn state_path(&self) -> PathBuf {
        self.base_dir.join(&self.state_file_name)
    }

    pub fn export_path(&self) -> PathBuf {
        self.base_dir.join(&self.export_file_name)
    }
}

pub fn data_dir() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(HOME_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join(WINDOWS_DATA_DIR_NAME))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(DATA_DIR_NAME))
    }
}

/// Folds a free-form override key to lowercase snake_case.
pub fn canonical_name(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// User settings read from `config.json`. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub reward_per_task: Option<u64>,
    #[serde(default)]
    pub batch_size: Option<i64>,
    #[serde(default)]
    pub pause_ms: Option<u64>,
}

impl Config {
    pub fn exchange_settings(&self) -> ExchangeSettings {
        ExchangeSettings {
            batch_size: self.batch_size.unwrap_or(EXCHANGE_TASK_COUNT),
            reward_per_task: self.reward_per_task.unwrap_or(POINTS_PER_TASK),
            pause_ms: self.pause_ms.unwrap_or(DEFAULT_PAUSE_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExchangeSettings {
    pub batch_size: i64,
    pub reward_per_task: u64,
    pub pause_ms: u64,
}

impl Default for ExchangeSettings {
    fn default() -> Self {
        Config::default().exchange_settings()
    }
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub reward_per_task: Option<u64>,
    pub batch_size: Option<i64>,
    pub pause_ms: Option<u64>,
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(data_dir()?.join(CONFIG_FILE_NAME))
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path).map_err(|err| AppError::io_at(path, err))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if overrides.reward_per_task.is_some() {
        merged.reward_per_task = overrides.reward_per_task;
    }
    if overrides.batch_size.is_some() {
        merged.batch_size = overrides.batch_size;
    }
    if overrides.pause_ms.is_some() {
        merged.pause_ms = overrides.pause_ms;
    }
    merged
}
