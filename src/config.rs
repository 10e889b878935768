use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::Path;

pub const DEFAULT_RECORDER_ADDRESS: &str = "ws://127.0.0.1:4455";
const DEFAULT_RECORDER_PASSWORD: &str = "your-password-here";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to write config '{path}': {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderConfig {
    pub address: String,
    pub password: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_RECORDER_ADDRESS.to_string(),
            password: DEFAULT_RECORDER_PASSWORD.to_string(),
        }
    }
}

/// The two user-toggleable recording-mode flags. `temporary` records into
/// the shared temp slot pending an explicit save; `save_all` promotes every
/// temporary capture automatically.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingFlags {
    #[serde(default)]
    pub temporary: bool,
    #[serde(default)]
    pub save_all: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub recorder: RecorderConfig,
    #[serde(default)]
    pub recording: RecordingFlags,
}

/// Loads the config file, generating a default one on first run so the user
/// has a template to fill in with their recorder settings.
pub fn load_or_create_config(path: &Path) -> Result<Config, ConfigError> {
    let raw_json = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(error) if error.kind() == ErrorKind::NotFound => {
            let config = Config::default();
            write_config(path, &config)?;
            tracing::info!(
                config_path = %path.display(),
                "Config file not found. Default config created; update it with your recorder settings"
            );
            return Ok(config);
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.display().to_string(),
                source,
            });
        }
    };

    serde_json::from_str::<Config>(&raw_json).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn write_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let serialized = serde_json::to_string_pretty(config).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    if let Some(parent_directory) = path.parent() {
        if !parent_directory.as_os_str().is_empty() {
            std::fs::create_dir_all(parent_directory).map_err(|source| ConfigError::Write {
                path: path.display().to_string(),
                source,
            })?;
        }
    }

    std::fs::write(path, serialized).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}
