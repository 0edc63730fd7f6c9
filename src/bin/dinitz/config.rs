use super::{ColorArg, OutputFormat};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Settings read from the CLI config file. Command-line flags win.
#[derive(Debug, Default)]
pub struct CliConfig {
    path: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub color: Option<ColorArg>,
    pub log_level: Option<String>,
    pub delay: Option<Duration>,
    pub phase_pause: Option<Duration>,
}

impl CliConfig {
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let must_exist = explicit.is_some();
        let path = explicit.or_else(default_config_path);
        let raw = match path.as_ref() {
            Some(config_path) if config_path.exists() => read_file(config_path)?,
            Some(config_path) if must_exist => {
                return Err(ConfigError::Missing {
                    path: config_path.clone(),
                })
            }
            _ => RawConfig::default(),
        };
        let format = parse_enum::<OutputFormat>("output.format", raw.output.format.as_deref())?;
        let color = parse_enum::<ColorArg>("output.color", raw.output.color.as_deref())?;
        Ok(Self {
            path,
            format,
            color,
            log_level: raw.log_level,
            delay: raw.playback.delay_ms.map(Duration::from_millis),
            phase_pause: raw.playback.phase_pause_ms.map(Duration::from_millis),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

fn parse_enum<T: ValueEnum>(key: &'static str, value: Option<&str>) -> Result<Option<T>, ConfigError> {
    match value {
        Some(value) => T::from_str(value, true)
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key,
                value: value.to_string(),
            }),
        None => Ok(None),
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct RawConfig {
    #[serde(default)]
    log_level: Option<String>,
    #[serde(default)]
    playback: PlaybackSection,
    #[serde(default)]
    output: OutputSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct PlaybackSection {
    delay_ms: Option<u64>,
    phase_pause_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct OutputSection {
    format: Option<String>,
    color: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read CLI config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse CLI config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("config file {path} does not exist")]
    Missing { path: PathBuf },
    #[error("config value '{value}' for {key} is invalid")]
    InvalidValue { key: &'static str, value: String },
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("dinitz").join("cli.toml"))
}
