// config.rs
use crate::scraper::sources::SourceKind;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Config file picked up from the working directory when none is named.
pub const DEFAULT_CONFIG_FILE: &str = "studio_space.json";

const ENV_PREFIX: &str = "STUDIO_";

/// How result and detail pages are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    /// Plain GET of the page markup.
    #[default]
    Direct,
    /// Through the ZenRows JS-rendering proxy (needs `ZENROWS_API_KEY`).
    Zenrows,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {msg}")]
    Read { path: String, msg: String },

    #[error("Invalid config: {0}")]
    Parse(String),

    #[error("Invalid value for {key}: {value:?}")]
    Env { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    pub postal_code: String,
    pub artifacts_path: PathBuf,
    /// Cap on cards taken per results page, and on listings in the final report.
    pub max_listings: usize,
    pub page_timeout_seconds: u64,
    pub detail_timeout_seconds: u64,
    pub image_download_timeout_seconds: u64,
    pub renderer: Renderer,
    pub database_path: PathBuf,
    pub sources: Vec<SourceKind>,
    pub policy_path: Option<PathBuf>,
    pub debug_snapshots: bool,
    pub max_run_seconds: Option<u64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            postal_code: "L5A 4E6".to_string(),
            artifacts_path: PathBuf::from("artifacts"),
            max_listings: 20,
            page_timeout_seconds: 60,
            detail_timeout_seconds: 15,
            image_download_timeout_seconds: 30,
            renderer: Renderer::Direct,
            database_path: PathBuf::from("studio_space.sqlite3"),
            sources: SourceKind::ALL.to_vec(),
            policy_path: None,
            debug_snapshots: false,
            max_run_seconds: None,
        }
    }
}

impl SearchOptions {
    /// Defaults, then the config file, then `STUDIO_*` environment variables.
    ///
    /// A named file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut opts = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        opts.apply_env(std::env::vars())?;
        Ok(opts)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            msg: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies `STUDIO_*` overrides from the given variables. Unrelated
    /// variables are ignored.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<(), ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "POSTAL_CODE" => self.postal_code = value,
                "ARTIFACTS_PATH" => self.artifacts_path = PathBuf::from(value),
                "MAX_LISTINGS" => self.max_listings = parse_env(&key, &value)?,
                "PAGE_TIMEOUT_SECONDS" => self.page_timeout_seconds = parse_env(&key, &value)?,
                "DETAIL_TIMEOUT_SECONDS" => self.detail_timeout_seconds = parse_env(&key, &value)?,
                "IMAGE_DOWNLOAD_TIMEOUT_SECONDS" => {
                    self.image_download_timeout_seconds = parse_env(&key, &value)?
                }
                "RENDERER" => {
                    self.renderer = <Renderer as ValueEnum>::from_str(&value, true).map_err(|_| env_err(&key, &value))?
                }
                "DATABASE_PATH" => self.database_path = PathBuf::from(value),
                "POLICY_PATH" => self.policy_path = Some(PathBuf::from(value)),
                "DEBUG_SNAPSHOTS" => self.debug_snapshots = parse_env(&key, &value)?,
                "MAX_RUN_SECONDS" => self.max_run_seconds = Some(parse_env(&key, &value)?),
                "SOURCES" => {
                    self.sources = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(|s| <SourceKind as ValueEnum>::from_str(s, true).map_err(|_| env_err(&key, &value)))
                        .collect::<Result<_, _>>()?
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_seconds)
    }

    pub fn detail_timeout(&self) -> Duration {
        Duration::from_secs(self.detail_timeout_seconds)
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_download_timeout_seconds)
    }

    pub fn snapshot_dir(&self) -> Option<PathBuf> {
        self.debug_snapshots.then(|| self.artifacts_path.join("debug"))
    }
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| env_err(key, value))
}

fn env_err(key: &str, value: &str) -> ConfigError {
    ConfigError::Env {
        key: key.to_string(),
        value: value.to_string(),
    }
}
