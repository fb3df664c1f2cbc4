//! Planner configuration from the environment
//!
//! `.env.local` and `.env` in the working directory are loaded first (local
//! overrides win), then the `IDOL_PLANNER_*` variables are read.

use std::path::PathBuf;

use thiserror::Error;

use crate::infrastructure::platform::default_data_dir;

pub const DEFAULT_SHARE_BASE_URL: &str = "https://poe-idol-planner.com";
pub const DEFAULT_LOG_FILTER: &str = "idolplanner_player=info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must not be empty")]
    Empty { var: &'static str },

    #[error("{var} must be an http(s) URL, got {value}")]
    InvalidUrl { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Directory holding `storage.json`
    pub data_dir: PathBuf,
    /// Modifier catalog JSON used by clipboard import
    pub catalog_path: Option<PathBuf>,
    /// Default `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
    /// Base URL for rendered share links
    pub share_base_url: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            catalog_path: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
        }
    }
}

impl PlannerConfig {
    /// Load dotenv files, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let data_dir = match non_empty(&lookup, "IDOL_PLANNER_DATA_DIR")? {
            Some(dir) => PathBuf::from(dir),
            None => defaults.data_dir,
        };
        let catalog_path = non_empty(&lookup, "IDOL_PLANNER_CATALOG")?.map(PathBuf::from);
        let log_filter =
            non_empty(&lookup, "IDOL_PLANNER_LOG")?.unwrap_or(defaults.log_filter);

        let share_base_url = match non_empty(&lookup, "IDOL_PLANNER_SHARE_BASE_URL")? {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.trim_end_matches('/').to_string()
            }
            Some(url) => {
                return Err(ConfigError::InvalidUrl {
                    var: "IDOL_PLANNER_SHARE_BASE_URL",
                    value: url,
                })
            }
            None => defaults.share_base_url,
        };

        Ok(Self {
            data_dir,
            catalog_path,
            log_filter,
            share_base_url,
        })
    }
}

/// A set variable must carry a value; unset is fine.
fn non_empty(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<String>, ConfigError> {
    match lookup(var) {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Err(ConfigError::Empty { var }),
        Some(value) => Ok(Some(value.trim().to_string())),
    }
}

fn load_dotenv() {
    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = PathBuf::from(filename);
        if path.exists() {
            if let Err(e) = dotenvy::from_path(&path) {
                tracing::warn!(file = filename, error = %e, "Failed to load env file");
            }
        }
    }
}
