//! Resolver settings loaded from `config.toml`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tracing::debug;

use crate::constants::{
    ALL_SELECTED_VALUE, CONFIG_PATH_ENV, DEFAULT_CACHE_NAMESPACE, DEFAULT_DEBOUNCE_MS,
    DEFAULT_MAX_CACHED_RESULTS, SYNTAX_ERROR_GUIDANCE,
};
use crate::core::DashvarError;

/// Upper bound accepted for `debounce_ms` (one minute).
const MAX_DEBOUNCE_MS: u64 = 60_000;

const fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_cache_namespace() -> String {
    DEFAULT_CACHE_NAMESPACE.to_string()
}

fn default_all_sentinel() -> String {
    ALL_SELECTED_VALUE.to_string()
}

fn default_syntax_error_guidance() -> String {
    SYNTAX_ERROR_GUIDANCE.to_string()
}

const fn default_max_cached_results() -> usize {
    DEFAULT_MAX_CACHED_RESULTS
}

/// Settings for a dashboard session.
///
/// Every field is optional in the file; missing fields take their defaults.
///
/// ```toml
/// debounce_ms = 500
/// cache_namespace = "team-dashboards"
/// max_cached_results = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Quiet period before a textbox edit is committed
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// First component of every query cache key
    #[serde(default = "default_cache_namespace")]
    pub cache_namespace: String,

    /// Value the presentation layer sends for "ALL"
    #[serde(default = "default_all_sentinel")]
    pub all_sentinel: String,

    /// Message shown instead of executor syntax errors
    #[serde(default = "default_syntax_error_guidance")]
    pub syntax_error_guidance: String,

    /// Bound on the query result cache
    #[serde(default = "default_max_cached_results")]
    pub max_cached_results: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            cache_namespace: default_cache_namespace(),
            all_sentinel: default_all_sentinel(),
            syntax_error_guidance: default_syntax_error_guidance(),
            max_cached_results: default_max_cached_results(),
        }
    }
}

impl ResolverConfig {
    /// Load from `DASHVARS_CONFIG_PATH`, else the default location.
    ///
    /// A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed, or
    /// validated.
    pub async fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) => PathBuf::from(path),
            None => Self::default_path()?,
        };
        Self::load_with_optional(Some(path)).await
    }

    /// Load from `path` if given and present, else from the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the chosen file exists but is invalid.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            debug!("No resolver config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails [`validate`](Self::validate).
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read resolver config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse resolver config from {}", path.display()))?;
        config.validate()?;
        debug!("Loaded resolver config from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as TOML, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("Failed to serialize resolver config")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write resolver config to {}", path.display()))
    }

    /// `<config dir>/dashvars/config.toml`, e.g. `~/.config/dashvars/config.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine configuration directory"))?;
        Ok(dir.join("dashvars").join("config.toml"))
    }

    /// Rejects settings that would make the session misbehave.
    ///
    /// # Errors
    ///
    /// Returns [`DashvarError::ConfigError`] describing the first problem.
    pub fn validate(&self) -> Result<(), DashvarError> {
        if self.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(DashvarError::ConfigError {
                message: format!(
                    "debounce_ms = {} exceeds the maximum of {MAX_DEBOUNCE_MS}",
                    self.debounce_ms
                ),
            });
        }
        if self.cache_namespace.trim().is_empty() {
            return Err(DashvarError::ConfigError {
                message: "cache_namespace must not be empty".to_string(),
            });
        }
        if self.all_sentinel.is_empty() {
            return Err(DashvarError::ConfigError {
                message: "all_sentinel must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
