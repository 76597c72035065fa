//! Runtime configuration.
//!
//! Layers, lowest to highest precedence: built-in defaults, an optional TOML
//! file, `COMPANY_SEARCH_*` environment variables, then CLI flags (applied by
//! the caller).
//!
//! ```toml
//! db_path = "/var/lib/company-search/companies.db"
//! default_limit = 32
//! min_limit = 8
//! max_limit = 256
//! busy_timeout_ms = 5000
//! log_level = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::search::compile::{DEFAULT_LIMIT, LimitPolicy, MAX_LIMIT, MIN_LIMIT};

pub const ENV_DB: &str = "COMPANY_SEARCH_DB";
pub const ENV_DEFAULT_LIMIT: &str = "COMPANY_SEARCH_DEFAULT_LIMIT";
pub const ENV_MIN_LIMIT: &str = "COMPANY_SEARCH_MIN_LIMIT";
pub const ENV_MAX_LIMIT: &str = "COMPANY_SEARCH_MAX_LIMIT";
pub const ENV_BUSY_TIMEOUT_MS: &str = "COMPANY_SEARCH_BUSY_TIMEOUT_MS";
pub const ENV_LOG: &str = "COMPANY_SEARCH_LOG";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config TOML: {0}")]
    ParseToml(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// `SQLite` file holding the `companies` table.
    pub db_path: PathBuf,
    pub default_limit: usize,
    pub min_limit: usize,
    pub max_limit: usize,
    pub busy_timeout_ms: u64,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            db_path: crate::default_db_path(),
            default_limit: DEFAULT_LIMIT,
            min_limit: MIN_LIMIT,
            max_limit: MAX_LIMIT,
            busy_timeout_ms: 5_000,
            log_level: "warn".to_string(),
        }
    }
}

impl SearchConfig {
    /// Load from `explicit` (must exist) or the default config file (optional),
    /// then apply environment overrides and validate.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut cfg = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.is_file() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        cfg.apply_env();
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `COMPANY_SEARCH_*` overrides (a `.env` file is honoured).
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| dotenvy::var(key).ok());
    }

    /// Apply overrides from any key lookup. Unparseable numbers are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DB) {
            self.db_path = PathBuf::from(path);
        }

        if let Some(val) = lookup(ENV_DEFAULT_LIMIT)
            && let Ok(n) = val.parse()
        {
            self.default_limit = n;
        }

        if let Some(val) = lookup(ENV_MIN_LIMIT)
            && let Ok(n) = val.parse()
        {
            self.min_limit = n;
        }

        if let Some(val) = lookup(ENV_MAX_LIMIT)
            && let Ok(n) = val.parse()
        {
            self.max_limit = n;
        }

        if let Some(val) = lookup(ENV_BUSY_TIMEOUT_MS)
            && let Ok(ms) = val.parse()
        {
            self.busy_timeout_ms = ms;
        }

        if let Some(level) = lookup(ENV_LOG) {
            self.log_level = level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_limit == 0 {
            return Err(ConfigError::Validation("min_limit must be positive".into()));
        }
        if self.min_limit > self.default_limit {
            return Err(ConfigError::Validation(format!(
                "min_limit ({}) exceeds default_limit ({})",
                self.min_limit, self.default_limit
            )));
        }
        if self.default_limit > self.max_limit {
            return Err(ConfigError::Validation(format!(
                "default_limit ({}) exceeds max_limit ({})",
                self.default_limit, self.max_limit
            )));
        }
        Ok(())
    }

    pub fn limit_policy(&self) -> LimitPolicy {
        LimitPolicy {
            default: self.default_limit,
            min: self.min_limit,
            max: self.max_limit,
        }
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

/// `<platform config dir>/config.toml`, when a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "company-search", "company-search")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}
