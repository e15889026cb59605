//! # Config loading
//!
//! Built-in defaults, overlaid by `parley.toml`, overlaid by `PARLEY_*`
//! environment variables. The merged result is validated once at the end.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `PARLEY_CATEGORIZER_ENDPOINT` | `categorizer.endpoint` |
//! | `PARLEY_API_TOKEN` | `categorizer.api_token` (empty clears it) |
//! | `PARLEY_MAX_ATTEMPTS` | `categorizer.max_attempts` |
//! | `PARLEY_TIMEOUT_SECS` | `categorizer.timeout_secs` |
//! | `PARLEY_TELEMETRY` | `telemetry.enabled` |

use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::ParleyConfig;
use crate::error::{ParleyError, Result};

/// 配置加载器
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config_path: PathBuf,
    env_prefix: String,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            env_prefix: "PARLEY".to_string(),
        }
    }
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            env_prefix: "PARLEY".to_string(),
        }
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// `PARLEY_CONFIG`, then `./parley.toml`, then the user config dir
    fn default_config_path() -> PathBuf {
        if let Ok(config_path) = env::var("PARLEY_CONFIG") {
            return PathBuf::from(config_path);
        }

        let mut candidates = vec![PathBuf::from("parley.toml")];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("parley").join("config.toml"));
        }

        for path in &candidates {
            if path.exists() {
                return path.clone();
            }
        }

        candidates.swap_remove(0)
    }

    /// Defaults, file, then process environment.
    pub fn load(&self) -> Result<ParleyConfig> {
        self.load_with_env(|key| env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an explicit environment lookup.
    pub fn load_with_env<F>(&self, lookup: F) -> Result<ParleyConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = if self.config_path.exists() {
            debug!("loading config from {}", self.config_path.display());
            self.load_from_file()?
        } else {
            ParleyConfig::default()
        };

        self.merge_env_config(&mut config, lookup)?;

        config
            .validate()
            .map_err(|e| ParleyError::config(format!("invalid configuration: {}", e)))?;

        Ok(config)
    }

    fn load_from_file(&self) -> Result<ParleyConfig> {
        let path = self.config_path.display();
        let raw = std::fs::read_to_string(&self.config_path)
            .map_err(|e| ParleyError::config(format!("cannot read {}: {}", path, e)))?;
        toml::from_str(&raw).map_err(|e| ParleyError::config(format!("{}: {}", path, e)))
    }

    fn merge_env_config<F>(&self, config: &mut ParleyConfig, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(&format!("{}_{}", self.env_prefix, name));

        if let Some(endpoint) = var("CATEGORIZER_ENDPOINT") {
            config.categorizer.endpoint = endpoint;
        }
        if let Some(token) = var("API_TOKEN") {
            config.categorizer.api_token = Some(token).filter(|t| !t.is_empty());
        }
        if let Some(attempts) = var("MAX_ATTEMPTS") {
            config.categorizer.max_attempts = parse_number(&attempts, "MAX_ATTEMPTS")?;
        }
        if let Some(secs) = var("TIMEOUT_SECS") {
            config.categorizer.timeout_secs = parse_number(&secs, "TIMEOUT_SECS")?;
        }
        if let Some(flag) = var("TELEMETRY") {
            config.telemetry.enabled = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "on" => true,
                "0" | "false" | "off" => false,
                other => {
                    return Err(ParleyError::config(format!(
                        "{}_TELEMETRY must be true or false, got '{}'",
                        self.env_prefix, other
                    )))
                }
            };
        }

        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(value: &str, name: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ParleyError::config(format!("{} is not a number: '{}'", name, value)))
}
