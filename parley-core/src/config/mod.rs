//! # Parley Configuration
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         Environment Variables           │
//! │    PARLEY_CATEGORIZER_ENDPOINT=...      │
//! ├─────────────────────────────────────────┤
//! │         Config File (parley.toml)       │
//! │    [categorizer]                        │
//! │    max_attempts = 5                     │
//! ├─────────────────────────────────────────┤
//! │         Default Values                  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The TTL table and the rate-limit table are not configurable.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

mod loader;

pub use loader::ConfigLoader;

use crate::error::{ParleyError, Result};
use crate::scoring::ScoringWeights;

pub const DEFAULT_CATEGORIZER_ENDPOINT: &str = "http://127.0.0.1:5001/parley/us-central1/categorizeMessage";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 500;
pub const DEFAULT_MAX_DELAY_MS: u64 = 5000;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ParleyConfig {
    pub categorizer: CategorizerConfig,

    /// Flat `weight name -> value` overrides on top of the default weights
    pub scoring: HashMap<String, f64>,

    pub telemetry: TelemetryConfig,
}

/// Categorization endpoint client settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CategorizerConfig {
    pub endpoint: String,

    /// Bearer token; requests are sent unauthenticated without one
    pub api_token: Option<String>,

    pub timeout_secs: u64,

    /// Total attempts including the first
    pub max_attempts: u32,

    pub base_delay_ms: u64,

    pub max_delay_ms: u64,
}

impl Default for CategorizerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CATEGORIZER_ENDPOINT.to_string(),
            api_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
        }
    }
}

impl CategorizerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Write performance metrics for AI calls
    pub enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl ParleyConfig {
    /// Default weights with the `[scoring]` overrides applied
    pub fn scoring_weights(&self) -> Result<ScoringWeights> {
        ScoringWeights::default().with_overrides(&self.scoring)
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.categorizer;
        if c.endpoint.trim().is_empty() {
            return Err(ParleyError::config("categorizer.endpoint must not be empty"));
        }
        if c.max_attempts == 0 {
            return Err(ParleyError::config("categorizer.max_attempts must be at least 1"));
        }
        if c.base_delay_ms > c.max_delay_ms {
            return Err(ParleyError::config(format!(
                "categorizer.base_delay_ms ({}) exceeds max_delay_ms ({})",
                c.base_delay_ms, c.max_delay_ms
            )));
        }
        if c.timeout_secs == 0 {
            return Err(ParleyError::config("categorizer.timeout_secs must be at least 1"));
        }
        self.scoring_weights()
            .map_err(|e| ParleyError::config(e.to_string()))?;
        Ok(())
    }
}
