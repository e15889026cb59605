use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

use crate::error::{ParleyError, Result};

/// Additive bonuses for the priority score.
///
/// Serialized as a flat `key -> number` map so weights can be tuned from
/// config without a release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub business_opportunity: f64,
    pub urgent: f64,
    /// Large enough to push any crisis message to the top tier.
    pub crisis_sentiment: f64,
    pub vip_relationship: f64,
    pub message_count_bonus: f64,
    pub recent_interaction: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            business_opportunity: 50.0,
            urgent: 40.0,
            crisis_sentiment: 100.0,
            vip_relationship: 30.0,
            message_count_bonus: 10.0,
            recent_interaction: 15.0,
        }
    }
}

impl ScoringWeights {
    /// Apply a flat override map. Unknown keys are ignored with a warning.
    pub fn with_overrides(mut self, overrides: &HashMap<String, f64>) -> Result<Self> {
        for (key, value) in overrides {
            let slot = match key.as_str() {
                "business_opportunity" => &mut self.business_opportunity,
                "urgent" => &mut self.urgent,
                "crisis_sentiment" => &mut self.crisis_sentiment,
                "vip_relationship" => &mut self.vip_relationship,
                "message_count_bonus" => &mut self.message_count_bonus,
                "recent_interaction" => &mut self.recent_interaction,
                other => {
                    warn!("ignoring unknown scoring weight {}", other);
                    continue;
                }
            };
            *slot = *value;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        let all = [
            ("business_opportunity", self.business_opportunity),
            ("urgent", self.urgent),
            ("crisis_sentiment", self.crisis_sentiment),
            ("vip_relationship", self.vip_relationship),
            ("message_count_bonus", self.message_count_bonus),
            ("recent_interaction", self.recent_interaction),
        ];
        for (name, value) in all {
            if !value.is_finite() || value < 0.0 {
                return Err(ParleyError::validation(format!(
                    "scoring weight {} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
