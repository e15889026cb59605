//! # Creator health
//!
//! Turns raw engagement metrics into a 0-100 health score and a separate
//! burnout-risk tier. Bucket boundaries, weights and cut lines are fixed.
//!
//! ```rust
//! use parley_core::health::{health_score, HealthComponents};
//!
//! let score = health_score(&HealthComponents {
//!     personal_response_rate: 100.0,
//!     avg_response_time: 0.0,
//!     conversation_depth: 0.0,
//!     capacity_usage: 0.0,
//! });
//! assert_eq!(score, 35);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

pub const PERSONAL_RESPONSE_WEIGHT: f64 = 0.35;
pub const RESPONSE_TIME_WEIGHT: f64 = 0.25;
pub const CONVERSATION_DEPTH_WEIGHT: f64 = 0.20;
pub const CAPACITY_USAGE_WEIGHT: f64 = 0.20;

/// Raw metrics as collected for a creator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthMetrics {
    /// 0..100
    pub personal_response_rate: f64,
    pub avg_response_time_hours: f64,
    /// Share of conversations with more than one exchange, 0..100
    pub conversation_depth: f64,
    /// Messages handled against the daily limit, percent (may exceed 100)
    pub capacity_usage: f64,
    #[serde(default)]
    pub days_at_max_capacity: u32,
}

/// Bucketed components, each in [0, 100].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthComponents {
    pub personal_response_rate: f64,
    pub avg_response_time: f64,
    pub conversation_depth: f64,
    pub capacity_usage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnoutRisk {
    Low,
    Medium,
    High,
}

impl BurnoutRisk {
    pub fn as_str(&self) -> &'static str {
        match self {
            BurnoutRisk::Low => "low",
            BurnoutRisk::Medium => "medium",
            BurnoutRisk::High => "high",
        }
    }
}

impl fmt::Display for BurnoutRisk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub components: HealthComponents,
    pub score: u32,
    pub burnout_risk: BurnoutRisk,
    pub recommendations: Vec<String>,
}

pub fn response_time_score(hours: f64) -> f64 {
    if hours < 12.0 {
        100.0
    } else if hours < 24.0 {
        80.0
    } else if hours < 48.0 {
        40.0
    } else {
        0.0
    }
}

pub fn capacity_usage_score(percent: f64) -> f64 {
    if percent <= 80.0 {
        100.0
    } else if percent <= 90.0 {
        80.0
    } else if percent <= 100.0 {
        50.0
    } else {
        0.0
    }
}

fn clamp_component(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

/// Weighted sum of the components, rounded half-up.
pub fn health_score(components: &HealthComponents) -> u32 {
    let weighted = clamp_component(components.personal_response_rate) * PERSONAL_RESPONSE_WEIGHT
        + clamp_component(components.avg_response_time) * RESPONSE_TIME_WEIGHT
        + clamp_component(components.conversation_depth) * CONVERSATION_DEPTH_WEIGHT
        + clamp_component(components.capacity_usage) * CAPACITY_USAGE_WEIGHT;
    // snap to 6 decimals so 2.4999999999 rounds like 2.5
    let snapped = (weighted * 1e6).round() / 1e6;
    let rounded = (snapped + 0.5).floor();
    rounded.clamp(0.0, 100.0) as u32
}

pub fn components_from(metrics: &HealthMetrics) -> HealthComponents {
    HealthComponents {
        personal_response_rate: clamp_component(metrics.personal_response_rate),
        avg_response_time: response_time_score(metrics.avg_response_time_hours),
        conversation_depth: clamp_component(metrics.conversation_depth),
        capacity_usage: capacity_usage_score(metrics.capacity_usage),
    }
}

/// Red-flag points: low personal response +2, slow replies +2,
/// shallow conversations +1, a week or more at max capacity +3.
pub fn burnout_points(metrics: &HealthMetrics) -> u32 {
    let mut points = 0;
    if metrics.personal_response_rate < 60.0 {
        points += 2;
    }
    if metrics.avg_response_time_hours > 48.0 {
        points += 2;
    }
    if metrics.conversation_depth < 25.0 {
        points += 1;
    }
    if metrics.days_at_max_capacity >= 7 {
        points += 3;
    }
    points
}

pub fn burnout_risk(metrics: &HealthMetrics) -> BurnoutRisk {
    match burnout_points(metrics) {
        p if p >= 5 => BurnoutRisk::High,
        p if p >= 3 => BurnoutRisk::Medium,
        _ => BurnoutRisk::Low,
    }
}

pub fn calculate_health(metrics: &HealthMetrics) -> HealthReport {
    let components = components_from(metrics);
    HealthReport {
        components,
        score: health_score(&components),
        burnout_risk: burnout_risk(metrics),
        recommendations: recommendations(metrics),
    }
}

fn recommendations(metrics: &HealthMetrics) -> Vec<String> {
    let mut out = Vec::new();
    if metrics.personal_response_rate < 60.0 {
        out.push("Reply personally to more fans; lean on FAQ redirects for repeat questions".to_string());
    }
    if metrics.avg_response_time_hours > 48.0 {
        out.push("Set a delayed-response boundary message so fans know when to expect a reply".to_string());
    }
    if metrics.conversation_depth < 25.0 {
        out.push("Follow up on a few conversations instead of answering many once".to_string());
    }
    if metrics.days_at_max_capacity >= 7 {
        out.push("Lower your daily capacity limit or take a day off".to_string());
    }
    out
}
