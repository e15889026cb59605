//! Static per-operation limits.

use serde::{Deserialize, Serialize};

use crate::types::operations;

/// Hourly and daily ceilings for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLimits {
    pub hourly: u32,
    pub daily: u32,
}

impl OperationLimits {
    pub const fn new(hourly: u32, daily: u32) -> Self {
        Self { hourly, daily }
    }
}

pub const DEFAULT_LIMITS: OperationLimits = OperationLimits::new(100, 1000);

/// Fraction of a window after which the user is warned once.
pub const WARNING_THRESHOLD: f64 = 0.8;

pub fn limits_for(operation: &str) -> OperationLimits {
    match operation {
        operations::CATEGORIZATION => OperationLimits::new(200, 2000),
        operations::SENTIMENT => OperationLimits::new(200, 2000),
        operations::OPPORTUNITY_SCORING => OperationLimits::new(100, 1000),
        operations::FAQ_DETECTION => OperationLimits::new(100, 1000),
        operations::VOICE_MATCHING => OperationLimits::new(50, 500),
        operations::SMART_REPLY => OperationLimits::new(50, 500),
        operations::DAILY_DIGEST => OperationLimits::new(5, 20),
        _ => DEFAULT_LIMITS,
    }
}
