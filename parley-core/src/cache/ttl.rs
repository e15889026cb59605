//! Per-operation cache TTLs.
//!
//! Operations whose answer depends on the live conversation (voice matching,
//! smart replies) are never cached. Unknown operations are not cached either.

use chrono::Duration;

use crate::types::operations;

pub fn ttl_for(operation: &str) -> Duration {
    match operation {
        operations::CATEGORIZATION => Duration::hours(24),
        operations::SENTIMENT => Duration::hours(24),
        operations::OPPORTUNITY_SCORING => Duration::hours(12),
        operations::FAQ_DETECTION => Duration::days(7),
        operations::DAILY_DIGEST => Duration::hours(1),
        operations::VOICE_MATCHING | operations::SMART_REPLY => Duration::zero(),
        _ => Duration::zero(),
    }
}

pub fn is_caching_enabled(operation: &str) -> bool {
    ttl_for(operation) > Duration::zero()
}
