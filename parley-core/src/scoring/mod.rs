//! # Priority Scoring
//!
//! Combines AI signals for a message with the sender relationship into a
//! 0-100 score and a coarse tier.
//!
//! Rules are additive and evaluated in this order:
//!
//! | Signal | Bonus |
//! |--------|-------|
//! | category `business` | `business_opportunity` |
//! | category `urgent` | `urgent` |
//! | sentiment < -0.7 | `crisis_sentiment` |
//! | opportunity score > 80 | `business_opportunity` |
//! | VIP sender | `vip_relationship` |
//! | more than 10 messages | `message_count_bonus` |
//! | last interaction under 7 days ago | `recent_interaction` |
//!
//! A business message with a high opportunity score receives the business
//! bonus twice. That double count is existing ranking behaviour and is kept
//! as-is; it is probably unintended (see DESIGN.md).

pub mod weights;

pub use weights::ScoringWeights;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{CategorizationResult, MessageCategory, PriorityTier, RelationshipContext};

pub const CRISIS_SENTIMENT_THRESHOLD: f64 = -0.7;
pub const HIGH_OPPORTUNITY_THRESHOLD: f64 = 80.0;
pub const ACTIVE_SENDER_MESSAGE_COUNT: u32 = 10;
pub const RECENT_INTERACTION_DAYS: i64 = 7;

pub const HIGH_TIER_MIN: u32 = 70;
pub const MEDIUM_TIER_MIN: u32 = 40;

/// AI signals already computed for a message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageSignals {
    pub category: MessageCategory,
    pub sentiment: f64,
    pub opportunity_score: f64,
}

impl From<&CategorizationResult> for MessageSignals {
    fn from(result: &CategorizationResult) -> Self {
        Self {
            category: result.category,
            sentiment: result.sentiment,
            opportunity_score: result.opportunity_score,
        }
    }
}

/// Per-rule contributions. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub category: f64,
    pub sentiment: f64,
    pub opportunity: f64,
    pub relationship: f64,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScoreResult {
    pub breakdown: ScoreBreakdown,
    pub total: u32,
    pub priority: PriorityTier,
}

/// Score a message. Pure: `now` is only used for the recency rule.
pub fn score(
    signals: &MessageSignals,
    context: &RelationshipContext,
    weights: &ScoringWeights,
    now: DateTime<Utc>,
) -> ScoreResult {
    let mut breakdown = ScoreBreakdown::default();

    match signals.category {
        MessageCategory::Business => breakdown.category += weights.business_opportunity,
        MessageCategory::Urgent => breakdown.category += weights.urgent,
        _ => {}
    }
    if signals.sentiment < CRISIS_SENTIMENT_THRESHOLD {
        breakdown.sentiment += weights.crisis_sentiment;
    }
    if signals.opportunity_score > HIGH_OPPORTUNITY_THRESHOLD {
        breakdown.opportunity += weights.business_opportunity;
    }
    if context.is_vip {
        breakdown.relationship += weights.vip_relationship;
    }
    if context.message_count > ACTIVE_SENDER_MESSAGE_COUNT {
        breakdown.relationship += weights.message_count_bonus;
    }
    if let Some(last) = context.last_interaction_at {
        if now - last < Duration::days(RECENT_INTERACTION_DAYS) {
            breakdown.relationship += weights.recent_interaction;
        }
    }

    let raw = breakdown.category + breakdown.sentiment + breakdown.opportunity + breakdown.relationship;
    let total = raw.clamp(0.0, 100.0).round() as u32;
    breakdown.total = total;

    ScoreResult {
        breakdown,
        total,
        priority: assign_priority_tier(total),
    }
}

pub fn assign_priority_tier(total: u32) -> PriorityTier {
    if total >= HIGH_TIER_MIN {
        PriorityTier::High
    } else if total >= MEDIUM_TIER_MIN {
        PriorityTier::Medium
    } else {
        PriorityTier::Low
    }
}
