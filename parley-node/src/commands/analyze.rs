//! Commands that need no stored state.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;
use parley_core::boundary::{BoundaryKind, BoundaryTemplates};
use parley_core::cache::{generate_key, is_caching_enabled, ttl_for};
use parley_core::config::ParleyConfig;
use parley_core::health::{burnout_points, burnout_risk, calculate_health, HealthMetrics};
use parley_core::scoring::{score as score_message, MessageSignals};
use parley_core::types::{MessageCategory, RelationshipContext};
use serde_json::json;
use std::collections::HashMap;

use super::{last_interaction, print_json};

#[derive(Args, Debug, Clone)]
pub struct CacheKeyArgs {
    /// AI operation, e.g. categorization
    pub operation: String,
    /// Message content
    pub content: String,
}

#[derive(Args, Debug, Clone)]
pub struct ScoreArgs {
    #[arg(long, default_value = "general")]
    pub category: String,
    /// -1.0 .. 1.0
    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub sentiment: f64,
    /// 0 .. 100
    #[arg(long, default_value_t = 0.0)]
    pub opportunity: f64,
    #[arg(long)]
    pub vip: bool,
    #[arg(long, default_value_t = 0)]
    pub message_count: u32,
    /// Days since the last interaction with the sender
    #[arg(long)]
    pub days_since: Option<i64>,
}

#[derive(Args, Debug, Clone)]
pub struct HealthArgs {
    /// Percent of messages answered personally
    #[arg(long, default_value_t = 100.0)]
    pub personal_response_rate: f64,
    #[arg(long, default_value_t = 0.0)]
    pub avg_response_hours: f64,
    /// Percent of conversations with more than one exchange
    #[arg(long, default_value_t = 100.0)]
    pub conversation_depth: f64,
    /// Percent of the daily capacity used
    #[arg(long, default_value_t = 0.0)]
    pub capacity_usage: f64,
    #[arg(long, default_value_t = 0)]
    pub days_at_max_capacity: u32,
}

impl HealthArgs {
    fn metrics(&self) -> HealthMetrics {
        HealthMetrics {
            personal_response_rate: self.personal_response_rate,
            avg_response_time_hours: self.avg_response_hours,
            conversation_depth: self.conversation_depth,
            capacity_usage: self.capacity_usage,
            days_at_max_capacity: self.days_at_max_capacity,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct TemplateArgs {
    /// capacity_reached | faq_redirect | delayed_response
    pub kind: String,
    /// Template variable as name=value (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE")]
    pub vars: Vec<String>,
}

pub fn cache_key(args: &CacheKeyArgs) -> Result<()> {
    let ttl = ttl_for(&args.operation);
    print_json(&json!({
        "key": generate_key(&args.content, &args.operation),
        "operation": args.operation,
        "cachingEnabled": is_caching_enabled(&args.operation),
        "ttlSeconds": ttl.num_seconds(),
    }))
}

pub fn score(config: &ParleyConfig, args: &ScoreArgs) -> Result<()> {
    let category: MessageCategory = args.category.parse()?;
    let weights = config.scoring_weights()?;
    let now = Utc::now();
    let context = RelationshipContext {
        is_vip: args.vip,
        message_count: args.message_count,
        last_interaction_at: last_interaction(now, args.days_since)?,
    };
    let signals = MessageSignals {
        category,
        sentiment: args.sentiment,
        opportunity_score: args.opportunity,
    };
    print_json(&score_message(&signals, &context, &weights, now))
}

pub fn health(args: &HealthArgs) -> Result<()> {
    print_json(&calculate_health(&args.metrics()))
}

pub fn burnout(args: &HealthArgs) -> Result<()> {
    let metrics = args.metrics();
    print_json(&json!({
        "risk": burnout_risk(&metrics),
        "points": burnout_points(&metrics),
    }))
}

pub fn template(args: &TemplateArgs) -> Result<()> {
    let kind = BoundaryKind::parse(&args.kind)?;
    let vars = parse_vars(&args.vars)?;
    println!("{}", BoundaryTemplates::new().render(kind, &vars)?);
    Ok(())
}

fn parse_vars(raw: &[String]) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    for pair in raw {
        let (name, value) = pair
            .split_once('=')
            .with_context(|| format!("--var {} is not NAME=VALUE", pair))?;
        if name.trim().is_empty() {
            bail!("--var {} has an empty name", pair);
        }
        vars.insert(name.trim().to_string(), value.to_string());
    }
    Ok(vars)
}
