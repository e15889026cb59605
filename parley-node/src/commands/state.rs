//! Commands over a store snapshot.

use anyhow::{bail, Result};
use clap::Args;
use parley_core::ab_test::{validate_split_ratio, variant_for, AbTestService};
use parley_core::clock::{ClockRef, SystemClock};
use parley_core::rate_limit::RateLimiter;
use parley_core::tasks::BackgroundQueue;
use parley_core::traits::{DocumentStoreRef, TracingNotifier};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

use super::{load_store, print_json, save_store};

#[derive(Args, Debug, Clone)]
pub struct VariantArgs {
    #[arg(long)]
    pub test: String,
    #[arg(long)]
    pub user: String,
    /// Look the test up in this snapshot
    #[arg(long, conflicts_with = "split")]
    pub store: Option<PathBuf>,
    /// Assign against a split ratio without a stored test
    #[arg(long)]
    pub split: Option<f64>,
}

#[derive(Args, Debug, Clone)]
pub struct RateLimitArgs {
    #[arg(long)]
    pub store: PathBuf,
    #[arg(long)]
    pub user: Option<String>,
    #[arg(long, default_value = "categorization")]
    pub operation: String,
    /// Delete expired windows and save the snapshot
    #[arg(long)]
    pub sweep: bool,
}

pub async fn variant(args: &VariantArgs) -> Result<()> {
    let assigned = match (&args.store, args.split) {
        (Some(path), _) => {
            let store = load_store(path)?;
            let queue = BackgroundQueue::start();
            let service = AbTestService::new(Arc::new(store), Arc::new(SystemClock), queue);
            service.assign_variant(&args.test, &args.user).await
        }
        (None, split) => {
            let ratio = split.unwrap_or(0.5);
            validate_split_ratio(ratio)?;
            Some(variant_for(&args.test, &args.user, ratio))
        }
    };
    print_json(&json!({
        "test": args.test,
        "user": args.user,
        "variant": assigned.map(|v| v.to_string()),
    }))
}

pub async fn rate_limit(args: &RateLimitArgs) -> Result<()> {
    let store = load_store(&args.store)?;
    let store_ref: DocumentStoreRef = Arc::new(store.clone());
    let clock: ClockRef = Arc::new(SystemClock);
    let limiter = RateLimiter::new(store_ref, clock, Arc::new(TracingNotifier));

    if args.sweep {
        let removed = limiter.sweep_expired().await?;
        save_store(&store, &args.store).await?;
        return print_json(&json!({ "removed": removed }));
    }

    let Some(user) = &args.user else {
        bail!("--user is required unless --sweep is given");
    };
    print_json(&limiter.usage_summary(user, &args.operation).await)
}
