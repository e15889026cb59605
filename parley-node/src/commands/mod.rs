//! # CLI Commands
//!
//! - `analyze`: pure commands (cache key, score, health, templates)
//! - `state`: commands over a store snapshot (variants, rate limits)
//! - `run`: end-to-end send / categorize / score

pub mod analyze;
pub mod run;
pub mod state;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use parley_core::store::MemoryDocumentStore;
use serde::Serialize;
use std::path::Path;

/// Open a snapshot file, or start empty when it does not exist yet.
pub fn load_store(path: &Path) -> Result<MemoryDocumentStore> {
    if !path.exists() {
        return Ok(MemoryDocumentStore::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read store snapshot {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("store snapshot {} is not valid JSON", path.display()))?;
    Ok(MemoryDocumentStore::from_snapshot(value)?)
}

pub async fn save_store(store: &MemoryDocumentStore, path: &Path) -> Result<()> {
    let snapshot = serde_json::to_string_pretty(&store.snapshot().await)?;
    std::fs::write(path, snapshot)
        .with_context(|| format!("failed to write store snapshot {}", path.display()))
}

/// Turn `--days-since` into the sender's last interaction time.
pub fn last_interaction(now: DateTime<Utc>, days_since: Option<i64>) -> Result<Option<DateTime<Utc>>> {
    let Some(days) = days_since else {
        return Ok(None);
    };
    if days < 0 {
        bail!("--days-since must not be negative, got {}", days);
    }
    let at = Duration::try_days(days)
        .and_then(|ago| now.checked_sub_signed(ago))
        .with_context(|| format!("--days-since {} is out of range", days))?;
    Ok(Some(at))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
