//! Calendar-aligned counting windows.
//!
//! Windows are anchored to UTC. A new hour (or day) yields a new document
//! key, which is the only way a count resets.

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Hourly,
    Daily,
}

impl WindowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::Hourly => "hourly",
            WindowKind::Daily => "daily",
        }
    }

    /// Start of the window containing `now`.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let hour = match self {
            WindowKind::Hourly => now.hour(),
            WindowKind::Daily => 0,
        };
        Utc.with_ymd_and_hms(now.year(), now.month(), now.day(), hour, 0, 0)
            .single()
            .unwrap_or(now)
    }

    /// First instant after the window containing `now`.
    pub fn end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let length = match self {
            WindowKind::Hourly => Duration::hours(1),
            WindowKind::Daily => Duration::days(1),
        };
        self.start(now) + length
    }

    /// `{user}_{operation}_{yyyy-mm-dd-hh}` or `{user}_{operation}_{yyyy-mm-dd}`.
    pub fn key(&self, user: &str, operation: &str, now: DateTime<Utc>) -> String {
        let stamp = match self {
            WindowKind::Hourly => now.format("%Y-%m-%d-%H").to_string(),
            WindowKind::Daily => now.format("%Y-%m-%d").to_string(),
        };
        format!("{}_{}_{}", user, operation, stamp)
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counter document stored at `rate_limits/{windowKey}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitWindow {
    #[serde(default)]
    pub count: u32,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub warning_notification_sent: bool,
}
