//! # Rate Limiter
//!
//! Hourly and daily counters per `(user, operation)`, stored as documents in
//! `rate_limits/`.
//!
//! - `check_limit` only reads; hourly is evaluated before daily
//! - `increment` is called by the caller after the guarded operation succeeds
//! - crossing 80% of a window (below 100%) schedules one warning per window
//!
//! Counters are advisory. Two concurrent increments may read the same
//! pre-increment value for the warning check, and a burst on both sides of a
//! window edge can reach twice the nominal limit.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use super::limits::{limits_for, OperationLimits, WARNING_THRESHOLD};
use super::window::{RateLimitWindow, WindowKind};
use crate::clock::ClockRef;
use crate::error::Result;
use crate::store::{get_typed, paths};
use crate::traits::{DocumentStoreRef, LocalNotification, NotificationPayload, NotifierRef};

/// Which window denied the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitReason {
    HourlyLimit,
    DailyLimit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetTimes {
    pub hourly: DateTime<Utc>,
    pub daily: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    pub allowed: bool,
    pub hourly_count: u32,
    pub daily_count: u32,
    pub hourly_limit: u32,
    pub daily_limit: u32,
    pub reset_times: ResetTimes,
    pub reason: Option<LimitReason>,
    pub message: Option<String>,
}

pub struct RateLimiter {
    store: DocumentStoreRef,
    clock: ClockRef,
    notifier: NotifierRef,
}

impl RateLimiter {
    pub fn new(store: DocumentStoreRef, clock: ClockRef, notifier: NotifierRef) -> Self {
        Self {
            store,
            clock,
            notifier,
        }
    }

    /// Read current usage and decide whether `operation` may run.
    ///
    /// A store failure fails open: the request is allowed with zero counts.
    pub async fn check_limit(&self, user: &str, operation: &str) -> RateLimitStatus {
        let now = self.clock.now();
        let limits = limits_for(operation);
        let hourly_count = self.read_count(user, operation, WindowKind::Hourly, now).await;
        let daily_count = self.read_count(user, operation, WindowKind::Daily, now).await;
        evaluate(operation, limits, hourly_count, daily_count, now)
    }

    /// Alias of [`check_limit`](Self::check_limit) for usage screens.
    pub async fn usage_summary(&self, user: &str, operation: &str) -> RateLimitStatus {
        self.check_limit(user, operation).await
    }

    /// Count one successful `operation` in both windows.
    ///
    /// Errors are logged and swallowed.
    pub async fn increment(&self, user: &str, operation: &str) {
        let now = self.clock.now();
        let limits = limits_for(operation);
        for (kind, limit) in [
            (WindowKind::Hourly, limits.hourly),
            (WindowKind::Daily, limits.daily),
        ] {
            if let Err(e) = self.increment_window(user, operation, kind, limit, now).await {
                warn!(
                    "rate limit increment failed for {} {} ({}): {}",
                    user, operation, kind, e
                );
            }
        }
    }

    /// Delete every window document whose `expiresAt` has passed.
    pub async fn sweep_expired(&self) -> Result<usize> {
        let now = self.clock.now();
        let mut removed = 0;
        for (id, doc) in self.store.list(paths::RATE_LIMITS).await? {
            let expired = serde_json::from_value::<RateLimitWindow>(doc)
                .map(|window| window.expires_at <= now)
                .unwrap_or(false);
            if expired {
                self.store.delete(&paths::rate_limit(&id)).await?;
                removed += 1;
            }
        }
        info!("swept {} expired rate limit windows", removed);
        Ok(removed)
    }

    async fn read_count(
        &self,
        user: &str,
        operation: &str,
        kind: WindowKind,
        now: DateTime<Utc>,
    ) -> u32 {
        let path = paths::rate_limit(&kind.key(user, operation, now));
        match get_typed::<RateLimitWindow>(self.store.as_ref(), &path).await {
            Ok(Some(window)) if window.expires_at > now => window.count,
            Ok(_) => 0,
            Err(e) => {
                warn!("rate limit read failed for {}, allowing: {}", path, e);
                0
            }
        }
    }

    async fn increment_window(
        &self,
        user: &str,
        operation: &str,
        kind: WindowKind,
        limit: u32,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let path = paths::rate_limit(&kind.key(user, operation, now));
        let reset_at = kind.end(now);
        let count = self.store.increment(&path, "count", 1).await?;
        self.store
            .merge(&path, json!({ "expiresAt": reset_at }))
            .await?;

        let count = u32::try_from(count.max(0)).unwrap_or(u32::MAX);
        if !crosses_warning(count, limit) {
            return Ok(());
        }

        let already_sent = get_typed::<RateLimitWindow>(self.store.as_ref(), &path)
            .await?
            .map(|w| w.warning_notification_sent)
            .unwrap_or(false);
        if already_sent {
            return Ok(());
        }

        self.store
            .merge(&path, json!({ "warningNotificationSent": true }))
            .await?;
        let notification = warning_notification(operation, kind, count, limit, reset_at);
        debug!(
            "{} usage for {} at {}%",
            kind, operation, notification.data.percent_used
        );
        if let Err(e) = self.notifier.schedule_local(notification).await {
            warn!("rate limit warning notification failed: {}", e);
        }
        Ok(())
    }
}

fn crosses_warning(count: u32, limit: u32) -> bool {
    limit > 0 && f64::from(count) / f64::from(limit) >= WARNING_THRESHOLD && count < limit
}

fn evaluate(
    operation: &str,
    limits: OperationLimits,
    hourly_count: u32,
    daily_count: u32,
    now: DateTime<Utc>,
) -> RateLimitStatus {
    let reset_times = ResetTimes {
        hourly: WindowKind::Hourly.end(now),
        daily: WindowKind::Daily.end(now),
    };

    let (reason, message) = if hourly_count >= limits.hourly {
        (
            Some(LimitReason::HourlyLimit),
            Some(format!(
                "Hourly limit reached for {} ({}/{}). Resets at {} UTC.",
                operation,
                hourly_count,
                limits.hourly,
                reset_times.hourly.format("%H:%M")
            )),
        )
    } else if daily_count >= limits.daily {
        (
            Some(LimitReason::DailyLimit),
            Some(format!(
                "Daily limit reached for {} ({}/{}). Resets at {} UTC.",
                operation,
                daily_count,
                limits.daily,
                reset_times.daily.format("%Y-%m-%d %H:%M")
            )),
        )
    } else {
        (None, None)
    };

    RateLimitStatus {
        allowed: reason.is_none(),
        hourly_count,
        daily_count,
        hourly_limit: limits.hourly,
        daily_limit: limits.daily,
        reset_times,
        reason,
        message,
    }
}

fn warning_notification(
    operation: &str,
    kind: WindowKind,
    count: u32,
    limit: u32,
    reset_at: DateTime<Utc>,
) -> LocalNotification {
    let percent_used = count.saturating_mul(100) / limit.max(1);
    LocalNotification {
        title: "AI usage warning".to_string(),
        body: format!(
            "You've used {}% of your {} {} limit.",
            percent_used,
            kind,
            operation.replace('_', " ")
        ),
        data: NotificationPayload {
            kind: "rate_limit_warning".to_string(),
            operation: operation.to_string(),
            percent_used,
            limit_type: kind.as_str().to_string(),
            reset_time: reset_at,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::ParleyError;
    use crate::store::MemoryDocumentStore;
    use crate::test::mocks::MockNotifier;
    use crate::traits::DocumentStore;
    use chrono::{Duration, TimeZone};
    use std::sync::Arc;

    fn setup() -> (RateLimiter, MemoryDocumentStore, ManualClock, MockNotifier) {
        let store = MemoryDocumentStore::new();
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap());
        let notifier = MockNotifier::new();
        let limiter = RateLimiter::new(
            Arc::new(store.clone()),
            Arc::new(clock.clone()),
            Arc::new(notifier.clone()),
        );
        (limiter, store, clock, notifier)
    }

    #[tokio::test]
    async fn test_fresh_user_is_allowed() {
        let (limiter, _store, _clock, _notifier) = setup();
        let status = limiter.check_limit("u1", "categorization").await;
        assert!(status.allowed);
        assert_eq!(status.hourly_count, 0);
        assert_eq!(status.hourly_limit, 200);
        assert_eq!(status.daily_limit, 2000);
        assert_eq!(status.reason, None);
        assert_eq!(
            status.reset_times.hourly,
            Utc.with_ymd_and_hms(2024, 3, 7, 10, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_check_does_not_mutate() {
        let (limiter, store, _clock, _notifier) = setup();
        limiter.check_limit("u1", "categorization").await;
        limiter.check_limit("u1", "categorization").await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_hourly_limit_after_200_increments() {
        let (limiter, _store, _clock, _notifier) = setup();
        for _ in 0..200 {
            limiter.increment("u1", "categorization").await;
        }
        let status = limiter.check_limit("u1", "categorization").await;
        assert!(!status.allowed);
        assert_eq!(status.reason, Some(LimitReason::HourlyLimit));
        assert_eq!(status.hourly_count, 200);
        assert_eq!(status.daily_count, 200);
        assert!(status.message.unwrap().contains("Hourly limit"));
    }

    #[tokio::test]
    async fn test_hourly_reported_before_daily() {
        let (limiter, _store, clock, _notifier) = setup();
        // daily_digest: 5/hour, 20/day
        for hour in 0..4 {
            clock.set(Utc.with_ymd_and_hms(2024, 3, 7, 9 + hour, 0, 0).unwrap());
            for _ in 0..5 {
                limiter.increment("u1", "daily_digest").await;
            }
        }
        let status = limiter.check_limit("u1", "daily_digest").await;
        assert_eq!(status.hourly_count, 5);
        assert_eq!(status.daily_count, 20);
        assert_eq!(status.reason, Some(LimitReason::HourlyLimit));

        clock.advance(Duration::hours(1));
        let status = limiter.check_limit("u1", "daily_digest").await;
        assert_eq!(status.hourly_count, 0);
        assert_eq!(status.reason, Some(LimitReason::DailyLimit));
    }

    #[tokio::test]
    async fn test_new_hour_resets_hourly_count() {
        let (limiter, _store, clock, _notifier) = setup();
        for _ in 0..3 {
            limiter.increment("u1", "smart_reply").await;
        }
        clock.advance(Duration::minutes(61));
        let status = limiter.check_limit("u1", "smart_reply").await;
        assert_eq!(status.hourly_count, 0);
        assert_eq!(status.daily_count, 3);
    }

    #[tokio::test]
    async fn test_warning_fires_once_per_window() {
        let (limiter, _store, _clock, notifier) = setup();
        // daily_digest hourly limit 5: 4/5 = 80%
        for _ in 0..3 {
            limiter.increment("u1", "daily_digest").await;
        }
        assert_eq!(notifier.sent().len(), 0);

        limiter.increment("u1", "daily_digest").await;
        let sent = notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].data.limit_type, "hourly");
        assert_eq!(sent[0].data.percent_used, 80);
        assert_eq!(sent[0].data.kind, "rate_limit_warning");

        // 5/5 is at the limit, no second warning
        limiter.increment("u1", "daily_digest").await;
        assert_eq!(notifier.sent().len(), 1);
        notifier.tracker().assert_call_count("schedule_local", 1);
        assert_eq!(
            notifier.tracker().args_of("schedule_local")[0],
            vec!["rate_limit_warning".to_string(), "hourly".to_string()]
        );
    }

    #[tokio::test]
    async fn test_store_failure_fails_open() {
        let (limiter, store, _clock, _notifier) = setup();
        for _ in 0..200 {
            limiter.increment("u1", "categorization").await;
        }
        store.fail_matching(Some("rate_limits"));
        let status = limiter.check_limit("u1", "categorization").await;
        assert!(status.allowed);

        // increment swallows the failure
        limiter.increment("u1", "categorization").await;
    }

    #[tokio::test]
    async fn test_notification_failure_is_swallowed() {
        let (limiter, store, _clock, notifier) = setup();
        notifier.fail_with(ParleyError::Network("push offline".into()));
        for _ in 0..4 {
            limiter.increment("u1", "daily_digest").await;
        }
        let path = paths::rate_limit("u1_daily_digest_2024-03-07-09");
        let doc = store.get(&path).await.unwrap().unwrap();
        assert_eq!(doc["count"], json!(4));
        assert_eq!(doc["warningNotificationSent"], json!(true));
    }

    #[tokio::test]
    async fn test_sweep_removes_only_expired_windows() {
        let (limiter, store, clock, _notifier) = setup();
        limiter.increment("u1", "categorization").await;
        clock.advance(Duration::hours(2));
        limiter.increment("u1", "categorization").await;

        // first hourly window expired; both daily windows share one key
        assert_eq!(limiter.sweep_expired().await.unwrap(), 1);
        assert_eq!(store.list(paths::RATE_LIMITS).await.unwrap().len(), 2);
    }

    #[test]
    fn test_warning_threshold_boundaries() {
        assert!(!crosses_warning(159, 200));
        assert!(crosses_warning(160, 200));
        assert!(crosses_warning(199, 200));
        assert!(!crosses_warning(200, 200));
        assert!(!crosses_warning(0, 0));
    }
}
