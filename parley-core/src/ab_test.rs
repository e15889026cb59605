//! # A/B Testing
//!
//! Compares two configurations of an AI operation (prompt, model, ...) on
//! live traffic. Tests live at `ai_ab_tests/{testId}`.
//!
//! - assignment is a stable hash of `"{testId}:{userId}"` mapped into [0, 1)
//! - a missing or inactive test assigns nothing
//! - a failed lookup assigns the control arm `A`
//! - per-arm stats are running means, updated in the background queue
//! - no winner is declared until both arms have [`MIN_SAMPLES_PER_ARM`] samples

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::cache::key::rolling_hash;
use crate::clock::ClockRef;
use crate::error::{ParleyError, Result};
use crate::store::{get_typed, paths, set_typed};
use crate::tasks::BackgroundQueue;
use crate::traits::DocumentStoreRef;

pub const MIN_SAMPLES_PER_ARM: u64 = 30;

const BUCKETS: u32 = 10_000;
const EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variant {
    A,
    B,
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::A => f.write_str("A"),
            Variant::B => f.write_str("B"),
        }
    }
}

/// Running stats for one arm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantResults {
    pub total_operations: u64,
    /// ms
    pub avg_latency: f64,
    /// cents
    pub avg_cost: f64,
    pub success_rate: f64,
}

impl VariantResults {
    /// `new = (old * n + value) / (n + 1)` for every mean.
    pub fn record(&mut self, latency_ms: f64, cost_cents: f64, success: bool) {
        let n = self.total_operations as f64;
        let hit = if success { 1.0 } else { 0.0 };
        self.avg_latency = (self.avg_latency * n + latency_ms) / (n + 1.0);
        self.avg_cost = (self.avg_cost * n + cost_cents) / (n + 1.0);
        self.success_rate = (self.success_rate * n + hit) / (n + 1.0);
        self.total_operations += 1;
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTestResults {
    pub variant_a: VariantResults,
    pub variant_b: VariantResults,
}

impl AbTestResults {
    fn arm_mut(&mut self, variant: Variant) -> &mut VariantResults {
        match variant {
            Variant::A => &mut self.variant_a,
            Variant::B => &mut self.variant_b,
        }
    }
}

/// 测试配置（`ai_ab_tests/{testId}`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbTestConfig {
    pub id: String,
    pub name: String,
    pub operation: String,
    pub variant_a: Value,
    pub variant_b: Value,
    /// Share of users assigned to `A`
    pub split_ratio: f64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub results: AbTestResults,
}

/// Parameters for [`AbTestService::create_test`].
#[derive(Debug, Clone)]
pub struct NewAbTest {
    pub name: String,
    pub operation: String,
    pub variant_a: Value,
    pub variant_b: Value,
    pub split_ratio: f64,
}

impl NewAbTest {
    pub fn new(name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operation: operation.into(),
            variant_a: Value::Null,
            variant_b: Value::Null,
            split_ratio: 0.5,
        }
    }

    pub fn with_variants(mut self, a: Value, b: Value) -> Self {
        self.variant_a = a;
        self.variant_b = b;
        self
    }

    pub fn with_split_ratio(mut self, ratio: f64) -> Self {
        self.split_ratio = ratio;
        self
    }
}

/// Verdict once both arms have enough samples. Deltas are `B - A`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub winner: Variant,
    pub success_rate_delta: f64,
    pub latency_delta_ms: f64,
    pub cost_delta_cents: f64,
    pub samples_a: u64,
    pub samples_b: u64,
}

/// Position of `(test_id, user_id)` in [0, 1).
pub fn bucket(test_id: &str, user_id: &str) -> f64 {
    let hash = rolling_hash(&format!("{}:{}", test_id, user_id)).unsigned_abs();
    f64::from(hash % BUCKETS) / f64::from(BUCKETS)
}

pub fn variant_for(test_id: &str, user_id: &str, split_ratio: f64) -> Variant {
    if bucket(test_id, user_id) < split_ratio {
        Variant::A
    } else {
        Variant::B
    }
}

/// Winner by success rate, then lower latency, then lower cost; `A` on a full tie.
pub fn compare_variants(results: &AbTestResults) -> Option<Comparison> {
    let a = &results.variant_a;
    let b = &results.variant_b;
    if a.total_operations < MIN_SAMPLES_PER_ARM || b.total_operations < MIN_SAMPLES_PER_ARM {
        return None;
    }

    let winner = if (a.success_rate - b.success_rate).abs() > EPSILON {
        if b.success_rate > a.success_rate {
            Variant::B
        } else {
            Variant::A
        }
    } else if (a.avg_latency - b.avg_latency).abs() > EPSILON {
        if b.avg_latency < a.avg_latency {
            Variant::B
        } else {
            Variant::A
        }
    } else if b.avg_cost + EPSILON < a.avg_cost {
        Variant::B
    } else {
        Variant::A
    };

    Some(Comparison {
        winner,
        success_rate_delta: b.success_rate - a.success_rate,
        latency_delta_ms: b.avg_latency - a.avg_latency,
        cost_delta_cents: b.avg_cost - a.avg_cost,
        samples_a: a.total_operations,
        samples_b: b.total_operations,
    })
}

pub fn validate_split_ratio(ratio: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&ratio) {
        return Err(ParleyError::validation(format!(
            "split ratio must be within [0, 1], got {}",
            ratio
        )));
    }
    Ok(())
}

/// A/B 测试服务
pub struct AbTestService {
    store: DocumentStoreRef,
    clock: ClockRef,
    queue: BackgroundQueue,
}

impl AbTestService {
    pub fn new(store: DocumentStoreRef, clock: ClockRef, queue: BackgroundQueue) -> Self {
        Self { store, clock, queue }
    }

    pub async fn create_test(&self, params: NewAbTest) -> Result<AbTestConfig> {
        validate_split_ratio(params.split_ratio)?;
        if params.name.trim().is_empty() || params.operation.trim().is_empty() {
            return Err(ParleyError::validation("test name and operation are required"));
        }
        let config = AbTestConfig {
            id: Uuid::new_v4().to_string(),
            name: params.name,
            operation: params.operation,
            variant_a: params.variant_a,
            variant_b: params.variant_b,
            split_ratio: params.split_ratio,
            active: true,
            created_at: self.clock.now(),
            results: AbTestResults::default(),
        };
        set_typed(self.store.as_ref(), &paths::ab_test(&config.id), &config).await?;
        info!("created A/B test {} ({}) for {}", config.id, config.name, config.operation);
        Ok(config)
    }

    pub async fn get_test(&self, test_id: &str) -> Result<Option<AbTestConfig>> {
        get_typed(self.store.as_ref(), &paths::ab_test(test_id)).await
    }

    pub async fn assign_variant(&self, test_id: &str, user_id: &str) -> Option<Variant> {
        match self.get_test(test_id).await {
            Ok(Some(test)) if test.active => Some(variant_for(test_id, user_id, test.split_ratio)),
            Ok(_) => None,
            Err(e) => {
                warn!("A/B lookup for {} failed, assigning control: {}", test_id, e);
                Some(Variant::A)
            }
        }
    }

    /// Queue a sample; never fails the caller.
    pub fn track_performance(
        &self,
        test_id: &str,
        variant: Variant,
        latency: Duration,
        cost_cents: f64,
        success: bool,
    ) {
        let store = self.store.clone();
        let test_id = test_id.to_string();
        let latency_ms = latency.as_secs_f64() * 1000.0;
        self.queue.submit(format!("ab_track:{}", test_id), async move {
            record_sample(&store, &test_id, variant, latency_ms, cost_cents, success).await
        });
    }

    pub async fn compare_results(&self, test_id: &str) -> Result<Option<Comparison>> {
        Ok(self
            .get_test(test_id)
            .await?
            .and_then(|test| compare_variants(&test.results)))
    }

    pub async fn deactivate_test(&self, test_id: &str) -> Result<()> {
        let path = paths::ab_test(test_id);
        if self.store.get(&path).await?.is_none() {
            return Err(ParleyError::not_found(format!("A/B test {}", test_id)));
        }
        self.store.merge(&path, json!({ "active": false })).await?;
        info!("deactivated A/B test {}", test_id);
        Ok(())
    }
}

async fn record_sample(
    store: &DocumentStoreRef,
    test_id: &str,
    variant: Variant,
    latency_ms: f64,
    cost_cents: f64,
    success: bool,
) -> Result<()> {
    let path = paths::ab_test(test_id);
    let Some(mut test) = get_typed::<AbTestConfig>(store.as_ref(), &path).await? else {
        debug!("dropping sample for unknown A/B test {}", test_id);
        return Ok(());
    };
    test.results.arm_mut(variant).record(latency_ms, cost_cents, success);
    let results = serde_json::to_value(test.results)?;
    store.merge(&path, json!({ "results": results })).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::store::MemoryDocumentStore;
    use crate::test::utils::fixed_now;
    use std::sync::Arc;

    fn setup() -> (AbTestService, MemoryDocumentStore, BackgroundQueue) {
        let store = MemoryDocumentStore::new();
        let clock = ManualClock::new(fixed_now());
        let queue = BackgroundQueue::start();
        let service = AbTestService::new(Arc::new(store.clone()), Arc::new(clock), queue.clone());
        (service, store, queue)
    }

    fn arm(n: u64, success_rate: f64, latency: f64, cost: f64) -> VariantResults {
        VariantResults {
            total_operations: n,
            avg_latency: latency,
            avg_cost: cost,
            success_rate,
        }
    }

    #[test]
    fn test_assignment_is_stable() {
        for user in ["u1", "u2", "fan-42", ""] {
            assert_eq!(variant_for("t1", user, 0.5), variant_for("t1", user, 0.5));
            let b = bucket("t1", user);
            assert!((0.0..1.0).contains(&b));
        }
    }

    #[test]
    fn test_split_ratio_extremes() {
        for user in ["u1", "u2", "u3", "u4"] {
            assert_eq!(variant_for("t1", user, 1.0), Variant::A);
            assert_eq!(variant_for("t1", user, 0.0), Variant::B);
        }
    }

    #[test]
    fn test_running_means() {
        let mut results = VariantResults::default();
        results.record(100.0, 1.0, true);
        results.record(300.0, 3.0, false);
        assert_eq!(results.total_operations, 2);
        assert_eq!(results.avg_latency, 200.0);
        assert_eq!(results.avg_cost, 2.0);
        assert_eq!(results.success_rate, 0.5);
    }

    #[test]
    fn test_compare_requires_min_samples() {
        let results = AbTestResults {
            variant_a: arm(10, 0.9, 100.0, 1.0),
            variant_b: arm(10, 0.5, 100.0, 1.0),
        };
        assert!(compare_variants(&results).is_none());

        let lopsided = AbTestResults {
            variant_a: arm(100, 0.9, 100.0, 1.0),
            variant_b: arm(29, 0.5, 100.0, 1.0),
        };
        assert!(compare_variants(&lopsided).is_none());
    }

    #[test]
    fn test_compare_tie_breakers() {
        let by_success = compare_variants(&AbTestResults {
            variant_a: arm(30, 0.8, 100.0, 1.0),
            variant_b: arm(30, 0.9, 400.0, 5.0),
        })
        .unwrap();
        assert_eq!(by_success.winner, Variant::B);
        assert!((by_success.success_rate_delta - 0.1).abs() < 1e-9);

        let by_latency = compare_variants(&AbTestResults {
            variant_a: arm(30, 0.9, 120.0, 1.0),
            variant_b: arm(30, 0.9, 200.0, 0.5),
        })
        .unwrap();
        assert_eq!(by_latency.winner, Variant::A);
        assert_eq!(by_latency.latency_delta_ms, 80.0);

        let by_cost = compare_variants(&AbTestResults {
            variant_a: arm(30, 0.9, 120.0, 1.0),
            variant_b: arm(30, 0.9, 120.0, 0.5),
        })
        .unwrap();
        assert_eq!(by_cost.winner, Variant::B);
    }

    #[tokio::test]
    async fn test_create_validates_split_ratio() {
        let (service, store, _queue) = setup();
        for ratio in [-0.1, 1.5, f64::NAN] {
            let err = service
                .create_test(NewAbTest::new("prompt-v2", "categorization").with_split_ratio(ratio))
                .await
                .unwrap_err();
            assert!(matches!(err, ParleyError::Validation(_)));
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_assign_variant_lifecycle() {
        let (service, _store, _queue) = setup();
        assert_eq!(service.assign_variant("missing", "u1").await, None);

        let test = service
            .create_test(NewAbTest::new("prompt-v2", "categorization").with_split_ratio(1.0))
            .await
            .unwrap();
        assert_eq!(service.assign_variant(&test.id, "u1").await, Some(Variant::A));
        assert_eq!(service.assign_variant(&test.id, "u1").await, Some(Variant::A));

        service.deactivate_test(&test.id).await.unwrap();
        assert_eq!(service.assign_variant(&test.id, "u1").await, None);
    }

    #[tokio::test]
    async fn test_lookup_failure_assigns_control() {
        let (service, store, _queue) = setup();
        store.fail_next(ParleyError::storage("offline"));
        assert_eq!(service.assign_variant("t1", "u1").await, Some(Variant::A));
    }

    #[tokio::test]
    async fn test_tracking_and_comparison() {
        let (service, _store, queue) = setup();
        let test = service
            .create_test(NewAbTest::new("model-swap", "sentiment"))
            .await
            .unwrap();

        for _ in 0..10 {
            service.track_performance(&test.id, Variant::A, Duration::from_millis(100), 0.5, true);
            service.track_performance(&test.id, Variant::B, Duration::from_millis(80), 0.5, true);
        }
        queue.flush().await;
        assert!(service.compare_results(&test.id).await.unwrap().is_none());

        for _ in 0..20 {
            service.track_performance(&test.id, Variant::A, Duration::from_millis(100), 0.5, true);
            service.track_performance(&test.id, Variant::B, Duration::from_millis(80), 0.5, true);
        }
        queue.flush().await;

        let stored = service.get_test(&test.id).await.unwrap().unwrap();
        assert_eq!(stored.results.variant_a.total_operations, 30);
        assert!((stored.results.variant_b.avg_latency - 80.0).abs() < 1e-6);

        let verdict = service.compare_results(&test.id).await.unwrap().unwrap();
        assert_eq!(verdict.winner, Variant::B);
    }

    #[tokio::test]
    async fn test_deactivate_missing_test() {
        let (service, _store, _queue) = setup();
        let err = service.deactivate_test("nope").await.unwrap_err();
        assert!(matches!(err, ParleyError::NotFound(_)));
    }
}
