use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use uuid::Uuid;

use super::cost::cost_cents;
use crate::clock::ClockRef;
use crate::error::Result;
use crate::store::{paths, set_typed};
use crate::tasks::BackgroundQueue;
use crate::traits::DocumentStoreRef;

/// 单次 AI 调用的性能记录（只追加）
///
/// 存储于 `users/{uid}/ai_performance_metrics/{id}`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetric {
    pub operation: String,
    /// 毫秒
    pub latency: u64,
    pub success: bool,
    pub model_used: Option<String>,
    pub tokens_used: Option<u32>,
    pub cost_cents: f64,
    pub cache_hit: bool,
    pub timestamp: DateTime<Utc>,
}

/// 结束一次计时所需的调用信息
#[derive(Debug, Clone, Default)]
pub struct MetricInput {
    pub uid: String,
    pub operation: String,
    pub success: bool,
    pub model_used: Option<String>,
    pub tokens_used: Option<u32>,
    pub cache_hit: bool,
}

impl MetricInput {
    pub fn new(uid: impl Into<String>, operation: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            operation: operation.into(),
            success: true,
            ..Default::default()
        }
    }

    pub fn failed(mut self) -> Self {
        self.success = false;
        self
    }

    pub fn with_model(mut self, model: impl Into<String>, tokens: u32) -> Self {
        self.model_used = Some(model.into());
        self.tokens_used = Some(tokens);
        self
    }

    pub fn cache_hit(mut self) -> Self {
        self.cache_hit = true;
        self
    }
}

/// 每个操作的汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OperationSummary {
    pub operations: u64,
    pub avg_latency_ms: f64,
    pub total_cost_cents: f64,
}

/// 时间窗口内的性能汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub operations: u64,
    pub avg_latency_ms: f64,
    pub success_rate: f64,
    pub cache_hit_rate: f64,
    pub total_cost_cents: f64,
    pub by_operation: HashMap<String, OperationSummary>,
}

/// 性能 / 成本追踪器
///
/// 开始时间保存在实例自己的 map 里，按调用方提供的 operation id 关联，
/// 结束时移除。指标写入通过后台队列完成。
pub struct PerformanceTracker {
    store: DocumentStoreRef,
    clock: ClockRef,
    queue: BackgroundQueue,
    starts: Arc<DashMap<String, Instant>>,
    enabled: bool,
}

impl PerformanceTracker {
    pub fn new(store: DocumentStoreRef, clock: ClockRef, queue: BackgroundQueue) -> Self {
        Self {
            store,
            clock,
            queue,
            starts: Arc::new(DashMap::new()),
            enabled: true,
        }
    }

    /// 关闭后 `start`/`end` 仍计时，但不写入指标
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn start(&self, op_id: &str) {
        if self.starts.insert(op_id.to_string(), Instant::now()).is_some() {
            debug!("operation {} restarted", op_id);
        }
    }

    /// 结束计时并记录指标；未知的 op_id 返回 `None`
    pub fn end(&self, op_id: &str, input: MetricInput) -> Option<Duration> {
        let Some((_, started)) = self.starts.remove(op_id) else {
            warn!("end() for unknown operation id {}", op_id);
            return None;
        };
        let latency = started.elapsed();
        self.record(input, latency);
        Some(latency)
    }

    /// 直接记录一条指标（例如缓存命中，没有计时）
    pub fn record(&self, input: MetricInput, latency: Duration) {
        if !self.enabled {
            return;
        }
        let cost = match (&input.model_used, input.tokens_used) {
            (Some(model), Some(tokens)) if !input.cache_hit => cost_cents(model, tokens),
            _ => 0.0,
        };
        let metric = PerformanceMetric {
            operation: input.operation,
            latency: u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
            success: input.success,
            model_used: input.model_used,
            tokens_used: input.tokens_used,
            cost_cents: cost,
            cache_hit: input.cache_hit,
            timestamp: self.clock.now(),
        };
        let path = paths::metric(&input.uid, &Uuid::new_v4().to_string());
        let store = self.store.clone();
        self.queue.submit(format!("metric:{}", metric.operation), async move {
            set_typed(store.as_ref(), &path, &metric).await
        });
    }

    /// 进行中的计时数量
    pub fn pending(&self) -> usize {
        self.starts.len()
    }

    /// 开始计时，返回的计时器被丢弃而未 `finish` 时清除开始时间
    pub fn begin(&self) -> OperationTimer<'_> {
        let op_id = Uuid::new_v4().to_string();
        self.start(&op_id);
        OperationTimer {
            tracker: self,
            op_id,
            finished: false,
        }
    }

    /// 汇总 `since` 之后的指标
    pub async fn summarize(&self, uid: &str, since: DateTime<Utc>) -> Result<MetricsSummary> {
        let docs = self.store.list(&paths::metrics_collection(uid)).await?;
        let metrics: Vec<PerformanceMetric> = docs
            .into_iter()
            .filter_map(|(_, doc)| serde_json::from_value(doc).ok())
            .filter(|m: &PerformanceMetric| m.timestamp >= since)
            .collect();
        Ok(summarize_metrics(&metrics))
    }
}

/// In-flight operation started by [`PerformanceTracker::begin`].
pub struct OperationTimer<'a> {
    tracker: &'a PerformanceTracker,
    op_id: String,
    finished: bool,
}

impl OperationTimer<'_> {
    pub fn op_id(&self) -> &str {
        &self.op_id
    }

    pub fn finish(mut self, input: MetricInput) -> Option<Duration> {
        self.finished = true;
        self.tracker.end(&self.op_id, input)
    }
}

impl Drop for OperationTimer<'_> {
    fn drop(&mut self) {
        if !self.finished && self.tracker.starts.remove(&self.op_id).is_some() {
            debug!("operation {} abandoned before it finished", self.op_id);
        }
    }
}

pub fn summarize_metrics(metrics: &[PerformanceMetric]) -> MetricsSummary {
    if metrics.is_empty() {
        return MetricsSummary::default();
    }
    let n = metrics.len() as f64;
    let mut summary = MetricsSummary {
        operations: metrics.len() as u64,
        ..Default::default()
    };
    let mut latency_total = 0.0;
    let mut successes = 0u64;
    let mut hits = 0u64;

    for metric in metrics {
        latency_total += metric.latency as f64;
        summary.total_cost_cents += metric.cost_cents;
        if metric.success {
            successes += 1;
        }
        if metric.cache_hit {
            hits += 1;
        }
        let entry = summary
            .by_operation
            .entry(metric.operation.clone())
            .or_default();
        entry.avg_latency_ms = (entry.avg_latency_ms * entry.operations as f64 + metric.latency as f64)
            / (entry.operations + 1) as f64;
        entry.operations += 1;
        entry.total_cost_cents += metric.cost_cents;
    }

    summary.avg_latency_ms = latency_total / n;
    summary.success_rate = successes as f64 / n;
    summary.cache_hit_rate = hits as f64 / n;
    summary
}
