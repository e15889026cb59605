//! AI 调用的性能与成本遥测
//!
//! `PerformanceTracker` 记录每次 AI 调用的延迟、成功与否、模型与 token
//! 用量，写入 `users/{uid}/ai_performance_metrics`。写入走后台队列，
//! 不影响调用方。
//!
//! ```text
//! start(op_id) ──► 调用分类接口 ──► end(op_id, MetricInput)
//!                                        │
//!                                BackgroundQueue
//!                                        │
//!                     users/{uid}/ai_performance_metrics/{id}
//! ```

pub mod cost;
pub mod tracker;

pub use cost::{cost_cents, price_per_1k};
pub use tracker::{
    summarize_metrics, MetricInput, MetricsSummary, OperationSummary, OperationTimer,
    PerformanceMetric, PerformanceTracker,
};
