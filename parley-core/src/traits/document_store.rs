//! # DocumentStore Trait
//!
//! 托管文档数据库的抽象接口。文档是无模式的 JSON 对象，按路径寻址
//! （`collection/id/subcollection/id`）。
//!
//! ## 约定
//!
//! - 单文档写入是原子的（`increment`、`array_union` 等）
//! - 不提供多文档事务
//! - 读取不存在的文档返回 `Ok(None)`，而不是错误
//!
//! ## 使用示例
//!
//! ```rust,no_run
//! use parley_core::traits::DocumentStore;
//! use serde_json::json;
//!
//! # async fn example(store: &dyn DocumentStore) -> parley_core::Result<()> {
//! store.set("voice_profiles/u1", json!({ "tone": "warm" })).await?;
//! let count = store.increment("rate_limits/u1_categorization_2024-03-01", "count", 1).await?;
//! assert!(count >= 1);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;

/// 托管文档库接口
///
/// 所有方法必须是线程安全的 (Send + Sync)。
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 读取文档
    ///
    /// # Returns
    /// * `Ok(Some(Value))` - 文档存在
    /// * `Ok(None)` - 文档不存在
    async fn get(&self, path: &str) -> Result<Option<Value>>;

    /// 整体替换文档
    async fn set(&self, path: &str, doc: Value) -> Result<()>;

    /// 浅合并字段；文档不存在时创建
    async fn merge(&self, path: &str, patch: Value) -> Result<()>;

    /// 原子递增数值字段，返回递增后的值
    ///
    /// 文档或字段不存在时从 0 开始。
    async fn increment(&self, path: &str, field: &str, by: i64) -> Result<i64>;

    /// 数组字段并集（去重追加）
    async fn array_union(&self, path: &str, field: &str, values: Vec<Value>) -> Result<()>;

    /// 从数组字段移除给定值
    async fn array_remove(&self, path: &str, field: &str, values: Vec<Value>) -> Result<()>;

    /// 删除文档（文档不存在时也返回 Ok）
    async fn delete(&self, path: &str) -> Result<()>;

    /// 列出集合下的直接子文档 `(id, doc)`
    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>>;
}

/// DocumentStore 的 Arc 包装类型
pub type DocumentStoreRef = Arc<dyn DocumentStore>;
