//! # 内存文档库实现
//!
//! 基于 `BTreeMap` 的 [`DocumentStore`] 实现，用于测试和 CLI 离线模式。
//!
//! ## 设计特点
//!
//! - **单文档原子性**: 每个写操作持有一次写锁完成读改写
//! - **快照**: `snapshot` / `from_snapshot` 与 JSON 对象互转
//! - **故障注入**: `fail_next` 让下一次操作返回指定错误

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::trace;

use crate::error::{ParleyError, Result};
use crate::traits::DocumentStore;

/// 内存文档库
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    docs: Arc<RwLock<BTreeMap<String, Value>>>,
    fail_next: Arc<Mutex<Option<ParleyError>>>,
    fail_pattern: Arc<Mutex<Option<String>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 `{ path: doc }` 形式的 JSON 对象恢复
    pub fn from_snapshot(snapshot: Value) -> Result<Self> {
        let Value::Object(entries) = snapshot else {
            return Err(ParleyError::Serialization(
                "snapshot must be a JSON object".to_string(),
            ));
        };
        let docs: BTreeMap<String, Value> = entries.into_iter().collect();
        Ok(Self {
            docs: Arc::new(RwLock::new(docs)),
            ..Default::default()
        })
    }

    /// 导出全部文档
    pub async fn snapshot(&self) -> Value {
        let docs = self.docs.read().await;
        Value::Object(docs.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    /// 文档总数
    pub async fn len(&self) -> usize {
        self.docs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.docs.read().await.is_empty()
    }

    /// 设置下一次操作失败
    pub fn fail_next(&self, error: ParleyError) {
        if let Ok(mut slot) = self.fail_next.lock() {
            *slot = Some(error);
        }
    }

    /// 路径包含 `pattern` 的操作全部失败，传 `None` 取消
    pub fn fail_matching(&self, pattern: Option<&str>) {
        if let Ok(mut slot) = self.fail_pattern.lock() {
            *slot = pattern.map(str::to_string);
        }
    }

    fn check_failure(&self, path: &str) -> Result<()> {
        if let Ok(mut slot) = self.fail_next.lock() {
            if let Some(err) = slot.take() {
                return Err(err);
            }
        }
        if let Ok(slot) = self.fail_pattern.lock() {
            if let Some(pattern) = slot.as_ref() {
                if path.contains(pattern.as_str()) {
                    return Err(ParleyError::storage(format!(
                        "simulated failure for path matching {}",
                        pattern
                    )));
                }
            }
        }
        Ok(())
    }
}

fn object_mut<'a>(doc: &'a mut Value, path: &str) -> Result<&'a mut Map<String, Value>> {
    doc.as_object_mut()
        .ok_or_else(|| ParleyError::storage(format!("document at {} is not an object", path)))
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, path: &str) -> Result<Option<Value>> {
        self.check_failure(path)?;
        Ok(self.docs.read().await.get(path).cloned())
    }

    async fn set(&self, path: &str, doc: Value) -> Result<()> {
        self.check_failure(path)?;
        trace!("set {}", path);
        self.docs.write().await.insert(path.to_string(), doc);
        Ok(())
    }

    async fn merge(&self, path: &str, patch: Value) -> Result<()> {
        self.check_failure(path)?;
        let Value::Object(fields) = patch else {
            return Err(ParleyError::validation("merge patch must be an object"));
        };
        let mut docs = self.docs.write().await;
        let doc = docs
            .entry(path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !doc.is_object() {
            *doc = Value::Object(Map::new());
        }
        let target = object_mut(doc, path)?;
        for (key, value) in fields {
            target.insert(key, value);
        }
        Ok(())
    }

    async fn increment(&self, path: &str, field: &str, by: i64) -> Result<i64> {
        self.check_failure(path)?;
        let mut docs = self.docs.write().await;
        let doc = docs
            .entry(path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let target = object_mut(doc, path)?;
        let current = target
            .get(field)
            .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
            .unwrap_or(0);
        let next = current + by;
        target.insert(field.to_string(), Value::from(next));
        Ok(next)
    }

    async fn array_union(&self, path: &str, field: &str, values: Vec<Value>) -> Result<()> {
        self.check_failure(path)?;
        let mut docs = self.docs.write().await;
        let doc = docs
            .entry(path.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let target = object_mut(doc, path)?;
        let array = target
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if !array.is_array() {
            *array = Value::Array(Vec::new());
        }
        if let Value::Array(items) = array {
            for value in values {
                if !items.contains(&value) {
                    items.push(value);
                }
            }
        }
        Ok(())
    }

    async fn array_remove(&self, path: &str, field: &str, values: Vec<Value>) -> Result<()> {
        self.check_failure(path)?;
        let mut docs = self.docs.write().await;
        if let Some(doc) = docs.get_mut(path) {
            let target = object_mut(doc, path)?;
            if let Some(Value::Array(items)) = target.get_mut(field) {
                items.retain(|item| !values.contains(item));
            }
        }
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.check_failure(path)?;
        self.docs.write().await.remove(path);
        Ok(())
    }

    async fn list(&self, collection: &str) -> Result<Vec<(String, Value)>> {
        self.check_failure(collection)?;
        let prefix = format!("{}/", collection.trim_end_matches('/'));
        let docs = self.docs.read().await;
        Ok(docs
            .range(prefix.clone()..)
            .take_while(|(k, _)| k.starts_with(&prefix))
            .filter_map(|(k, v)| {
                let id = &k[prefix.len()..];
                if id.is_empty() || id.contains('/') {
                    None
                } else {
                    Some((id.to_string(), v.clone()))
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_set_get_delete() {
        let store = MemoryDocumentStore::new();
        assert_eq!(store.get("a/1").await.unwrap(), None);

        store.set("a/1", json!({ "x": 1 })).await.unwrap();
        assert_eq!(store.get("a/1").await.unwrap(), Some(json!({ "x": 1 })));

        store.delete("a/1").await.unwrap();
        store.delete("a/1").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_merge_is_shallow_upsert() {
        let store = MemoryDocumentStore::new();
        store.merge("a/1", json!({ "x": 1, "y": 2 })).await.unwrap();
        store.merge("a/1", json!({ "y": 3 })).await.unwrap();
        assert_eq!(store.get("a/1").await.unwrap(), Some(json!({ "x": 1, "y": 3 })));

        let err = store.merge("a/1", json!(5)).await.unwrap_err();
        assert!(matches!(err, ParleyError::Validation(_)));
    }

    #[tokio::test]
    async fn test_increment_creates_and_counts() {
        let store = MemoryDocumentStore::new();
        assert_eq!(store.increment("c/1", "count", 1).await.unwrap(), 1);
        assert_eq!(store.increment("c/1", "count", 4).await.unwrap(), 5);
        assert_eq!(store.get("c/1").await.unwrap(), Some(json!({ "count": 5 })));
    }

    #[tokio::test]
    async fn test_array_union_and_remove() {
        let store = MemoryDocumentStore::new();
        store.array_union("m/1", "readBy", vec![json!("u1"), json!("u2")]).await.unwrap();
        store.array_union("m/1", "readBy", vec![json!("u2"), json!("u3")]).await.unwrap();
        assert_eq!(
            store.get("m/1").await.unwrap().unwrap()["readBy"],
            json!(["u1", "u2", "u3"])
        );

        store.array_remove("m/1", "readBy", vec![json!("u1")]).await.unwrap();
        assert_eq!(store.get("m/1").await.unwrap().unwrap()["readBy"], json!(["u2", "u3"]));
    }

    #[tokio::test]
    async fn test_list_returns_direct_children_only() {
        let store = MemoryDocumentStore::new();
        store.set("users/u1/ai_cache/k1", json!({})).await.unwrap();
        store.set("users/u1/ai_cache/k2", json!({})).await.unwrap();
        store.set("users/u1/ai_cache/k2/nested/x", json!({})).await.unwrap();
        store.set("users/u1/ai_cache_other/k3", json!({})).await.unwrap();

        let ids: Vec<String> = store
            .list("users/u1/ai_cache")
            .await
            .unwrap()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(ids, vec!["k1".to_string(), "k2".to_string()]);
    }

    #[tokio::test]
    async fn test_failure_injection() {
        let store = MemoryDocumentStore::new();
        store.fail_next(ParleyError::storage("down"));
        assert!(store.get("a/1").await.is_err());
        assert!(store.get("a/1").await.is_ok());

        store.fail_matching(Some("rate_limits"));
        assert!(store.get("rate_limits/x").await.is_err());
        assert!(store.get("other/x").await.is_ok());
        store.fail_matching(None);
        assert!(store.get("rate_limits/x").await.is_ok());
    }

    #[tokio::test]
    async fn test_snapshot_roundtrip() {
        let store = MemoryDocumentStore::new();
        store.set("a/1", json!({ "x": 1 })).await.unwrap();
        let restored = MemoryDocumentStore::from_snapshot(store.snapshot().await).unwrap();
        assert_eq!(restored.get("a/1").await.unwrap(), Some(json!({ "x": 1 })));
        assert!(MemoryDocumentStore::from_snapshot(json!([1])).is_err());
    }
}
