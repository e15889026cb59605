//! # AI Result Cache
//!
//! 按用户存放的 AI 结果缓存，文档位于 `users/{uid}/ai_cache/{key}`。
//!
//! ## 读路径
//!
//! - 文档不存在或 `now >= expiresAt` 视为未命中，过期文档不删除
//! - 命中时在后台队列里递增 `hitCount`，不阻塞调用方
//!
//! ## 写路径
//!
//! - 解析后的 TTL 为 0 时不写
//! - 否则在后台队列里写入 `expiresAt = now + ttl`
//!
//! 缓存路径上的任何错误都只记录日志，调用方总是得到命中或明确的未命中。

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use super::ttl::ttl_for;
use crate::clock::ClockRef;
use crate::error::Result;
use crate::store::{get_typed, paths, set_typed};
use crate::tasks::BackgroundQueue;
use crate::traits::DocumentStoreRef;

/// 缓存条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub key: String,
    pub operation: String,
    pub result: Value,
    pub cached_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub hit_count: u64,
    #[serde(default)]
    pub last_hit_at: Option<DateTime<Utc>>,
}

impl CacheEntry {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// 单个用户缓存集合的统计
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub entries: usize,
    pub live_entries: usize,
    pub total_hits: u64,
}

/// 进程内命中统计
#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    writes: AtomicU64,
    errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheCountersSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub writes: u64,
    pub errors: u64,
}

impl CacheCountersSnapshot {
    /// 命中率 (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

/// AI 结果缓存
#[derive(Clone)]
pub struct AiCache {
    store: DocumentStoreRef,
    clock: ClockRef,
    queue: BackgroundQueue,
    counters: Arc<CacheCounters>,
}

impl AiCache {
    pub fn new(store: DocumentStoreRef, clock: ClockRef, queue: BackgroundQueue) -> Self {
        Self {
            store,
            clock,
            queue,
            counters: Arc::new(CacheCounters::default()),
        }
    }

    /// 读取缓存结果
    ///
    /// # Returns
    /// * `Some(result)` - 未过期的命中
    /// * `None` - 未命中、已过期或读取失败
    pub async fn get_cached_result(&self, uid: &str, key: &str) -> Option<Value> {
        let path = paths::ai_cache(uid, key);
        let entry: CacheEntry = match get_typed(self.store.as_ref(), &path).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                return None;
            }
            Err(e) => {
                self.counters.errors.fetch_add(1, Ordering::Relaxed);
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                warn!("cache read failed for {}: {}", path, e);
                return None;
            }
        };

        let now = self.clock.now();
        if entry.is_expired(now) {
            debug!("cache entry {} expired at {}", key, entry.expires_at);
            self.counters.misses.fetch_add(1, Ordering::Relaxed);
            return None;
        }

        self.counters.hits.fetch_add(1, Ordering::Relaxed);
        let store = self.store.clone();
        self.queue.submit(format!("cache_hit:{}", key), async move {
            store.increment(&path, "hitCount", 1).await?;
            store.merge(&path, json!({ "lastHitAt": now })).await
        });

        Some(entry.result)
    }

    /// 写入缓存结果
    ///
    /// `ttl_override` 优先于操作表中的 TTL。返回是否安排了写入。
    pub fn set_cached_result(
        &self,
        uid: &str,
        key: &str,
        operation: &str,
        result: Value,
        ttl_override: Option<Duration>,
    ) -> bool {
        let ttl = ttl_override.unwrap_or_else(|| ttl_for(operation));
        if ttl <= Duration::zero() {
            debug!("caching disabled for {}", operation);
            return false;
        }

        let now = self.clock.now();
        let entry = CacheEntry {
            key: key.to_string(),
            operation: operation.to_string(),
            result,
            cached_at: now,
            expires_at: now + ttl,
            hit_count: 0,
            last_hit_at: None,
        };
        let path = paths::ai_cache(uid, key);
        let store = self.store.clone();
        self.counters.writes.fetch_add(1, Ordering::Relaxed);
        self.queue.submit(format!("cache_write:{}", key), async move {
            set_typed(store.as_ref(), &path, &entry).await
        });
        true
    }

    /// 统计用户缓存集合
    pub async fn get_cache_stats(&self, uid: &str) -> Result<CacheStats> {
        let now = self.clock.now();
        let docs = self.store.list(&paths::ai_cache_collection(uid)).await?;
        let mut stats = CacheStats::default();
        for (_, doc) in docs {
            let Ok(entry) = serde_json::from_value::<CacheEntry>(doc) else {
                continue;
            };
            stats.entries += 1;
            stats.total_hits += entry.hit_count;
            if !entry.is_expired(now) {
                stats.live_entries += 1;
            }
        }
        Ok(stats)
    }

    /// 删除过期条目，返回删除数量
    pub async fn clear_expired(&self, uid: &str) -> Result<usize> {
        let now = self.clock.now();
        let collection = paths::ai_cache_collection(uid);
        let mut removed = 0;
        for (id, doc) in self.store.list(&collection).await? {
            let expired = serde_json::from_value::<CacheEntry>(doc)
                .map(|entry| entry.is_expired(now))
                .unwrap_or(true);
            if expired {
                self.store.delete(&paths::ai_cache(uid, &id)).await?;
                removed += 1;
            }
        }
        debug!("cleared {} expired cache entries for {}", removed, uid);
        Ok(removed)
    }

    pub fn counters(&self) -> CacheCountersSnapshot {
        CacheCountersSnapshot {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            writes: self.counters.writes.load(Ordering::Relaxed),
            errors: self.counters.errors.load(Ordering::Relaxed),
        }
    }
}
