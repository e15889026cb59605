//! # Cache Module
//!
//! AI 结果缓存层，用于减少重复的分类 / 情感 / 机会评分调用。
//!
//! ## 模块结构
//!
//! - `key`: 确定性缓存键（32 位滚动哈希）
//! - `ttl`: 按操作的 TTL 表
//! - `store`: 基于文档库的读写路径
//!
//! ## 示例
//!
//! ```rust,no_run
//! use parley_core::cache::{generate_key, is_caching_enabled, AiCache};
//!
//! # async fn example(cache: AiCache) {
//! let key = generate_key("Are you open to sponsorships?", "categorization");
//! if is_caching_enabled("categorization") {
//!     if let Some(hit) = cache.get_cached_result("uid-1", &key).await {
//!         println!("Cache hit: {}", hit);
//!     }
//! }
//! # }
//! ```

pub mod key;
pub mod store;
pub mod ttl;

pub use key::generate_key;
pub use store::{AiCache, CacheCountersSnapshot, CacheEntry, CacheStats};
pub use ttl::{is_caching_enabled, ttl_for};
