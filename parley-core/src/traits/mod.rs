//! # 外部协作方接口 (Traits)
//!
//! 托管后端的抽象接口，用于依赖注入和测试隔离。
//!
//! ## 设计原则
//!
//! - **显式依赖**: 所有服务通过构造函数注入，没有全局单例
//! - **Send + Sync**: 支持并发访问
//! - **异步优先**: 使用 async_trait 支持异步方法
//!
//! | Trait | 用途 | 核心方法 |
//! |-------|------|----------|
//! | [`DocumentStore`] | 托管文档库 | `get`, `set`, `merge`, `increment`, `list` |
//! | [`Notifier`] | 本地推送 | `schedule_local` |
//! | [`HttpTransport`] | 出站 HTTP | `post_json` |

pub mod document_store;
pub mod notifier;
pub mod transport;

pub use document_store::{DocumentStore, DocumentStoreRef};
pub use notifier::{
    LocalNotification, NotificationPayload, Notifier, NotifierRef, TracingNotifier,
};
pub use transport::{HttpResponse, HttpTransport, HttpTransportRef};
