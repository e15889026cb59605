//! # Parley Test Framework
//!
//! Mock 实现和测试工具。
//!
//! ```rust,ignore
//! use parley_core::test::mocks::{MockNotifier, ScriptedTransport};
//!
//! let transport = ScriptedTransport::new();
//! transport.respond(503, "busy").respond(200, r#"{"category":"fan"}"#);
//! ```

pub mod mocks;

/// 测试工具函数
pub mod utils {
    use chrono::{DateTime, TimeZone, Utc};

    /// 固定的测试起点时间
    pub fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 7, 9, 0, 0).unwrap()
    }
}
