//! # Mock Implementations
//!
//! 可验证的 Mock 实现，用于单元测试中的依赖隔离。
//!
//! | Mock | 用途 | 关键能力 |
//! |------|------|----------|
//! | `MockNotifier` | 本地推送 | 记录通知、失败模拟 |
//! | `ScriptedTransport` | 出站 HTTP | 按顺序回放响应 |
//!
//! 文档库不需要 Mock：`MemoryDocumentStore` 自带故障注入。

pub mod notifier;
pub mod transport;

pub use notifier::MockNotifier;
pub use transport::ScriptedTransport;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// 按方法名记录每次调用的参数
#[derive(Debug, Default, Clone)]
pub struct MockCallTracker {
    calls: Arc<Mutex<HashMap<String, Vec<Vec<String>>>>>,
}

impl MockCallTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, method: &str, args: Vec<String>) {
        let mut calls = self.calls.lock().unwrap();
        calls.entry(method.to_string()).or_default().push(args);
    }

    /// 某方法每次调用的参数，按调用顺序
    pub fn args_of(&self, method: &str) -> Vec<Vec<String>> {
        let calls = self.calls.lock().unwrap();
        calls.get(method).cloned().unwrap_or_default()
    }

    pub fn call_count(&self, method: &str) -> usize {
        self.calls.lock().unwrap().get(method).map_or(0, Vec::len)
    }

    pub fn assert_call_count(&self, method: &str, expected: usize) {
        let actual = self.call_count(method);
        assert!(
            actual == expected,
            "{}: expected {} call(s), saw {}",
            method,
            expected,
            actual
        );
    }

    pub fn assert_not_called(&self, method: &str) {
        self.assert_call_count(method, 0);
    }
}
