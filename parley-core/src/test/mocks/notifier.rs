//! # Mock Notifier
//!
//! 记录所有已安排的本地通知。

use super::MockCallTracker;
use crate::error::{ParleyError, Result};
use crate::traits::{LocalNotification, Notifier};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub struct MockNotifier {
    tracker: MockCallTracker,
    sent: Arc<Mutex<Vec<LocalNotification>>>,
    failure: Arc<Mutex<Option<ParleyError>>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// 之后的每次调用都返回该错误
    pub fn fail_with(&self, error: ParleyError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    pub fn sent(&self) -> Vec<LocalNotification> {
        self.sent.lock().unwrap().clone()
    }

    pub fn tracker(&self) -> &MockCallTracker {
        &self.tracker
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn schedule_local(&self, notification: LocalNotification) -> Result<()> {
        self.tracker.record(
            "schedule_local",
            vec![notification.data.kind.clone(), notification.data.limit_type.clone()],
        );
        if let Some(err) = self.failure.lock().unwrap().clone() {
            return Err(err);
        }
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}
