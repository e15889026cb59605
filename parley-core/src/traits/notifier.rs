//! # Notifier Trait
//!
//! Local push scheduling. Delivery and push-token handling belong to the
//! device platform, this layer only hands over a payload.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::Result;

/// Structured data carried with a notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(rename = "type")]
    pub kind: String,
    pub operation: String,
    pub percent_used: u32,
    pub limit_type: String,
    pub reset_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalNotification {
    pub title: String,
    pub body: String,
    pub data: NotificationPayload,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn schedule_local(&self, notification: LocalNotification) -> Result<()>;
}

pub type NotifierRef = Arc<dyn Notifier>;

/// Writes notifications to the log instead of a device.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn schedule_local(&self, notification: LocalNotification) -> Result<()> {
        info!(
            kind = %notification.data.kind,
            operation = %notification.data.operation,
            percent_used = notification.data.percent_used,
            "{}: {}",
            notification.title,
            notification.body
        );
        Ok(())
    }
}
