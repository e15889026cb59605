//! # Scripted HTTP Transport
//!
//! 按顺序回放预设的响应，并记录收到的请求。

use super::MockCallTracker;
use crate::error::{ParleyError, Result};
use crate::traits::{HttpResponse, HttpTransport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub url: String,
    pub bearer: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    tracker: MockCallTracker,
    script: Arc<Mutex<VecDeque<Result<HttpResponse>>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个响应
    pub fn respond(&self, status: u16, body: impl Into<String>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Ok(HttpResponse::new(status, body)));
        self
    }

    /// 追加一次连接失败
    pub fn fail(&self, message: impl Into<String>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Err(ParleyError::Network(message.into())));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn tracker(&self) -> &MockCallTracker {
        &self.tracker
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    async fn post_json(&self, url: &str, bearer: Option<&str>, body: &Value) -> Result<HttpResponse> {
        self.tracker.record("post_json", vec![url.to_string()]);
        self.requests.lock().unwrap().push(RecordedRequest {
            url: url.to_string(),
            bearer: bearer.map(str::to_string),
            body: body.clone(),
        });
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ParleyError::Network("no scripted response".to_string())))
    }
}
