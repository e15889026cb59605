//! # HttpTransport Trait
//!
//! Outbound JSON POST used by the categorization client. Non-2xx statuses are
//! returned as data; only connection-level failures are errors.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body` as JSON, with an optional bearer token.
    ///
    /// # Returns
    /// * `Ok(HttpResponse)` - any status the server answered with
    /// * `Err(ParleyError::Network(_))` - the request never completed
    async fn post_json(&self, url: &str, bearer: Option<&str>, body: &Value) -> Result<HttpResponse>;
}

pub type HttpTransportRef = Arc<dyn HttpTransport>;
