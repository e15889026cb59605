//! reqwest-backed [`HttpTransport`].

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::error::{ParleyError, Result};
use crate::traits::{HttpResponse, HttpTransport};

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Client with a per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ParleyError::config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(&self, url: &str, bearer: Option<&str>, body: &Value) -> Result<HttpResponse> {
        let mut request = self.client.post(url).json(body);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        let response = request
            .send()
            .await
            .map_err(|e| ParleyError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ParleyError::Network(e.to_string()))?;
        Ok(HttpResponse::new(status, text))
    }
}
