use serde_json::Value;
use tracing::{debug, warn};

use super::retry::RetryPolicy;
use crate::config::CategorizerConfig;
use crate::error::{ParleyError, Result};
use crate::traits::{HttpResponse, HttpTransportRef};
use crate::types::{CategorizationRequest, CategorizationResult, MAX_MESSAGE_LENGTH};

/// Reject a request before it reaches the network.
pub fn validate_request(request: &CategorizationRequest) -> Result<()> {
    let required = [
        ("messageId", &request.message_id),
        ("conversationId", &request.conversation_id),
        ("senderId", &request.sender_id),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(ParleyError::validation(format!("{} is required", field)));
        }
    }
    if request.message_text.trim().is_empty() {
        return Err(ParleyError::validation("messageText must not be empty"));
    }
    if request.message_text.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ParleyError::validation(format!(
            "messageText exceeds {} characters",
            MAX_MESSAGE_LENGTH
        )));
    }
    Ok(())
}

/// 分类接口客户端
pub struct CategorizerClient {
    transport: HttpTransportRef,
    endpoint: String,
    api_token: Option<String>,
    policy: RetryPolicy,
}

impl CategorizerClient {
    pub fn new(transport: HttpTransportRef, config: &CategorizerConfig) -> Self {
        Self {
            transport,
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
            policy: RetryPolicy::from_config(config),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Categorize one message, retrying only retryable failures.
    pub async fn categorize(&self, request: &CategorizationRequest) -> Result<CategorizationResult> {
        validate_request(request)?;
        let body = serde_json::to_value(request)?;

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.attempt(&body).await {
                Ok(result) => {
                    debug!(
                        "categorized {} as {} (attempt {})",
                        request.message_id, result.category, attempt
                    );
                    return Ok(result);
                }
                Err(err) if err.is_retryable() && attempt < self.policy.max_attempts => {
                    let delay = self.policy.delay_for(attempt - 1);
                    warn!(
                        "categorize {} attempt {}/{} failed: {}; retrying in {:?}",
                        request.message_id, attempt, self.policy.max_attempts, err, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    warn!(
                        "categorize {} failed after {} attempt(s): {}",
                        request.message_id, attempt, err
                    );
                    return Err(err);
                }
            }
        }
    }

    async fn attempt(&self, body: &Value) -> Result<CategorizationResult> {
        let response = self
            .transport
            .post_json(&self.endpoint, self.api_token.as_deref(), body)
            .await?;
        parse_response(response)
    }
}

fn parse_response(response: HttpResponse) -> Result<CategorizationResult> {
    if !response.is_success() {
        return Err(ParleyError::from_status(response.status, response.body));
    }
    Ok(serde_json::from_str(&response.body)?)
}
