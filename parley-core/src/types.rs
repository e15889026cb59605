//! Parley 类型定义

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{ParleyError, Result};

/// 消息 ID
pub type MessageId = String;

/// 会话 ID
pub type ConversationId = String;

/// 用户 ID
pub type UserId = String;

/// 单条消息的最大字符数
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// AI 操作名称（缓存 TTL 表与限流表的键）
pub mod operations {
    pub const CATEGORIZATION: &str = "categorization";
    pub const SENTIMENT: &str = "sentiment";
    pub const OPPORTUNITY_SCORING: &str = "opportunity_scoring";
    pub const FAQ_DETECTION: &str = "faq_detection";
    pub const VOICE_MATCHING: &str = "voice_matching";
    pub const SMART_REPLY: &str = "smart_reply";
    pub const DAILY_DIGEST: &str = "daily_digest";

    pub const ALL: [&str; 7] = [
        CATEGORIZATION,
        SENTIMENT,
        OPPORTUNITY_SCORING,
        FAQ_DETECTION,
        VOICE_MATCHING,
        SMART_REPLY,
        DAILY_DIGEST,
    ];
}

/// 消息分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    Business,
    Urgent,
    Fan,
    Spam,
    /// Also what categories this build does not know deserialize to.
    #[default]
    #[serde(other)]
    General,
}

impl MessageCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageCategory::Business => "business",
            MessageCategory::Urgent => "urgent",
            MessageCategory::Fan => "fan",
            MessageCategory::Spam => "spam",
            MessageCategory::General => "general",
        }
    }
}

impl FromStr for MessageCategory {
    type Err = ParleyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "business" => Ok(MessageCategory::Business),
            "urgent" => Ok(MessageCategory::Urgent),
            "fan" => Ok(MessageCategory::Fan),
            "spam" => Ok(MessageCategory::Spam),
            "general" => Ok(MessageCategory::General),
            other => Err(ParleyError::validation(format!("unknown message category {}", other))),
        }
    }
}

impl fmt::Display for MessageCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 优先级分档
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityTier {
    High,
    Medium,
    Low,
}

impl PriorityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityTier::High => "high",
            PriorityTier::Medium => "medium",
            PriorityTier::Low => "low",
        }
    }
}

impl fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 分类接口请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizationRequest {
    pub message_id: MessageId,
    pub message_text: String,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
}

impl CategorizationRequest {
    pub fn new(
        message_id: impl Into<String>,
        message_text: impl Into<String>,
        conversation_id: impl Into<String>,
        sender_id: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            message_text: message_text.into(),
            conversation_id: conversation_id.into(),
            sender_id: sender_id.into(),
        }
    }
}

/// 分类接口响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizationResult {
    pub category: MessageCategory,
    /// -1.0 (negative) .. 1.0 (positive)
    #[serde(default)]
    pub sentiment: f64,
    /// 0 .. 100
    #[serde(default)]
    pub opportunity_score: f64,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub model_used: Option<String>,
    #[serde(default)]
    pub tokens_used: Option<u32>,
}

/// 发送者关系上下文
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipContext {
    #[serde(rename = "isVIP")]
    pub is_vip: bool,
    pub message_count: u32,
    pub last_interaction_at: Option<DateTime<Utc>>,
}

/// 消息结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub conversation_id: ConversationId,
    pub sender_id: UserId,
    pub text: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read_by: Vec<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MessageCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<PriorityTier>,
}

impl Message {
    pub fn new(
        conversation_id: ConversationId,
        sender_id: UserId,
        text: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            conversation_id,
            sender_id,
            text,
            created_at,
            read_by: Vec::new(),
            category: None,
            sentiment: None,
            opportunity_score: None,
            priority: None,
        }
    }
}

/// 会话结构
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: ConversationId,
    pub participants: Vec<UserId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message_count: u32,
}
