//! # Messaging
//!
//! Conversations at `conversations/{id}`, messages at
//! `conversations/{id}/messages/{messageId}`.

use serde_json::{json, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::clock::ClockRef;
use crate::error::{ParleyError, Result};
use crate::store::{get_typed, paths, set_typed};
use crate::traits::DocumentStoreRef;
use crate::types::{
    CategorizationResult, Conversation, Message, PriorityTier, MAX_MESSAGE_LENGTH,
};

pub fn validate_message_text(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(ParleyError::validation("message text must not be empty"));
    }
    let len = text.chars().count();
    if len > MAX_MESSAGE_LENGTH {
        return Err(ParleyError::validation(format!(
            "message text is {} characters, limit is {}",
            len, MAX_MESSAGE_LENGTH
        )));
    }
    Ok(())
}

fn require_id(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ParleyError::validation(format!("{} is required", name)));
    }
    Ok(())
}

/// 会话与消息读写
pub struct MessagingService {
    store: DocumentStoreRef,
    clock: ClockRef,
}

impl MessagingService {
    pub fn new(store: DocumentStoreRef, clock: ClockRef) -> Self {
        Self { store, clock }
    }

    pub async fn create_conversation(&self, participants: Vec<String>) -> Result<Conversation> {
        self.insert_conversation(Uuid::new_v4().to_string(), participants)
            .await
    }

    /// 按 id 取会话，不存在时以 `participants` 创建
    pub async fn ensure_conversation(
        &self,
        conversation_id: &str,
        participants: Vec<String>,
    ) -> Result<Conversation> {
        require_id("conversationId", conversation_id)?;
        if let Some(existing) = self.get_conversation(conversation_id).await? {
            return Ok(existing);
        }
        self.insert_conversation(conversation_id.to_string(), participants)
            .await
    }

    async fn insert_conversation(&self, id: String, participants: Vec<String>) -> Result<Conversation> {
        if participants.len() < 2 {
            return Err(ParleyError::validation("a conversation needs at least two participants"));
        }
        for p in &participants {
            require_id("participant", p)?;
        }
        let conversation = Conversation {
            id,
            participants,
            created_at: self.clock.now(),
            last_message_at: None,
            message_count: 0,
        };
        set_typed(self.store.as_ref(), &paths::conversation(&conversation.id), &conversation).await?;
        debug!("conversation {} created", conversation.id);
        Ok(conversation)
    }

    pub async fn get_conversation(&self, conversation_id: &str) -> Result<Option<Conversation>> {
        get_typed(self.store.as_ref(), &paths::conversation(conversation_id)).await
    }

    pub async fn send_message(
        &self,
        conversation_id: &str,
        sender_id: &str,
        text: &str,
    ) -> Result<Message> {
        require_id("conversationId", conversation_id)?;
        require_id("senderId", sender_id)?;
        validate_message_text(text)?;

        let conversation = paths::conversation(conversation_id);
        if self.store.get(&conversation).await?.is_none() {
            return Err(ParleyError::not_found(format!("conversation {}", conversation_id)));
        }

        let now = self.clock.now();
        let message = Message::new(
            conversation_id.to_string(),
            sender_id.to_string(),
            text.to_string(),
            now,
        );
        set_typed(
            self.store.as_ref(),
            &paths::message(conversation_id, &message.id),
            &message,
        )
        .await?;

        self.store
            .merge(&conversation, json!({ "lastMessageAt": now }))
            .await?;
        self.store.increment(&conversation, "messageCount", 1).await?;

        debug!("message {} sent in {}", message.id, conversation_id);
        Ok(message)
    }

    pub async fn get_message(&self, conversation_id: &str, message_id: &str) -> Result<Option<Message>> {
        get_typed(self.store.as_ref(), &paths::message(conversation_id, message_id)).await
    }

    /// Newest first, at most `limit`.
    pub async fn list_messages(&self, conversation_id: &str, limit: usize) -> Result<Vec<Message>> {
        let docs = self
            .store
            .list(&paths::messages_collection(conversation_id))
            .await?;
        let mut messages: Vec<Message> = docs
            .into_iter()
            .filter_map(|(id, doc)| match serde_json::from_value::<Message>(doc) {
                Ok(message) => Some(message),
                Err(e) => {
                    warn!("skipping malformed message {}: {}", id, e);
                    None
                }
            })
            .collect();
        messages.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        messages.truncate(limit);
        Ok(messages)
    }

    pub async fn mark_read(&self, conversation_id: &str, message_id: &str, user_id: &str) -> Result<()> {
        require_id("userId", user_id)?;
        let path = self.existing_message(conversation_id, message_id).await?;
        self.store
            .array_union(&path, "readBy", vec![Value::String(user_id.to_string())])
            .await
    }

    /// Store AI fields on the message document.
    pub async fn apply_categorization(
        &self,
        conversation_id: &str,
        message_id: &str,
        result: &CategorizationResult,
        priority: PriorityTier,
    ) -> Result<()> {
        let path = self.existing_message(conversation_id, message_id).await?;
        self.store
            .merge(
                &path,
                json!({
                    "category": result.category,
                    "sentiment": result.sentiment,
                    "opportunityScore": result.opportunity_score,
                    "priority": priority,
                }),
            )
            .await
    }

    async fn existing_message(&self, conversation_id: &str, message_id: &str) -> Result<String> {
        let path = paths::message(conversation_id, message_id);
        if self.store.get(&path).await?.is_none() {
            return Err(ParleyError::not_found(format!("message {}", path)));
        }
        Ok(path)
    }
}
