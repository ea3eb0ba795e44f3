//! History store trait and persisted types

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ChatMessage, MessageRole};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum HistoryError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(u64),

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type HistoryResult<T> = Result<T, HistoryError>;

/// A persisted message; `role` is a free-text label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredMessage {
    pub id: u64,
    pub thread_id: u64,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadInfo {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Persistence boundary for conversation threads
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn create_thread(&self, title: Option<String>) -> HistoryResult<ThreadInfo>;

    /// All threads, most recently updated first
    async fn list_threads(&self) -> HistoryResult<Vec<ThreadInfo>>;

    async fn get_thread(&self, id: u64) -> HistoryResult<Option<ThreadInfo>>;

    /// Messages of a thread, oldest first
    async fn messages(&self, thread_id: u64) -> HistoryResult<Vec<StoredMessage>>;

    /// Append a message and touch the thread's `updated_at`
    async fn append(&self, thread_id: u64, role: &str, content: &str) -> HistoryResult<StoredMessage>;

    /// Append a user message and the assistant reply as one unit: either
    /// both are stored, in that order, or neither is
    async fn append_exchange(
        &self,
        thread_id: u64,
        user: &str,
        assistant: &str,
    ) -> HistoryResult<(StoredMessage, StoredMessage)>;
}

/// Rebuild the conversation the model sees from stored messages
pub fn to_conversation(messages: &[StoredMessage]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|m| match MessageRole::from_label(&m.role) {
            MessageRole::Assistant => ChatMessage::assistant(m.content.as_str()),
            MessageRole::System => ChatMessage::system(m.content.as_str()),
            _ => ChatMessage::user(m.content.as_str()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: u64, role: &str, content: &str) -> StoredMessage {
        StoredMessage {
            id,
            thread_id: 1,
            role: role.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_to_conversation_role_mapping() {
        let conversation = to_conversation(&[
            stored(1, "system", "be brief"),
            stored(2, "user", "hi"),
            stored(3, "assistant", "hello"),
            stored(4, "tool", "42"),
            stored(5, "moderator", "??"),
        ]);

        let roles: Vec<_> = conversation.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::System,
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::User,
            ]
        );
        assert_eq!(conversation[3].content, "42");
        assert!(conversation[3].tool_call_id.is_none());
    }
}
