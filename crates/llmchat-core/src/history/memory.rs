//! In-memory history store

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use super::store::{HistoryError, HistoryResult, HistoryStore, StoredMessage, ThreadInfo};

#[derive(Debug, Default)]
struct Inner {
    threads: BTreeMap<u64, ThreadInfo>,
    messages: HashMap<u64, Vec<StoredMessage>>,
    last_thread_id: u64,
    last_message_id: u64,
}

/// Thread store held entirely in memory; ids start at 1
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    inner: RwLock<Inner>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn thread_count(&self) -> usize {
        self.inner.read().threads.len()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn create_thread(&self, title: Option<String>) -> HistoryResult<ThreadInfo> {
        let mut inner = self.inner.write();
        inner.last_thread_id += 1;

        let now = Utc::now();
        let thread = ThreadInfo {
            id: inner.last_thread_id,
            title: title.filter(|t| !t.trim().is_empty()),
            created_at: now,
            updated_at: now,
        };
        inner.threads.insert(thread.id, thread.clone());
        inner.messages.insert(thread.id, Vec::new());
        Ok(thread)
    }

    async fn list_threads(&self) -> HistoryResult<Vec<ThreadInfo>> {
        let mut threads: Vec<ThreadInfo> = self.inner.read().threads.values().cloned().collect();
        threads.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(threads)
    }

    async fn get_thread(&self, id: u64) -> HistoryResult<Option<ThreadInfo>> {
        Ok(self.inner.read().threads.get(&id).cloned())
    }

    async fn messages(&self, thread_id: u64) -> HistoryResult<Vec<StoredMessage>> {
        self.inner
            .read()
            .messages
            .get(&thread_id)
            .cloned()
            .ok_or(HistoryError::ThreadNotFound(thread_id))
    }

    async fn append(&self, thread_id: u64, role: &str, content: &str) -> HistoryResult<StoredMessage> {
        let mut inner = self.inner.write();
        inner.ensure_thread(thread_id)?;
        Ok(inner.push(thread_id, role, content))
    }

    async fn append_exchange(
        &self,
        thread_id: u64,
        user: &str,
        assistant: &str,
    ) -> HistoryResult<(StoredMessage, StoredMessage)> {
        let mut inner = self.inner.write();
        inner.ensure_thread(thread_id)?;
        let question = inner.push(thread_id, "user", user);
        let reply = inner.push(thread_id, "assistant", assistant);
        Ok((question, reply))
    }
}

impl Inner {
    fn ensure_thread(&self, thread_id: u64) -> HistoryResult<()> {
        if self.threads.contains_key(&thread_id) {
            Ok(())
        } else {
            Err(HistoryError::ThreadNotFound(thread_id))
        }
    }

    /// Caller has checked that the thread exists
    fn push(&mut self, thread_id: u64, role: &str, content: &str) -> StoredMessage {
        self.last_message_id += 1;
        let message = StoredMessage {
            id: self.last_message_id,
            thread_id,
            role: role.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
        };
        if let Some(thread) = self.threads.get_mut(&thread_id) {
            thread.updated_at = message.created_at;
        }
        self.messages.entry(thread_id).or_default().push(message.clone());
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_thread_lifecycle() {
        let store = MemoryHistoryStore::new();
        let thread = store.create_thread(Some("Weather".to_string())).await.unwrap();
        assert_eq!(thread.id, 1);

        store.append(thread.id, "user", "hi").await.unwrap();
        store.append(thread.id, "assistant", "hello").await.unwrap();

        let messages = store.messages(thread.id).await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[1].content, "hello");
        assert!(messages[0].id < messages[1].id);

        let stored = store.get_thread(thread.id).await.unwrap().unwrap();
        assert!(stored.updated_at >= stored.created_at);
        assert_eq!(stored.title.as_deref(), Some("Weather"));
    }

    #[tokio::test]
    async fn test_unknown_thread() {
        let store = MemoryHistoryStore::new();
        assert_eq!(store.get_thread(0).await.unwrap(), None);
        assert_eq!(store.messages(9).await.unwrap_err(), HistoryError::ThreadNotFound(9));
        assert_eq!(store.append(9, "user", "x").await.unwrap_err(), HistoryError::ThreadNotFound(9));
    }

    #[tokio::test]
    async fn test_append_exchange() {
        let store = MemoryHistoryStore::new();
        let thread = store.create_thread(None).await.unwrap();

        let (question, reply) = store.append_exchange(thread.id, "2+2?", "4").await.unwrap();
        assert_eq!((question.role.as_str(), reply.role.as_str()), ("user", "assistant"));
        assert_eq!(reply.id, question.id + 1);
        assert_eq!(store.messages(thread.id).await.unwrap(), vec![question, reply]);

        assert_eq!(
            store.append_exchange(9, "q", "a").await.unwrap_err(),
            HistoryError::ThreadNotFound(9)
        );
        assert!(store.messages(9).await.is_err());
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let store = MemoryHistoryStore::new();
        let first = store.create_thread(None).await.unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let second = store.create_thread(Some("  ".to_string())).await.unwrap();
        assert!(second.title.is_none());

        std::thread::sleep(std::time::Duration::from_millis(5));
        store.append(first.id, "user", "bump").await.unwrap();

        let ids: Vec<u64> = store.list_threads().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(store.thread_count(), 2);
    }
}
