//! Thread-backed chat: load history, run a turn, persist the exchange

use std::sync::Arc;
use std::time::Duration;

use crate::config::DEFAULT_TURN_TIMEOUT_SECS;
use crate::history::{to_conversation, HistoryStore, StoredMessage, ThreadInfo};
use crate::logging::SharedLogger;
use crate::types::CancellationToken;

use super::error::{ChatError, ChatResult};
use super::orchestrator::ConversationOrchestrator;

pub struct ThreadChat {
    orchestrator: Arc<ConversationOrchestrator>,
    store: Arc<dyn HistoryStore>,
    turn_timeout: Duration,
    logger: SharedLogger,
}

impl ThreadChat {
    pub fn new(orchestrator: Arc<ConversationOrchestrator>, store: Arc<dyn HistoryStore>, logger: SharedLogger) -> Self {
        Self {
            orchestrator,
            store,
            turn_timeout: Duration::from_secs(DEFAULT_TURN_TIMEOUT_SECS),
            logger,
        }
    }

    /// Upper bound for one `send`, on top of whatever deadline the caller set
    pub fn with_turn_timeout(mut self, timeout: Duration) -> Self {
        self.turn_timeout = timeout;
        self
    }

    pub fn store(&self) -> &Arc<dyn HistoryStore> {
        &self.store
    }

    pub async fn create_thread(&self, title: Option<String>) -> ChatResult<ThreadInfo> {
        let thread = self.store.create_thread(title).await?;
        self.logger.info(&format!("[ThreadChat] Created thread {}", thread.id));
        Ok(thread)
    }

    pub async fn list_threads(&self) -> ChatResult<Vec<ThreadInfo>> {
        Ok(self.store.list_threads().await?)
    }

    /// A thread together with its messages, oldest first
    pub async fn thread(&self, thread_id: u64) -> ChatResult<(ThreadInfo, Vec<StoredMessage>)> {
        let thread = self
            .store
            .get_thread(thread_id)
            .await?
            .ok_or(ChatError::ThreadNotFound(thread_id))?;
        let messages = self.store.messages(thread_id).await?;
        Ok((thread, messages))
    }

    /// Send `message` in a thread and return the assistant's reply.
    ///
    /// The user message and the reply are stored together, in that order,
    /// only when the turn succeeds.
    pub async fn send(&self, ctx: &CancellationToken, thread_id: u64, message: &str) -> ChatResult<String> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let (_, stored) = self.thread(thread_id).await?;
        let history = to_conversation(&stored);
        self.logger.debug(&format!(
            "[ThreadChat] Thread {}: running turn on {} stored messages",
            thread_id,
            history.len()
        ));

        let ctx = ctx.child_with_timeout(self.turn_timeout);
        let reply = self.orchestrator.run(&ctx, history, message).await?;

        self.store.append_exchange(thread_id, message, &reply).await?;
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::OrchestratorConfig;
    use crate::gateway::{InProcessEndpoint, ToolGateway};
    use crate::history::{HistoryError, HistoryResult, MemoryHistoryStore};
    use crate::logging::NoOpLogger;
    use async_trait::async_trait;
    use crate::providers::{CompletionResponse, MockModelClient};
    use crate::server::ToolServer;
    use crate::types::{Interrupted, MessageRole};

    fn logger() -> SharedLogger {
        Arc::new(NoOpLogger)
    }

    fn thread_chat(model: Arc<MockModelClient>) -> ThreadChat {
        thread_chat_with(model, Arc::new(MemoryHistoryStore::new()))
    }

    fn thread_chat_with(model: Arc<MockModelClient>, store: Arc<dyn HistoryStore>) -> ThreadChat {
        let server = Arc::new(ToolServer::new("empty", "0.1.0", logger()));
        let gateway = Arc::new(ToolGateway::new(Arc::new(InProcessEndpoint::new(server)), logger()));
        let orchestrator = Arc::new(ConversationOrchestrator::new(
            model,
            gateway,
            OrchestratorConfig::default(),
            logger(),
        ));
        ThreadChat::new(orchestrator, store, logger())
    }

    /// Reads go to memory; every write after thread creation fails
    struct ReadOnlyStore(MemoryHistoryStore);

    #[async_trait]
    impl HistoryStore for ReadOnlyStore {
        async fn create_thread(&self, title: Option<String>) -> HistoryResult<ThreadInfo> {
            self.0.create_thread(title).await
        }

        async fn list_threads(&self) -> HistoryResult<Vec<ThreadInfo>> {
            self.0.list_threads().await
        }

        async fn get_thread(&self, id: u64) -> HistoryResult<Option<ThreadInfo>> {
            self.0.get_thread(id).await
        }

        async fn messages(&self, thread_id: u64) -> HistoryResult<Vec<StoredMessage>> {
            self.0.messages(thread_id).await
        }

        async fn append(&self, _thread_id: u64, _role: &str, _content: &str) -> HistoryResult<StoredMessage> {
            Err(HistoryError::Storage("read-only".to_string()))
        }

        async fn append_exchange(
            &self,
            _thread_id: u64,
            _user: &str,
            _assistant: &str,
        ) -> HistoryResult<(StoredMessage, StoredMessage)> {
            Err(HistoryError::Storage("read-only".to_string()))
        }
    }

    #[tokio::test]
    async fn test_send_persists_pair_and_reuses_history() {
        let model = Arc::new(MockModelClient::scripted(
            vec![CompletionResponse::text("first"), CompletionResponse::text("second")],
            logger(),
        ));
        let chat = thread_chat(model.clone());
        let thread = chat.create_thread(Some("t".to_string())).await.unwrap();
        let ctx = CancellationToken::new();

        assert_eq!(chat.send(&ctx, thread.id, "one").await.unwrap(), "first");
        assert_eq!(chat.send(&ctx, thread.id, "two").await.unwrap(), "second");

        let (_, messages) = chat.thread(thread.id).await.unwrap();
        let stored: Vec<(&str, &str)> = messages.iter().map(|m| (m.role.as_str(), m.content.as_str())).collect();
        assert_eq!(
            stored,
            vec![("user", "one"), ("assistant", "first"), ("user", "two"), ("assistant", "second")]
        );

        let second = &model.requests()[1];
        let roles: Vec<_> = second.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![MessageRole::User, MessageRole::Assistant, MessageRole::User]
        );
    }

    #[tokio::test]
    async fn test_failed_turn_persists_nothing() {
        let chat = thread_chat(Arc::new(MockModelClient::error("down", logger())));
        let thread = chat.create_thread(None).await.unwrap();

        assert!(chat.send(&CancellationToken::new(), thread.id, "hi").await.is_err());
        assert!(chat.thread(thread.id).await.unwrap().1.is_empty());
    }

    #[tokio::test]
    async fn test_storage_failure_leaves_thread_untouched() {
        let store = Arc::new(ReadOnlyStore(MemoryHistoryStore::new()));
        let chat = thread_chat_with(Arc::new(MockModelClient::fixed("ok", logger())), store);
        let thread = chat.create_thread(None).await.unwrap();

        let err = chat.send(&CancellationToken::new(), thread.id, "hi").await.unwrap_err();
        assert!(matches!(err, ChatError::History(HistoryError::Storage(_))));
        assert!(chat.thread(thread.id).await.unwrap().1.is_empty());
    }

    #[tokio::test]
    async fn test_validation() {
        let chat = thread_chat(Arc::new(MockModelClient::echo(logger())));
        let ctx = CancellationToken::new();

        assert!(matches!(chat.send(&ctx, 1, "").await, Err(ChatError::EmptyMessage)));
        assert!(matches!(chat.send(&ctx, 42, "hi").await, Err(ChatError::ThreadNotFound(42))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_turn_timeout() {
        let model = Arc::new(MockModelClient::fixed("late", logger()).with_delay(Duration::from_secs(90)));
        let chat = thread_chat(model).with_turn_timeout(Duration::from_secs(60));
        let thread = chat.create_thread(None).await.unwrap();

        let err = chat.send(&CancellationToken::new(), thread.id, "hi").await.unwrap_err();
        assert!(matches!(err, ChatError::Interrupted(Interrupted::DeadlineExceeded)));
        assert!(chat.thread(thread.id).await.unwrap().1.is_empty());
    }
}
