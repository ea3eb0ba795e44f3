//! Mock model client for testing
//!
//! Provides deterministic, configurable responses without network access.
//! Every request is recorded so tests can inspect what the model was sent.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::error::{ProviderError, ProviderResult};
use super::traits::{CompletionRequest, CompletionResponse, ModelClient};
use crate::logging::Logger;
use crate::types::{MessageRole, ToolCallRequest};

/// Mock response mode
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Echo back the last user message
    #[default]
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Return these responses in order, then fail
    Script(Vec<CompletionResponse>),
    /// Fail every call
    Error(String),
    /// Return no candidates
    Empty,
    /// Request the same tool on every call
    AlwaysCall { tool: String, arguments: String },
}

/// Mock model client for testing
pub struct MockModelClient {
    mode: MockMode,
    script: Mutex<VecDeque<CompletionResponse>>,
    requests: Mutex<Vec<CompletionRequest>>,
    delay: Duration,
    logger: Arc<dyn Logger>,
}

impl MockModelClient {
    pub fn new(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        let script = match &mode {
            MockMode::Script(responses) => responses.iter().cloned().collect(),
            _ => VecDeque::new(),
        };
        Self {
            mode,
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
            logger,
        }
    }

    /// Create an echo client (echoes back the last user message)
    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Echo, logger)
    }

    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Fixed(response.into()), logger)
    }

    pub fn scripted(responses: Vec<CompletionResponse>, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Script(responses), logger)
    }

    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Error(message.into()), logger)
    }

    /// Wait this long before answering each call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of completion calls made so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Copies of every request received, oldest first
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().clone()
    }

    fn last_user_message(request: &CompletionRequest) -> String {
        request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::User && !m.content.is_empty())
            .map(|m| m.content.clone())
            .unwrap_or_else(|| "Hello from MockModelClient!".to_string())
    }
}

#[async_trait]
impl ModelClient for MockModelClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<CompletionResponse> {
        let call_index = {
            let mut requests = self.requests.lock();
            requests.push(request.clone());
            requests.len()
        };
        self.logger.debug(&format!("[MockModelClient] complete called (#{})", call_index));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.mode {
            MockMode::Echo => Ok(CompletionResponse::text(format!(
                "Echo: {}",
                Self::last_user_message(&request)
            ))),
            MockMode::Fixed(response) => Ok(CompletionResponse::text(response.clone())),
            MockMode::Script(_) => self
                .script
                .lock()
                .pop_front()
                .ok_or_else(|| ProviderError::Other(format!("Mock script exhausted at call {}", call_index))),
            MockMode::Error(message) => Err(ProviderError::api_error("mock", message.clone())),
            MockMode::Empty => Ok(CompletionResponse::empty()),
            MockMode::AlwaysCall { tool, arguments } => Ok(CompletionResponse::tool_calls(
                "",
                vec![ToolCallRequest::new(format!("call_{}", call_index), tool.clone(), arguments.clone())],
            )),
        }
    }
}
