//! Model client trait and request/response types

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{ChatMessage, FunctionSchema, ToolCallRequest};
use super::error::ProviderResult;

/// One completion request: model id, conversation so far, callable functions
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub tools: Vec<FunctionSchema>,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
        }
    }

    pub fn with_tools(mut self, tools: Vec<FunctionSchema>) -> Self {
        self.tools = tools;
        self
    }
}

/// Candidate replies; only the first one is ever used
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionResponse {
    pub candidates: Vec<ChatMessage>,
}

impl CompletionResponse {
    /// A response with no candidates
    pub fn empty() -> Self {
        Self::default()
    }

    /// A single plain-text assistant candidate
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            candidates: vec![ChatMessage::assistant(content)],
        }
    }

    /// A single assistant candidate requesting tools
    pub fn tool_calls(content: impl Into<String>, calls: Vec<ToolCallRequest>) -> Self {
        Self {
            candidates: vec![ChatMessage::assistant_with_calls(content, calls)],
        }
    }

    pub fn first(&self) -> Option<&ChatMessage> {
        self.candidates.first()
    }
}

/// Stateless request/response interface to a language model
///
/// Implementations:
/// - `GenaiModelClient`: any provider the `genai` crate speaks
/// - `MockModelClient`: scripted responses for tests and offline use
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Provider name (e.g., "openai", "mock")
    fn name(&self) -> &str;

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<CompletionResponse>;
}

/// Type alias for an Arc-wrapped model client
pub type SharedModelClient = Arc<dyn ModelClient>;
