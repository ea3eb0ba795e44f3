//! LLMChat Core
//!
//! Tool-augmented conversation orchestration. A language model answers a
//! user message, optionally calling tools exposed by an in-process tool
//! server (or a remote MCP server), until it produces a final text reply.
//!
//! ## Conversation loop
//!
//! ```text
//! caller ─▶ ConversationOrchestrator::run(history, message)
//!              │  ToolGateway::ensure_ready / list_tools (once per turn)
//!              │  to_function_schemas
//!              ▼
//!           loop { ModelClient::complete ─▶ ToolGateway::invoke* }
//!              │
//!              ▼
//!           final reply ─▶ caller persists via HistoryStore
//! ```
//!
//! ```rust,ignore
//! use llmchat_core::{ConversationOrchestrator, CancellationToken};
//!
//! let orchestrator = ConversationOrchestrator::from_settings(&settings, model, endpoint, logger);
//! let reply = orchestrator.chat(&CancellationToken::new(), "What's 2+2?").await?;
//! ```

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod server;
pub mod gateway;
pub mod tools;
pub mod providers;
pub mod history;
pub mod chat;

// Re-export commonly used types
pub use types::{
    ChatMessage, MessageRole,
    FunctionSchema, ToolArguments, ToolCallRequest, ToolCallResult, ToolDescriptor,
    CancellationToken, Interrupted,
};

pub use secrets::{
    SecretStore, SecretStoreError, SecretStoreResult,
    EnvSecretStore, MemorySecretStore, ChainSecretStore,
};

pub use logging::{Logger, SharedLogger, NoOpLogger, TracingLogger};

pub use config::{ChatSettings, ConfigProvider, ConfigError, FileConfigProvider, MemoryConfigProvider};

pub use server::{FnTool, PeerInfo, ToolError, ToolHandler, ToolServer};

pub use gateway::{
    GatewayError, GatewayResult, InProcessEndpoint, McpEndpoint, ToolChannel, ToolEndpoint, ToolGateway,
};

pub use tools::{to_function_schemas, ParameterSchemaMode};

pub use providers::{
    create_model_client, CompletionRequest, CompletionResponse, GenaiModelClient, MockMode, MockModelClient,
    ModelClient, ProviderError, SharedModelClient,
};

pub use history::{HistoryError, HistoryStore, MemoryHistoryStore, StoredMessage, ThreadInfo};

pub use chat::{ChatError, ChatResult, ConversationOrchestrator, OrchestratorConfig, ThreadChat, Turn};
