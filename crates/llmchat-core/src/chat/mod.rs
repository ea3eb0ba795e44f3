//! Conversation orchestration
//!
//! [`ConversationOrchestrator`] runs a single turn: it discovers tools through
//! the gateway, calls the model, dispatches every requested tool call and
//! feeds the results back until the model answers in plain text.
//! [`ThreadChat`] layers stored threads on top of it.

mod error;
mod orchestrator;
mod thread;

pub use error::{ChatError, ChatResult};
pub use orchestrator::{ConversationOrchestrator, OrchestratorConfig, Turn};
pub use thread::ThreadChat;
