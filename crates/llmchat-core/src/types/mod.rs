//! Core types for conversations and tool calling
//!
//! This module contains the shared types used by the gateway, the providers
//! and the orchestrator.

mod message;
mod tool;
mod cancellation;

pub use message::{ChatMessage, MessageRole};
pub use tool::{FunctionSchema, ToolArguments, ToolCallRequest, ToolCallResult, ToolDescriptor};
pub use cancellation::{CancellationToken, Interrupted};
