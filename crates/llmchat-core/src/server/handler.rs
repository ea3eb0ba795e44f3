//! Tool handler trait and a closure-backed implementation

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{ToolArguments, ToolCallResult, ToolDescriptor};

/// Failure raised by a tool's own logic
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("{0}")]
    Failed(String),
}

/// A tool served by [`ToolServer`](super::ToolServer)
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// What the server advertises for this tool; `name` is the dispatch key
    fn descriptor(&self) -> ToolDescriptor;

    async fn call(&self, arguments: ToolArguments) -> Result<ToolCallResult, ToolError>;
}

/// Adapter turning a synchronous closure into a [`ToolHandler`]
///
/// ```
/// use llmchat_core::server::FnTool;
/// use llmchat_core::types::ToolCallResult;
///
/// let upper = FnTool::new("upper", "Uppercase the `text` argument", |args| {
///     let text = args.get("text").and_then(|v| v.as_str()).unwrap_or_default();
///     Ok(ToolCallResult::text(text.to_uppercase()))
/// });
/// ```
pub struct FnTool<F> {
    descriptor: ToolDescriptor,
    f: F,
}

impl<F> FnTool<F>
where
    F: Fn(ToolArguments) -> Result<ToolCallResult, ToolError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, description: impl Into<String>, f: F) -> Self {
        Self {
            descriptor: ToolDescriptor::new(name, description),
            f,
        }
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.descriptor = self.descriptor.with_schema(schema);
        self
    }
}

#[async_trait]
impl<F> ToolHandler for FnTool<F>
where
    F: Fn(ToolArguments) -> Result<ToolCallResult, ToolError> + Send + Sync,
{
    fn descriptor(&self) -> ToolDescriptor {
        self.descriptor.clone()
    }

    async fn call(&self, arguments: ToolArguments) -> Result<ToolCallResult, ToolError> {
        (self.f)(arguments)
    }
}
