//! Demo tools served in-process by the CLI

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use llmchat_core::{SharedLogger, ToolArguments, ToolCallResult, ToolDescriptor, ToolError, ToolHandler, ToolServer};

/// Greets back with whatever `message` it was given
pub struct HelloTool;

#[async_trait]
impl ToolHandler for HelloTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new("hello", "Says hello back with the message you send").with_schema(json!({
            "type": "object",
            "properties": {
                "message": { "type": "string", "description": "Message to include in the greeting" }
            }
        }))
    }

    async fn call(&self, arguments: ToolArguments) -> Result<ToolCallResult, ToolError> {
        let message = arguments
            .get("message")
            .and_then(|v| v.as_str())
            .filter(|m| !m.is_empty())
            .unwrap_or("(no message)");
        Ok(ToolCallResult::text(format!("Hello MCP! You sent: {}", message)))
    }
}

pub fn demo_server(logger: SharedLogger) -> Arc<ToolServer> {
    Arc::new(ToolServer::new("llmchat-tools", env!("CARGO_PKG_VERSION"), logger).with_tool(HelloTool))
}
