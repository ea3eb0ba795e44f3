//! In-process tool server
//!
//! The server owns a registry of [`ToolHandler`]s and answers JSON-RPC style
//! requests (`initialize`, `tools/list`, `tools/call`) arriving over a tokio
//! mpsc channel. Each request is handled on its own task so a slow tool does
//! not hold up other turns.

mod handler;
pub mod protocol;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::logging::SharedLogger;
use crate::types::ToolDescriptor;

pub use handler::{FnTool, ToolError, ToolHandler};
use protocol::{
    codes, methods, CallToolParams, CallToolResult, Envelope, InitializeParams, InitializeResult,
    ListToolsResult, RpcRequest, RpcResponse,
};
pub use protocol::PeerInfo;

/// Per-connection state
#[derive(Debug, Default)]
pub struct Session {
    initialized: AtomicBool,
    client: Mutex<Option<PeerInfo>>,
}

impl Session {
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// Identity the client announced in `initialize`
    pub fn client(&self) -> Option<PeerInfo> {
        self.client.lock().clone()
    }
}

pub struct ToolServer {
    info: PeerInfo,
    handlers: RwLock<Vec<Arc<dyn ToolHandler>>>,
    logger: SharedLogger,
}

impl ToolServer {
    pub fn new(name: impl Into<String>, version: impl Into<String>, logger: SharedLogger) -> Self {
        Self {
            info: PeerInfo::new(name, version),
            handlers: RwLock::new(Vec::new()),
            logger,
        }
    }

    /// Builder form of [`ToolServer::register`]
    pub fn with_tool(self, handler: impl ToolHandler + 'static) -> Self {
        self.register(Arc::new(handler));
        self
    }

    /// Add a tool; an existing tool with the same name is replaced in place
    pub fn register(&self, handler: Arc<dyn ToolHandler>) {
        let name = handler.descriptor().name;
        let mut handlers = self.handlers.write();
        match handlers.iter().position(|h| h.descriptor().name == name) {
            Some(pos) => {
                self.logger.warn(&format!("[ToolServer] Replacing tool: {}", name));
                handlers[pos] = handler;
            }
            None => {
                self.logger.debug(&format!("[ToolServer] Registered tool: {}", name));
                handlers.push(handler);
            }
        }
    }

    pub fn info(&self) -> &PeerInfo {
        &self.info
    }

    /// Descriptors of all registered tools, in registration order
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        self.handlers.read().iter().map(|h| h.descriptor()).collect()
    }

    pub fn tool_count(&self) -> usize {
        self.handlers.read().len()
    }

    fn find(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers
            .read()
            .iter()
            .find(|h| h.descriptor().name == name)
            .cloned()
    }

    /// Serve one connection until every sender is dropped
    pub fn serve(self: Arc<Self>, mut requests: mpsc::Receiver<Envelope>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let session = Arc::new(Session::default());
            self.logger.debug("[ToolServer] Connection opened");

            while let Some(Envelope { request, reply }) = requests.recv().await {
                let server = Arc::clone(&self);
                let session = Arc::clone(&session);
                tokio::spawn(async move {
                    let response = server.handle(&session, request).await;
                    // The caller may have given up waiting
                    let _ = reply.send(response);
                });
            }

            self.logger.debug("[ToolServer] Connection closed");
        })
    }

    /// Answer a single request within `session`
    pub async fn handle(&self, session: &Session, request: RpcRequest) -> RpcResponse {
        let id = request.id;
        match request.method.as_str() {
            methods::INITIALIZE => self.initialize(session, id, request.params),
            methods::LIST_TOOLS | methods::CALL_TOOL if !session.is_initialized() => {
                RpcResponse::failure(id, codes::NOT_INITIALIZED, "server not initialized")
            }
            methods::LIST_TOOLS => reply(
                id,
                &ListToolsResult {
                    tools: self.descriptors(),
                },
            ),
            methods::CALL_TOOL => self.call_tool(id, request.params).await,
            other => {
                self.logger.warn(&format!("[ToolServer] Unknown method: {}", other));
                RpcResponse::failure(id, codes::METHOD_NOT_FOUND, format!("method not found: {}", other))
            }
        }
    }

    fn initialize(&self, session: &Session, id: u64, params: Value) -> RpcResponse {
        let params: InitializeParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return RpcResponse::failure(id, codes::INVALID_PARAMS, e.to_string()),
        };

        self.logger.info(&format!(
            "[ToolServer] Client initialized: {} (protocol {})",
            params.client_info, params.protocol_version
        ));
        *session.client.lock() = Some(params.client_info);
        session.initialized.store(true, Ordering::SeqCst);

        reply(
            id,
            &InitializeResult {
                protocol_version: protocol::PROTOCOL_VERSION.to_string(),
                server_info: self.info.clone(),
            },
        )
    }

    async fn call_tool(&self, id: u64, params: Value) -> RpcResponse {
        let params: CallToolParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return RpcResponse::failure(id, codes::INVALID_PARAMS, e.to_string()),
        };

        let Some(handler) = self.find(&params.name) else {
            return RpcResponse::failure(id, codes::INVALID_PARAMS, format!("unknown tool: {}", params.name));
        };

        self.logger.debug(&format!("[ToolServer] Calling tool: {}", params.name));
        let result = match handler.call(params.arguments).await {
            Ok(result) => result,
            Err(e) => {
                self.logger.warn(&format!("[ToolServer] Tool {} failed: {}", params.name, e));
                crate::types::ToolCallResult::error(e.to_string())
            }
        };

        reply(id, &CallToolResult::from(result))
    }
}

fn reply<T: Serialize>(id: u64, result: &T) -> RpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => RpcResponse::success(id, value),
        Err(e) => RpcResponse::failure(id, codes::INTERNAL_ERROR, e.to_string()),
    }
}

impl std::fmt::Debug for ToolServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolServer")
            .field("info", &self.info)
            .field("tools", &self.tool_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::types::ToolCallResult;
    use serde_json::json;
    use tokio::sync::oneshot;

    fn echo_server() -> ToolServer {
        ToolServer::new("test-server", "0.1.0", Arc::new(NoOpLogger))
            .with_tool(FnTool::new("echo", "Echo the message argument", |args| {
                let message = args.get("message").and_then(|v| v.as_str()).unwrap_or_default();
                Ok(ToolCallResult::text(message))
            }))
            .with_tool(FnTool::new("fail", "Always fails", |_| {
                Err(ToolError::Failed("boom".to_string()))
            }))
    }

    fn init_request(id: u64) -> RpcRequest {
        RpcRequest::new(
            id,
            methods::INITIALIZE,
            json!({"protocolVersion": protocol::PROTOCOL_VERSION, "clientInfo": {"name": "LLMChat", "version": "1.0.0"}}),
        )
    }

    #[tokio::test]
    async fn test_rejects_calls_before_initialize() {
        let server = echo_server();
        let session = Session::default();

        let list = server.handle(&session, RpcRequest::new(1, methods::LIST_TOOLS, Value::Null)).await;
        assert_eq!(list.into_result().unwrap_err().code, codes::NOT_INITIALIZED);

        let call = server
            .handle(&session, RpcRequest::new(2, methods::CALL_TOOL, json!({"name": "echo"})))
            .await;
        assert_eq!(call.into_result().unwrap_err().code, codes::NOT_INITIALIZED);
    }

    #[tokio::test]
    async fn test_initialize_then_list() {
        let server = echo_server();
        let session = Session::default();

        let init = server.handle(&session, init_request(1)).await.into_result().unwrap();
        assert_eq!(init["serverInfo"]["name"], "test-server");
        assert_eq!(session.client(), Some(PeerInfo::new("LLMChat", "1.0.0")));

        let list = server
            .handle(&session, RpcRequest::new(2, methods::LIST_TOOLS, Value::Null))
            .await
            .into_result()
            .unwrap();
        let names: Vec<_> = list["tools"].as_array().unwrap().iter().map(|t| t["name"].clone()).collect();
        assert_eq!(names, vec![json!("echo"), json!("fail")]);
    }

    #[tokio::test]
    async fn test_call_outcomes() {
        let server = echo_server();
        let session = Session::default();
        server.handle(&session, init_request(1)).await;

        let ok = server
            .handle(&session, RpcRequest::new(2, methods::CALL_TOOL, json!({"name": "echo", "arguments": {"message": "hi"}})))
            .await
            .into_result()
            .unwrap();
        assert_eq!(ok, json!({"content": [{"type": "text", "text": "hi"}], "isError": false}));

        let failed = server
            .handle(&session, RpcRequest::new(3, methods::CALL_TOOL, json!({"name": "fail"})))
            .await
            .into_result()
            .unwrap();
        assert_eq!(failed["isError"], json!(true));
        assert_eq!(failed["content"][0]["text"], json!("boom"));

        let unknown = server
            .handle(&session, RpcRequest::new(4, methods::CALL_TOOL, json!({"name": "nope"})))
            .await;
        assert_eq!(unknown.into_result().unwrap_err().code, codes::INVALID_PARAMS);

        let method = server.handle(&session, RpcRequest::new(5, "resources/list", Value::Null)).await;
        assert_eq!(method.into_result().unwrap_err().code, codes::METHOD_NOT_FOUND);
    }

    #[test]
    fn test_register_replaces_duplicate() {
        let server = echo_server();
        server.register(Arc::new(FnTool::new("echo", "Second echo", |_| Ok(ToolCallResult::text("2")))));

        let tools = server.descriptors();
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "echo");
        assert_eq!(tools[0].description, "Second echo");
    }

    #[tokio::test]
    async fn test_serve_over_channel() {
        let server = Arc::new(echo_server());
        let (tx, rx) = mpsc::channel(8);
        let task = Arc::clone(&server).serve(rx);

        let (reply, response) = oneshot::channel();
        tx.send(Envelope { request: init_request(7), reply }).await.unwrap();
        let response = response.await.unwrap();
        assert_eq!(response.id, 7);
        assert!(response.error.is_none());

        drop(tx);
        task.await.unwrap();
    }
}
