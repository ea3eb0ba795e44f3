//! Channel to a [`ToolServer`] running on the same runtime

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};

use super::channel::{ToolChannel, ToolEndpoint};
use super::error::{GatewayError, GatewayResult};
use crate::server::protocol::{
    codes, methods, CallToolParams, CallToolResult, Envelope, InitializeParams, InitializeResult,
    ListToolsResult, RpcRequest, PROTOCOL_VERSION,
};
use crate::server::{PeerInfo, ToolServer};
use crate::types::{ToolArguments, ToolCallResult, ToolDescriptor};

const DEFAULT_CAPACITY: usize = 32;

/// Endpoint that spawns the server loop for each opened channel
pub struct InProcessEndpoint {
    server: Arc<ToolServer>,
    capacity: usize,
}

impl InProcessEndpoint {
    pub fn new(server: Arc<ToolServer>) -> Self {
        Self {
            server,
            capacity: DEFAULT_CAPACITY,
        }
    }

    /// Bound on requests queued ahead of the server loop
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity.max(1);
        self
    }

    pub fn server(&self) -> &Arc<ToolServer> {
        &self.server
    }
}

#[async_trait]
impl ToolEndpoint for InProcessEndpoint {
    fn describe(&self) -> String {
        format!("in-process:{}", self.server.info().name)
    }

    async fn open(&self) -> GatewayResult<Arc<dyn ToolChannel>> {
        let (sender, requests) = mpsc::channel(self.capacity);
        // The loop ends once the channel (and with it the sender) is dropped
        Arc::clone(&self.server).serve(requests);
        Ok(Arc::new(InProcessChannel::new(sender)))
    }
}

pub struct InProcessChannel {
    sender: mpsc::Sender<Envelope>,
    next_id: AtomicU64,
}

impl InProcessChannel {
    pub fn new(sender: mpsc::Sender<Envelope>) -> Self {
        Self {
            sender,
            next_id: AtomicU64::new(1),
        }
    }

    async fn request<P: Serialize, R: DeserializeOwned>(&self, method: &str, params: P) -> GatewayResult<R> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let params = serde_json::to_value(params).map_err(|e| GatewayError::Rpc {
            code: codes::INTERNAL_ERROR,
            message: e.to_string(),
        })?;

        let (reply, response) = oneshot::channel();
        self.sender
            .send(Envelope {
                request: RpcRequest::new(id, method, params),
                reply,
            })
            .await
            .map_err(|_| GatewayError::ChannelClosed)?;

        let value = response
            .await
            .map_err(|_| GatewayError::ChannelClosed)?
            .into_result()
            .map_err(|e| GatewayError::Rpc {
                code: e.code,
                message: e.message,
            })?;

        serde_json::from_value(value).map_err(|e| GatewayError::Rpc {
            code: codes::INTERNAL_ERROR,
            message: format!("invalid {} response: {}", method, e),
        })
    }
}

#[async_trait]
impl ToolChannel for InProcessChannel {
    async fn initialize(&self, client: &PeerInfo) -> GatewayResult<PeerInfo> {
        let params = InitializeParams {
            protocol_version: PROTOCOL_VERSION.to_string(),
            client_info: client.clone(),
        };
        let result: InitializeResult = self.request(methods::INITIALIZE, params).await?;
        Ok(result.server_info)
    }

    async fn list_tools(&self) -> GatewayResult<Vec<ToolDescriptor>> {
        let result: ListToolsResult = self.request(methods::LIST_TOOLS, serde_json::json!({})).await?;
        Ok(result.tools)
    }

    async fn call_tool(&self, name: &str, arguments: ToolArguments) -> GatewayResult<ToolCallResult> {
        let params = CallToolParams {
            name: name.to_string(),
            arguments,
        };
        let result: CallToolResult = self.request(methods::CALL_TOOL, params).await?;
        Ok(result.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::server::FnTool;

    fn endpoint() -> InProcessEndpoint {
        let server = ToolServer::new("in-proc", "1.0.0", Arc::new(NoOpLogger))
            .with_tool(FnTool::new("ping", "Reply with pong", |_| Ok(ToolCallResult::text("pong"))));
        InProcessEndpoint::new(Arc::new(server))
    }

    #[tokio::test]
    async fn test_round_trip_over_channel() {
        let channel = endpoint().open().await.unwrap();

        let server = channel.initialize(&PeerInfo::new("LLMChat", "1.0.0")).await.unwrap();
        assert_eq!(server, PeerInfo::new("in-proc", "1.0.0"));

        let tools = channel.list_tools().await.unwrap();
        assert_eq!(tools.len(), 1);

        let result = channel.call_tool("ping", ToolArguments::new()).await.unwrap();
        assert_eq!(result, ToolCallResult::text("pong"));
    }

    #[tokio::test]
    async fn test_protocol_errors_are_rpc_errors() {
        let channel = endpoint().open().await.unwrap();

        let err = channel.list_tools().await.unwrap_err();
        assert!(matches!(err, GatewayError::Rpc { code: codes::NOT_INITIALIZED, .. }));
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_channel_closed() {
        let (sender, requests) = mpsc::channel(1);
        drop(requests);

        let channel = InProcessChannel::new(sender);
        let err = channel.call_tool("ping", ToolArguments::new()).await.unwrap_err();
        assert_eq!(err, GatewayError::ChannelClosed);
    }
}
