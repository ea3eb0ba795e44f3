//! Remote tool endpoint speaking MCP over Streamable HTTP (rmcp)

use std::sync::Arc;

use async_trait::async_trait;
use rmcp::{
    model::{CallToolRequestParams, ClientCapabilities, ClientInfo, Implementation, RawContent},
    service::RunningService,
    transport::StreamableHttpClientTransport,
    RoleClient, ServiceError, ServiceExt,
};
use tokio::sync::OnceCell;

use super::channel::{ToolChannel, ToolEndpoint};
use super::error::{GatewayError, GatewayResult};
use crate::logging::SharedLogger;
use crate::server::protocol::codes;
use crate::server::PeerInfo;
use crate::types::{ToolArguments, ToolCallResult, ToolDescriptor};

/// Endpoint for an MCP server reachable at `url`
pub struct McpEndpoint {
    url: String,
    logger: SharedLogger,
}

impl McpEndpoint {
    pub fn new(url: impl Into<String>, logger: SharedLogger) -> Self {
        Self {
            url: url.into(),
            logger,
        }
    }
}

#[async_trait]
impl ToolEndpoint for McpEndpoint {
    fn describe(&self) -> String {
        format!("mcp:{}", self.url)
    }

    async fn open(&self) -> GatewayResult<Arc<dyn ToolChannel>> {
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(GatewayError::Connection(format!("unsupported MCP url: {}", self.url)));
        }
        Ok(Arc::new(McpChannel {
            url: self.url.clone(),
            service: OnceCell::new(),
            logger: Arc::clone(&self.logger),
        }))
    }
}

/// rmcp performs its handshake while connecting, so the session is only
/// established in `initialize`
struct McpChannel {
    url: String,
    service: OnceCell<RunningService<RoleClient, ClientInfo>>,
    logger: SharedLogger,
}

impl McpChannel {
    fn service(&self) -> GatewayResult<&RunningService<RoleClient, ClientInfo>> {
        self.service.get().ok_or(GatewayError::NotReady)
    }
}

/// Only errors the server answered with are protocol-level; everything else
/// means the session is unusable.
fn map_service_error(e: ServiceError) -> GatewayError {
    match e {
        ServiceError::McpError(data) => GatewayError::Rpc {
            code: i64::from(data.code.0),
            message: data.message.into_owned(),
        },
        ServiceError::UnexpectedResponse => GatewayError::Rpc {
            code: codes::INTERNAL_ERROR,
            message: "unexpected response type".to_string(),
        },
        ServiceError::TransportClosed => GatewayError::ChannelClosed,
        other => GatewayError::Connection(other.to_string()),
    }
}

#[async_trait]
impl ToolChannel for McpChannel {
    async fn initialize(&self, client: &PeerInfo) -> GatewayResult<PeerInfo> {
        self.logger.info(&format!("[McpEndpoint] Connecting to HTTP: {}", self.url));

        let client_info = ClientInfo {
            meta: None,
            protocol_version: Default::default(),
            capabilities: ClientCapabilities::default(),
            client_info: Implementation {
                name: client.name.clone(),
                title: None,
                version: client.version.clone(),
                website_url: None,
                icons: None,
            },
        };

        let transport = StreamableHttpClientTransport::from_uri(self.url.clone());
        let service = client_info
            .serve(transport)
            .await
            .map_err(|e| GatewayError::Handshake(e.to_string()))?;

        let server = service
            .peer_info()
            .map(|info| PeerInfo::new(info.server_info.name.clone(), info.server_info.version.clone()))
            .unwrap_or_else(|| PeerInfo::new("unknown", "0.0.0"));

        self.service
            .set(service)
            .map_err(|_| GatewayError::Handshake("session already established".to_string()))?;

        self.logger.info(&format!("[McpEndpoint] Connected to {}", server));
        Ok(server)
    }

    async fn list_tools(&self) -> GatewayResult<Vec<ToolDescriptor>> {
        let tools = self.service()?.list_all_tools().await.map_err(map_service_error)?;

        Ok(tools
            .into_iter()
            .map(|tool| ToolDescriptor {
                name: tool.name.to_string(),
                description: tool.description.map(|s| s.to_string()).unwrap_or_default(),
                input_schema: serde_json::to_value(tool.input_schema.as_ref()).ok(),
            })
            .collect())
    }

    async fn call_tool(&self, name: &str, arguments: ToolArguments) -> GatewayResult<ToolCallResult> {
        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments: Some(arguments),
            task: None,
        };

        let result = self.service()?.call_tool(params).await.map_err(map_service_error)?;

        // Only text parts are forwarded to the model
        let content = result
            .content
            .iter()
            .filter_map(|c| match &c.raw {
                RawContent::Text(t) => Some(t.text.clone()),
                _ => None,
            })
            .collect();

        Ok(ToolCallResult {
            content,
            is_error: result.is_error.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[tokio::test]
    async fn test_rejects_non_http_url() {
        let endpoint = McpEndpoint::new("unix:///tmp/tools.sock", Arc::new(NoOpLogger));
        assert!(matches!(endpoint.open().await, Err(GatewayError::Connection(_))));
    }

    #[tokio::test]
    async fn test_calls_before_initialize_are_not_ready() {
        let endpoint = McpEndpoint::new("http://127.0.0.1:9/mcp", Arc::new(NoOpLogger));
        assert_eq!(endpoint.describe(), "mcp:http://127.0.0.1:9/mcp");

        let channel = endpoint.open().await.unwrap();
        assert_eq!(channel.list_tools().await.unwrap_err(), GatewayError::NotReady);
    }

    #[test]
    fn test_service_error_mapping() {
        use rmcp::model::{ErrorCode, ErrorData};
        use std::time::Duration;

        let answered = ServiceError::McpError(ErrorData::new(ErrorCode::INVALID_PARAMS, "unknown tool: nope", None));
        assert_eq!(
            map_service_error(answered),
            GatewayError::Rpc {
                code: codes::INVALID_PARAMS,
                message: "unknown tool: nope".to_string(),
            }
        );

        assert_eq!(map_service_error(ServiceError::TransportClosed), GatewayError::ChannelClosed);
        assert!(matches!(
            map_service_error(ServiceError::Timeout {
                timeout: Duration::from_secs(5)
            }),
            GatewayError::Connection(_)
        ));
        assert!(matches!(
            map_service_error(ServiceError::Cancelled { reason: None }),
            GatewayError::Connection(_)
        ));
    }
}
