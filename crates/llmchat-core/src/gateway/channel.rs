//! Endpoint and channel seams

use std::sync::Arc;

use async_trait::async_trait;

use super::error::GatewayResult;
use crate::server::PeerInfo;
use crate::types::{ToolArguments, ToolCallResult, ToolDescriptor};

/// An open connection to a tool endpoint
///
/// Protocol-level failures (unknown tool, bad parameters) are reported as
/// `GatewayError::Rpc`; transport failures as `ChannelClosed` or `Connection`.
#[async_trait]
pub trait ToolChannel: Send + Sync {
    /// Identify this client and return the server's identity
    async fn initialize(&self, client: &PeerInfo) -> GatewayResult<PeerInfo>;

    async fn list_tools(&self) -> GatewayResult<Vec<ToolDescriptor>>;

    async fn call_tool(&self, name: &str, arguments: ToolArguments) -> GatewayResult<ToolCallResult>;
}

/// Factory for [`ToolChannel`]s
#[async_trait]
pub trait ToolEndpoint: Send + Sync {
    /// Short description used in log lines
    fn describe(&self) -> String;

    async fn open(&self) -> GatewayResult<Arc<dyn ToolChannel>>;
}
