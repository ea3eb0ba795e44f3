//! Tool gateway
//!
//! Owns the lazily established channel to a tool endpoint. The first caller of
//! [`ToolGateway::ensure_ready`] starts the handshake on its own task; every
//! caller, first or not, waits for that single attempt and observes its
//! outcome. The attempt is bounded only by the handshake timeout, so a caller
//! giving up early leaves it running for the others. A failed attempt is kept
//! and returned to every later caller for the lifetime of the gateway.

mod channel;
mod error;
mod in_process;
mod mcp;

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use once_cell::sync::OnceCell;

use crate::config::{DEFAULT_CLIENT_NAME, DEFAULT_HANDSHAKE_TIMEOUT_SECS};
use crate::logging::SharedLogger;
use crate::server::PeerInfo;
use crate::types::{CancellationToken, ToolArguments, ToolCallResult, ToolDescriptor};

pub use channel::{ToolChannel, ToolEndpoint};
pub use error::{GatewayError, GatewayResult};
pub use in_process::{InProcessChannel, InProcessEndpoint};
pub use mcp::McpEndpoint;

/// Version announced alongside the client name during the handshake
pub const CLIENT_VERSION: &str = "1.0.0";

struct Connected {
    channel: Arc<dyn ToolChannel>,
    server: PeerInfo,
}

type InitOutcome = Result<Arc<Connected>, GatewayError>;
type Handshake = Shared<BoxFuture<'static, InitOutcome>>;

pub struct ToolGateway {
    endpoint: Arc<dyn ToolEndpoint>,
    client_info: PeerInfo,
    handshake_timeout: Duration,
    handshake: OnceCell<Handshake>,
    logger: SharedLogger,
}

impl ToolGateway {
    /// Create an uninitialized gateway; nothing is opened until first use
    pub fn new(endpoint: Arc<dyn ToolEndpoint>, logger: SharedLogger) -> Self {
        Self {
            endpoint,
            client_info: PeerInfo::new(DEFAULT_CLIENT_NAME, CLIENT_VERSION),
            handshake_timeout: Duration::from_secs(DEFAULT_HANDSHAKE_TIMEOUT_SECS),
            handshake: OnceCell::new(),
            logger,
        }
    }

    pub fn with_client_info(mut self, name: impl Into<String>, version: impl Into<String>) -> Self {
        self.client_info = PeerInfo::new(name, version);
        self
    }

    pub fn with_handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Establish the channel once.
    ///
    /// A handshake failure (including timeout) is sticky. If `ctx` fires
    /// first, only this caller's wait ends with `Interrupted`; the handshake
    /// keeps running and its outcome is what every caller sees.
    pub async fn ensure_ready(&self, ctx: &CancellationToken) -> GatewayResult<()> {
        let handshake = self.handshake.get_or_init(|| self.start_handshake()).clone();
        ctx.guard(handshake).await?.map(|_| ())
    }

    /// Must be called from within a tokio runtime
    fn start_handshake(&self) -> Handshake {
        let handshake = connect(
            Arc::clone(&self.endpoint),
            self.client_info.clone(),
            self.handshake_timeout,
            Arc::clone(&self.logger),
        )
        .boxed()
        .shared();
        // Driven to completion even if every waiter goes away
        tokio::spawn(handshake.clone());
        handshake
    }

    /// The handshake outcome, once it has resolved
    fn outcome(&self) -> Option<InitOutcome> {
        self.handshake.get().and_then(|h| h.peek().cloned())
    }

    fn connected(&self) -> GatewayResult<Arc<Connected>> {
        self.outcome().unwrap_or(Err(GatewayError::NotReady))
    }

    /// Discover the endpoint's tools; requires a successful `ensure_ready`
    pub async fn list_tools(&self, ctx: &CancellationToken) -> GatewayResult<Vec<ToolDescriptor>> {
        let connected = self.connected()?;
        let tools = ctx.guard(connected.channel.list_tools()).await??;

        let mut seen = HashSet::new();
        for tool in &tools {
            if !seen.insert(tool.name.as_str()) {
                self.logger.warn(&format!("[ToolGateway] Duplicate tool name: {}", tool.name));
            }
        }

        self.logger.debug(&format!("[ToolGateway] Discovered {} tools", tools.len()));
        Ok(tools)
    }

    /// Call one tool.
    ///
    /// Protocol-level failures come back as an `is_error` result; only
    /// channel failures and interruption are returned as errors.
    pub async fn invoke(
        &self,
        ctx: &CancellationToken,
        name: &str,
        arguments: ToolArguments,
    ) -> GatewayResult<ToolCallResult> {
        let connected = self.connected()?;
        self.logger.debug(&format!("[ToolGateway] Invoking tool: {}", name));

        match ctx.guard(connected.channel.call_tool(name, arguments)).await? {
            Err(GatewayError::Rpc { code, message }) => {
                self.logger.warn(&format!("[ToolGateway] Tool {} failed ({}): {}", name, code, message));
                Ok(ToolCallResult::error(message))
            }
            other => other,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.outcome(), Some(Ok(_)))
    }

    /// Identity reported by the server, once connected
    pub fn server_info(&self) -> Option<PeerInfo> {
        match self.outcome() {
            Some(Ok(connected)) => Some(connected.server.clone()),
            _ => None,
        }
    }

    /// The cached initialization error, if the handshake failed
    pub fn init_error(&self) -> Option<GatewayError> {
        self.outcome().and_then(Result::err)
    }
}

async fn connect(
    endpoint: Arc<dyn ToolEndpoint>,
    client_info: PeerInfo,
    handshake_timeout: Duration,
    logger: SharedLogger,
) -> InitOutcome {
    logger.info(&format!("[ToolGateway] Connecting to {}", endpoint.describe()));

    let attempt = async {
        let channel = endpoint.open().await?;
        let server = channel.initialize(&client_info).await.map_err(|e| match e {
            GatewayError::Rpc { message, .. } => GatewayError::Handshake(message),
            other => other,
        })?;
        Ok::<_, GatewayError>(Arc::new(Connected { channel, server }))
    };

    let result = match tokio::time::timeout(handshake_timeout, attempt).await {
        Ok(result) => result,
        Err(_) => Err(GatewayError::Handshake(format!(
            "no acknowledgement within {:?}",
            handshake_timeout
        ))),
    };

    match &result {
        Ok(connected) => logger.info(&format!("[ToolGateway] Ready, server: {}", connected.server)),
        Err(e) => logger.error(&format!("[ToolGateway] Initialization failed: {}", e)),
    }
    result
}

impl std::fmt::Debug for ToolGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolGateway")
            .field("endpoint", &self.endpoint.describe())
            .field("client_info", &self.client_info)
            .field("ready", &self.is_ready())
            .finish()
    }
}
