//! The tool-calling conversation loop

use std::sync::Arc;

use crate::config::{ChatSettings, DEFAULT_MAX_TOOL_ROUNDS, DEFAULT_MODEL};
use crate::gateway::{ToolEndpoint, ToolGateway, CLIENT_VERSION};
use crate::logging::SharedLogger;
use crate::providers::{CompletionRequest, SharedModelClient};
use crate::tools::{to_function_schemas, ParameterSchemaMode};
use crate::types::{CancellationToken, ChatMessage};

use super::error::{ChatError, ChatResult};

#[derive(Debug, Clone, PartialEq)]
pub struct OrchestratorConfig {
    /// Model id sent with every completion request
    pub model: String,
    /// Tool-requesting responses allowed per turn
    pub max_tool_rounds: u32,
    pub schema_mode: ParameterSchemaMode,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            schema_mode: ParameterSchemaMode::default(),
        }
    }
}

impl From<&ChatSettings> for OrchestratorConfig {
    fn from(settings: &ChatSettings) -> Self {
        Self {
            model: settings.model.clone(),
            max_tool_rounds: settings.max_tool_rounds,
            schema_mode: settings.parameter_schema,
        }
    }
}

/// Outcome of one turn
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    /// Final assistant text; empty when the model returned no candidates
    pub reply: String,
    /// Working sequence: history, the user message, every assistant and tool
    /// message of the turn, and the final assistant message if there was one
    pub messages: Vec<ChatMessage>,
    pub model_calls: usize,
    pub tool_calls: usize,
}

/// Drives the model and the tool gateway until the model stops asking for tools
///
/// One orchestrator (and therefore one gateway) is meant to be shared through
/// an `Arc` by every concurrent turn.
pub struct ConversationOrchestrator {
    model_client: SharedModelClient,
    gateway: Arc<ToolGateway>,
    config: OrchestratorConfig,
    logger: SharedLogger,
}

impl ConversationOrchestrator {
    pub fn new(
        model_client: SharedModelClient,
        gateway: Arc<ToolGateway>,
        config: OrchestratorConfig,
        logger: SharedLogger,
    ) -> Self {
        Self {
            model_client,
            gateway,
            config,
            logger,
        }
    }

    /// Wire an orchestrator and a fresh gateway to `endpoint` from settings
    pub fn from_settings(
        settings: &ChatSettings,
        model_client: SharedModelClient,
        endpoint: Arc<dyn ToolEndpoint>,
        logger: SharedLogger,
    ) -> Self {
        let gateway = ToolGateway::new(endpoint, Arc::clone(&logger))
            .with_client_info(settings.client_name.clone(), CLIENT_VERSION)
            .with_handshake_timeout(settings.handshake_timeout());
        Self::new(model_client, Arc::new(gateway), OrchestratorConfig::from(settings), logger)
    }

    pub fn gateway(&self) -> &Arc<ToolGateway> {
        &self.gateway
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Single turn with no prior history
    pub async fn chat(&self, ctx: &CancellationToken, message: &str) -> ChatResult<String> {
        self.run(ctx, Vec::new(), message).await
    }

    /// Run one turn on top of `history` and return the final reply
    pub async fn run(&self, ctx: &CancellationToken, history: Vec<ChatMessage>, message: &str) -> ChatResult<String> {
        Ok(self.run_with_transcript(ctx, history, message).await?.reply)
    }

    /// Like [`run`](Self::run), also returning the working sequence and counters
    pub async fn run_with_transcript(
        &self,
        ctx: &CancellationToken,
        history: Vec<ChatMessage>,
        message: &str,
    ) -> ChatResult<Turn> {
        self.gateway.ensure_ready(ctx).await?;
        let tools = self.gateway.list_tools(ctx).await?;
        let schemas = to_function_schemas(&tools, self.config.schema_mode);

        let mut turn = Turn {
            reply: String::new(),
            messages: history,
            model_calls: 0,
            tool_calls: 0,
        };
        turn.messages.push(ChatMessage::user(message));

        let mut rounds: u32 = 0;
        loop {
            let request = CompletionRequest::new(self.config.model.clone(), turn.messages.clone())
                .with_tools(schemas.clone());
            turn.model_calls += 1;
            self.logger.debug(&format!(
                "[Orchestrator] Model call {} with {} messages, {} tools",
                turn.model_calls,
                request.messages.len(),
                request.tools.len()
            ));

            let response = ctx.guard(self.model_client.complete(request)).await??;

            let Some(candidate) = response.candidates.into_iter().next() else {
                self.logger.info("[Orchestrator] Model returned no candidates");
                return Ok(turn);
            };

            if !candidate.has_tool_calls() {
                turn.reply = candidate.content.clone();
                turn.messages.push(candidate);
                self.logger.info(&format!(
                    "[Orchestrator] Turn complete: {} model calls, {} tool calls",
                    turn.model_calls, turn.tool_calls
                ));
                return Ok(turn);
            }

            rounds += 1;
            if rounds > self.config.max_tool_rounds {
                self.logger.warn(&format!(
                    "[Orchestrator] Giving up after {} tool rounds",
                    self.config.max_tool_rounds
                ));
                return Err(ChatError::ToolLoopExceeded {
                    max_rounds: self.config.max_tool_rounds,
                });
            }

            let calls = candidate.calls().to_vec();
            turn.messages.push(candidate);

            for call in calls {
                self.logger.info(&format!("[Orchestrator] Dispatching tool {} ({})", call.name, call.id));
                let result = self.gateway.invoke(ctx, &call.name, call.parse_arguments()).await?;
                turn.tool_calls += 1;
                if result.is_error {
                    self.logger.warn(&format!("[Orchestrator] Tool {} reported an error", call.name));
                }
                turn.messages.push(ChatMessage::tool(call.id, result.joined()));
            }
        }
    }
}

impl std::fmt::Debug for ConversationOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationOrchestrator")
            .field("model_client", &self.model_client.name())
            .field("gateway", &self.gateway)
            .field("config", &self.config)
            .finish()
    }
}
