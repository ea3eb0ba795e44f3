//! GenaiModelClient - model client backed by the genai crate

use async_trait::async_trait;
use futures::StreamExt;
use genai::chat::{ChatOptions, ChatRequest, ChatStreamEvent};
use genai::Client;

use crate::config::ChatSettings;
use crate::logging::SharedLogger;
use crate::secrets::SecretStore;
use crate::types::{ChatMessage, ToolCallRequest};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{create_client, from_genai_tool_call, requires_api_key, to_genai_messages, to_genai_tools};
use super::traits::{CompletionRequest, CompletionResponse, ModelClient};

/// Model client for every provider genai supports
pub struct GenaiModelClient {
    provider: String,
    has_api_key: bool,
    client: Client,
    logger: SharedLogger,
}

impl GenaiModelClient {
    pub fn new(
        provider: impl Into<String>,
        api_key: Option<String>,
        api_base: Option<String>,
        logger: SharedLogger,
    ) -> Self {
        let provider = provider.into();
        let api_key = api_key.filter(|k| !k.is_empty());
        Self {
            has_api_key: api_key.is_some(),
            client: create_client(&provider, api_key, api_base),
            provider,
            logger,
        }
    }

    /// Build from settings, resolving the credential through `secrets`.
    ///
    /// A missing credential is not an error here; it is reported on the
    /// first completion.
    pub fn from_settings(settings: &ChatSettings, secrets: &dyn SecretStore, logger: SharedLogger) -> Self {
        let api_key = settings.resolve_api_key(secrets);
        if api_key.is_none() && requires_api_key(&settings.provider) {
            logger.warn(&format!("[GenaiModelClient] No API key found for {}", settings.provider));
        }
        Self::new(settings.provider.clone(), api_key, settings.api_base.clone(), logger)
    }
}

#[async_trait]
impl ModelClient for GenaiModelClient {
    fn name(&self) -> &str {
        &self.provider
    }

    async fn complete(&self, request: CompletionRequest) -> ProviderResult<CompletionResponse> {
        if !self.has_api_key && requires_api_key(&self.provider) {
            return Err(ProviderError::missing_api_key(&self.provider));
        }

        self.logger.debug(&format!(
            "[GenaiModelClient] complete: provider={}, model={}, messages={}, tools={}",
            self.provider,
            request.model,
            request.messages.len(),
            request.tools.len()
        ));

        let mut chat_req = ChatRequest::new(to_genai_messages(&request.messages));
        if !request.tools.is_empty() {
            chat_req = chat_req.with_tools(to_genai_tools(&request.tools));
        }
        let options = ChatOptions::default().with_capture_tool_calls(true);

        let response = self
            .client
            .exec_chat_stream(&request.model, chat_req, Some(&options))
            .await
            .map_err(|e| ProviderError::api_error(&self.provider, e.to_string()))?;

        let mut content = String::new();
        let mut streamed_calls: Vec<ToolCallRequest> = Vec::new();
        let mut captured_calls: Option<Vec<ToolCallRequest>> = None;

        let mut stream = response.stream;
        while let Some(event) = stream.next().await {
            match event {
                Ok(ChatStreamEvent::Chunk(chunk)) => content.push_str(&chunk.content),
                Ok(ChatStreamEvent::ToolCallChunk(chunk)) => {
                    let call = from_genai_tool_call(&chunk.tool_call);
                    // Later chunks for the same call supersede earlier ones
                    match streamed_calls.iter_mut().find(|c| c.id == call.id) {
                        Some(existing) => *existing = call,
                        None => streamed_calls.push(call),
                    }
                }
                Ok(ChatStreamEvent::End(end)) => {
                    if let Some(calls) = end.captured_tool_calls() {
                        captured_calls = Some(calls.into_iter().map(|tc| from_genai_tool_call(&tc)).collect());
                    }
                    break;
                }
                Ok(_) => {}
                Err(e) => {
                    self.logger.error(&format!("[GenaiModelClient] Stream error: {}", e));
                    return Err(ProviderError::api_error(&self.provider, e.to_string()));
                }
            }
        }

        let calls = captured_calls.filter(|c| !c.is_empty()).unwrap_or(streamed_calls);
        check_tool_calls(&self.provider, &calls)?;
        self.logger.debug(&format!(
            "[GenaiModelClient] Response: {} chars, {} tool calls",
            content.len(),
            calls.len()
        ));

        Ok(match (content.is_empty(), calls.is_empty()) {
            (true, true) => CompletionResponse::empty(),
            (_, true) => CompletionResponse {
                candidates: vec![ChatMessage::assistant(content)],
            },
            _ => CompletionResponse::tool_calls(content, calls),
        })
    }
}

/// A tool call without a function name cannot be dispatched
fn check_tool_calls(provider: &str, calls: &[ToolCallRequest]) -> ProviderResult<()> {
    match calls.iter().find(|c| c.name.trim().is_empty()) {
        Some(call) => Err(ProviderError::invalid_response(
            provider,
            format!("tool call {:?} has no function name", call.id),
        )),
        None => Ok(()),
    }
}

impl std::fmt::Debug for GenaiModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiModelClient")
            .field("provider", &self.provider)
            .field("has_api_key", &self.has_api_key)
            .finish()
    }
}
