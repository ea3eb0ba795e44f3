//! Chat settings and environment overlay

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::secrets::SecretStore;
use crate::tools::ParameterSchemaMode;

pub const DEFAULT_PROVIDER: &str = "openai";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_MAX_TOOL_ROUNDS: u32 = 10;
pub const DEFAULT_TURN_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_HANDSHAKE_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CLIENT_NAME: &str = "LLMChat";

/// Runtime settings for the orchestrator and its collaborators
///
/// Every field has a default, so a partial (or empty) YAML document is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatSettings {
    /// Model provider name (`openai`, `anthropic`, `ollama`, `mock`, ...)
    pub provider: String,
    /// Model identifier sent with every completion request
    pub model: String,
    /// Explicit credential; when absent the secret store is consulted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Override for the provider's base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub max_tool_rounds: u32,
    pub turn_timeout_secs: u64,
    pub handshake_timeout_secs: u64,
    pub parameter_schema: ParameterSchemaMode,
    /// Name announced to the tool endpoint during the handshake
    pub client_name: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            provider: DEFAULT_PROVIDER.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_base: None,
            max_tool_rounds: DEFAULT_MAX_TOOL_ROUNDS,
            turn_timeout_secs: DEFAULT_TURN_TIMEOUT_SECS,
            handshake_timeout_secs: DEFAULT_HANDSHAKE_TIMEOUT_SECS,
            parameter_schema: ParameterSchemaMode::default(),
            client_name: DEFAULT_CLIENT_NAME.to_string(),
        }
    }
}

impl ChatSettings {
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_max_tool_rounds(mut self, rounds: u32) -> Self {
        self.max_tool_rounds = rounds;
        self
    }

    /// Overlay values from the process environment
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Overlay values from an arbitrary lookup.
    ///
    /// Empty values are treated as unset. Numbers that fail to parse leave the
    /// previous value in place.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(provider) = get("LLMCHAT_PROVIDER") {
            self.provider = provider;
        }
        if let Some(model) = get("OPENAI_CHAT_MODEL") {
            self.model = model;
        }
        if let Some(base) = get("LLMCHAT_API_BASE") {
            self.api_base = Some(base);
        }
        if let Some(rounds) = get("LLMCHAT_MAX_TOOL_ROUNDS").and_then(|v| v.trim().parse().ok()) {
            self.max_tool_rounds = rounds;
        }
        if let Some(secs) = get("LLMCHAT_TURN_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            self.turn_timeout_secs = secs;
        }
    }

    /// Resolve the credential: explicit `apiKey` first, then the secret store
    pub fn resolve_api_key(&self, secrets: &dyn SecretStore) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.is_empty())
            .or_else(|| secrets.get(&self.provider))
    }

    pub fn turn_timeout(&self) -> Duration {
        Duration::from_secs(self.turn_timeout_secs)
    }

    pub fn handshake_timeout(&self) -> Duration {
        Duration::from_secs(self.handshake_timeout_secs)
    }
}
