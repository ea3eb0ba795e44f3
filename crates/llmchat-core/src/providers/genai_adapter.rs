//! Conversions between llmchat types and genai types, and genai client setup
//!
//! Credentials come from our own resolution (settings, then secret store) and
//! are handed to genai through an `AuthResolver`.

use genai::chat::{
    ChatMessage as GenaiMessage, ChatRole as GenaiRole, Tool as GenaiTool, ToolCall as GenaiToolCall,
    ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::Value;

use crate::types::{ChatMessage, FunctionSchema, MessageRole, ToolCallRequest};

// ============================================================================
// Outgoing: llmchat -> genai
// ============================================================================

pub fn to_genai_role(role: MessageRole) -> GenaiRole {
    match role {
        MessageRole::System => GenaiRole::System,
        MessageRole::User => GenaiRole::User,
        MessageRole::Assistant => GenaiRole::Assistant,
        MessageRole::Tool => GenaiRole::Tool,
    }
}

fn to_genai_tool_call(call: &ToolCallRequest) -> GenaiToolCall {
    let fn_arguments = match serde_json::from_str::<Value>(&call.arguments) {
        Ok(value @ Value::Object(_)) => value,
        _ => Value::Object(Default::default()),
    };
    GenaiToolCall {
        call_id: call.id.clone(),
        fn_name: call.name.clone(),
        fn_arguments,
        thought_signatures: None,
    }
}

/// Convert one message.
///
/// An assistant message carrying tool calls becomes a single tool-call
/// message; its text, if any, is not sent.
pub fn to_genai_message(msg: &ChatMessage) -> GenaiMessage {
    match msg.role {
        MessageRole::System => GenaiMessage::system(msg.content.as_str()),
        MessageRole::User => GenaiMessage::user(msg.content.as_str()),
        MessageRole::Assistant if msg.has_tool_calls() => {
            let calls: Vec<GenaiToolCall> = msg.calls().iter().map(to_genai_tool_call).collect();
            GenaiMessage::from(calls)
        }
        MessageRole::Assistant => GenaiMessage::assistant(msg.content.as_str()),
        MessageRole::Tool => {
            let call_id = msg.tool_call_id.clone().unwrap_or_default();
            GenaiMessage::from(GenaiToolResponse::new(call_id, msg.content.clone()))
        }
    }
}

pub fn to_genai_messages(messages: &[ChatMessage]) -> Vec<GenaiMessage> {
    messages.iter().map(to_genai_message).collect()
}

pub fn to_genai_tool(schema: &FunctionSchema) -> GenaiTool {
    GenaiTool::new(&schema.name)
        .with_description(&schema.description)
        .with_schema(schema.parameters.clone())
}

pub fn to_genai_tools(schemas: &[FunctionSchema]) -> Vec<GenaiTool> {
    schemas.iter().map(to_genai_tool).collect()
}

// ============================================================================
// Incoming: genai -> llmchat
// ============================================================================

/// Convert a genai tool call, keeping its arguments as a JSON string.
///
/// Providers that hand back the raw argument text arrive as `Value::String`;
/// that text is kept as-is rather than re-encoded.
pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCallRequest {
    let arguments = match &tc.fn_arguments {
        Value::String(raw) => raw.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    ToolCallRequest::new(tc.call_id.clone(), tc.fn_name.clone(), arguments)
}

// ============================================================================
// Client Creation
// ============================================================================

/// Providers that need a credential before any request is made
pub fn requires_api_key(provider: &str) -> bool {
    !matches!(provider.to_lowercase().as_str(), "ollama" | "mock")
}

/// Fixed endpoint for OpenAI-compatible providers genai does not know
pub fn compat_endpoint(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "openrouter" => Some("https://openrouter.ai/api/v1/"),
        "mistral" => Some("https://api.mistral.ai/v1/"),
        _ => None,
    }
}

/// Build a genai client for `provider`.
///
/// `api_base` replaces the resolved endpoint for any provider. Compatible
/// providers are routed through the OpenAI adapter.
pub fn create_client(provider: &str, api_key: Option<String>, api_base: Option<String>) -> Client {
    let auth_resolver = AuthResolver::from_resolver_fn(
        move |_model_iden| -> Result<Option<AuthData>, genai::resolver::Error> {
            Ok(api_key.clone().map(AuthData::from_single))
        },
    );

    let compat = compat_endpoint(provider);
    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            if api_base.is_none() && compat.is_none() {
                return Ok(target);
            }

            let ServiceTarget { endpoint, auth, model } = target;
            let endpoint = match (&api_base, compat) {
                (Some(base), _) => Endpoint::from_owned(base.clone()),
                (None, Some(url)) => Endpoint::from_static(url),
                (None, None) => endpoint,
            };
            let model = match compat {
                Some(_) => ModelIden::new(AdapterKind::OpenAI, model.model_name.clone()),
                None => model,
            };

            Ok(ServiceTarget { endpoint, auth, model })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_conversion() {
        assert!(matches!(to_genai_role(MessageRole::System), GenaiRole::System));
        assert!(matches!(to_genai_role(MessageRole::Assistant), GenaiRole::Assistant));
        assert!(matches!(to_genai_role(MessageRole::Tool), GenaiRole::Tool));
    }

    #[test]
    fn test_message_conversion() {
        assert!(matches!(to_genai_message(&ChatMessage::user("Hello")).role, GenaiRole::User));
        assert!(matches!(to_genai_message(&ChatMessage::tool("c1", "42")).role, GenaiRole::Tool));

        let calls = ChatMessage::assistant_with_calls("", vec![ToolCallRequest::new("c1", "add", "{}")]);
        assert!(matches!(to_genai_message(&calls).role, GenaiRole::Assistant));
    }

    #[test]
    fn test_tool_conversion() {
        let schema = FunctionSchema {
            name: "get_weather".to_string(),
            description: "Get weather for a location".to_string(),
            parameters: json!({"type": "object", "properties": {}}),
        };
        assert_eq!(to_genai_tool(&schema).name, "get_weather");
    }

    #[test]
    fn test_tool_call_arguments() {
        let structured = GenaiToolCall {
            call_id: "c1".to_string(),
            fn_name: "add".to_string(),
            fn_arguments: json!({"a": 2}),
            thought_signatures: None,
        };
        let call = from_genai_tool_call(&structured);
        assert_eq!(call.id, "c1");
        assert_eq!(call.parse_arguments().get("a"), Some(&json!(2)));

        let raw = GenaiToolCall {
            fn_arguments: Value::String("{\"a\":3}".to_string()),
            ..structured
        };
        assert_eq!(from_genai_tool_call(&raw).arguments, "{\"a\":3}");
    }

    #[test]
    fn test_outgoing_call_with_bad_arguments() {
        let call = to_genai_tool_call(&ToolCallRequest::new("c1", "add", "{oops"));
        assert_eq!(call.fn_arguments, json!({}));
    }

    #[test]
    fn test_provider_tables() {
        assert!(compat_endpoint("OpenRouter").is_some());
        assert!(compat_endpoint("openai").is_none());
        assert!(compat_endpoint("mistral").is_some());
        assert!(requires_api_key("openai"));
        assert!(!requires_api_key("ollama"));
    }
}
