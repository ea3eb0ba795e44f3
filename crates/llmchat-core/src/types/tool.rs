//! Tool/function calling types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Argument mapping passed to a tool
pub type ToolArguments = Map<String, Value>;

/// A tool as advertised by the tool endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Tool name, the dispatch key
    pub name: String,
    /// Description of what the tool does
    #[serde(default)]
    pub description: String,
    /// JSON Schema for the input parameters
    #[serde(rename = "inputSchema", default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
}

impl ToolDescriptor {
    /// Create a new tool descriptor without a parameter schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: None,
        }
    }

    /// Set the input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = Some(schema);
        self
    }
}

/// Function description handed to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    /// JSON Schema object describing the parameters
    pub parameters: Value,
}

/// Tool call requested by the model
///
/// `arguments` is kept exactly as the model produced it (a JSON document in
/// string form); use [`ToolCallRequest::parse_arguments`] to decode it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    /// Identifier, unique within one model response
    pub id: String,
    /// Name of the tool being called
    pub name: String,
    /// Raw JSON-encoded arguments
    pub arguments: String,
}

impl ToolCallRequest {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Decode the arguments, falling back to an empty mapping.
    ///
    /// Empty payloads, malformed JSON and JSON that is not an object all
    /// yield an empty map.
    pub fn parse_arguments(&self) -> ToolArguments {
        if self.arguments.trim().is_empty() {
            return ToolArguments::new();
        }
        match serde_json::from_str::<Value>(&self.arguments) {
            Ok(Value::Object(map)) => map,
            _ => ToolArguments::new(),
        }
    }
}

/// Outcome of one tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    /// Ordered text parts
    pub content: Vec<String>,
    /// Whether this result represents a tool-level failure
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl ToolCallResult {
    /// Create a successful single-part result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![content.into()],
            is_error: false,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![message.into()],
            is_error: true,
        }
    }

    /// Concatenation of all text parts, without separators
    pub fn joined(&self) -> String {
        self.content.concat()
    }
}
