//! Tool descriptors to model-facing function schemas

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::{FunctionSchema, ToolDescriptor};

/// How a tool's parameter schema is presented to the model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterSchemaMode {
    /// Always `{"type":"object","properties":{}}`, whatever the tool declares
    #[default]
    EmptyObject,
    /// Forward the declared schema; tools without one get the empty object
    Declared,
}

/// The schema advertised for a tool without parameters
pub fn empty_object_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// Convert descriptors to function schemas, preserving order.
///
/// Names and descriptions are copied verbatim.
pub fn to_function_schemas(tools: &[ToolDescriptor], mode: ParameterSchemaMode) -> Vec<FunctionSchema> {
    tools
        .iter()
        .map(|tool| FunctionSchema {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: match mode {
                ParameterSchemaMode::EmptyObject => empty_object_schema(),
                ParameterSchemaMode::Declared => tool
                    .input_schema
                    .clone()
                    .filter(Value::is_object)
                    .unwrap_or_else(empty_object_schema),
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Vec<ToolDescriptor> {
        vec![
            ToolDescriptor::new("hello", "Say hello").with_schema(json!({
                "type": "object",
                "properties": { "message": { "type": "string" } }
            })),
            ToolDescriptor::new("time", ""),
        ]
    }

    #[test]
    fn test_empty_object_mode() {
        let schemas = to_function_schemas(&catalog(), ParameterSchemaMode::default());

        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[0].name, "hello");
        assert_eq!(schemas[0].description, "Say hello");
        assert_eq!(schemas[0].parameters, json!({"type": "object", "properties": {}}));
        assert_eq!(schemas[1].name, "time");
        assert_eq!(schemas[1].description, "");
    }

    #[test]
    fn test_declared_mode() {
        let schemas = to_function_schemas(&catalog(), ParameterSchemaMode::Declared);

        assert_eq!(schemas[0].parameters["properties"]["message"]["type"], "string");
        assert_eq!(schemas[1].parameters, empty_object_schema());
    }

    #[test]
    fn test_empty_catalog() {
        assert!(to_function_schemas(&[], ParameterSchemaMode::EmptyObject).is_empty());
    }
}
