//! Tool catalog
//!
//! Converts the tools discovered through the gateway into the function
//! descriptions handed to the model.

mod catalog;

pub use catalog::{empty_object_schema, to_function_schemas, ParameterSchemaMode};
