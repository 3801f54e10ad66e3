//! OpenAPI document generation.
//!
//! The interface documents are derived from the tool registry: one POST path
//! per tool under `/api/tools/{name}`, with the tool's input schema as the
//! request body schema.

use crate::registry::ToolRegistry;
use serde_json::{json, Map, Value};

/// Build the OpenAPI 3.1 document for the REST convenience routes.
pub fn document(registry: &ToolRegistry) -> Value {
    let mut paths = Map::new();
    for tool in registry.list() {
        paths.insert(
            format!("/api/tools/{}", tool.name),
            json!({
                "post": {
                    "operationId": tool.name,
                    "summary": tool.title,
                    "description": tool.description,
                    "requestBody": {
                        "required": !tool.input_schema["required"]
                            .as_array()
                            .map(Vec::is_empty)
                            .unwrap_or(true),
                        "content": {
                            "application/json": {
                                "schema": tool.input_schema
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "Tool call result",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "object",
                                        "properties": {
                                            "success": {"type": "boolean"},
                                            "result": {"type": "array"},
                                            "error": {"type": "string"}
                                        },
                                        "required": ["success"]
                                    }
                                }
                            }
                        },
                        "404": {
                            "description": "Unknown tool"
                        }
                    }
                }
            }),
        );
    }

    json!({
        "openapi": "3.1.0",
        "info": {
            "title": "Orders MCP Server",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Schema-described tools over the orders catalog"
        },
        "paths": Value::Object(paths)
    })
}

/// The same document rendered as YAML.
pub fn document_yaml(registry: &ToolRegistry) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(&document(registry))
}
