//! MCP Tool registry
//!
//! The fixed catalog of tools exposed by the server, plus validation of
//! call arguments against each tool's declared input schema.
//!
//! # Tools
//!
//! | Tool | Required | Optional |
//! |------|----------|----------|
//! | `get_appliances` | | |
//! | `get_appliance_status` | `haId` | |
//! | `get_appliance_programs` | `haId` | |
//! | `start_program` | `haId`, `programKey` | `options` |
//! | `stop_program` | `haId` | |
//! | `get_settings` | `haId` | |
//! | `update_setting` | `haId`, `settingKey`, `value` | |
//! | `get_auth_url` | | |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{Error, Result};

/// Tool definition for MCP protocol
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Result from a tool invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResult {
    pub content: Vec<ToolContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

/// Content types for tool results
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ToolContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: content.into(),
            }],
            is_error: None,
        }
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: Some(true),
        }
    }

    /// Concatenated text of all content items
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|c| match c {
                ToolContent::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn ha_id_property() -> Value {
    json!({
        "type": "string",
        "description": "The Home Appliance ID"
    })
}

fn appliance_tool(name: &str, description: &str) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "haId": ha_id_property()
            },
            "required": ["haId"]
        }),
    }
}

/// Get all available tool definitions, in catalog order
pub fn get_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_appliances".to_string(),
            description: "Get all connected Home Connect appliances".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        appliance_tool(
            "get_appliance_status",
            "Get the status of a specific appliance",
        ),
        appliance_tool(
            "get_appliance_programs",
            "Get available programs for an appliance",
        ),
        ToolDefinition {
            name: "start_program".to_string(),
            description: "Start a program on an appliance".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "haId": ha_id_property(),
                    "programKey": {
                        "type": "string",
                        "description": "The program key to start"
                    },
                    "options": {
                        "type": "object",
                        "description": "Optional program options",
                        "additionalProperties": true
                    }
                },
                "required": ["haId", "programKey"]
            }),
        },
        appliance_tool("stop_program", "Stop the active program on an appliance"),
        appliance_tool("get_settings", "Get settings of an appliance"),
        ToolDefinition {
            name: "update_setting".to_string(),
            description: "Update a setting on an appliance".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "haId": ha_id_property(),
                    "settingKey": {
                        "type": "string",
                        "description": "The setting key to update"
                    },
                    "value": {
                        "type": ["string", "number", "boolean"],
                        "description": "The new value for the setting"
                    }
                },
                "required": ["haId", "settingKey", "value"]
            }),
        },
        ToolDefinition {
            name: "get_auth_url".to_string(),
            description: "Get the OAuth authorization URL for Home Connect".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}

/// Look up a tool by name
pub fn find_tool(name: &str) -> Option<ToolDefinition> {
    get_tool_definitions().into_iter().find(|t| t.name == name)
}

/// Check `arguments` against the tool's input schema.
///
/// `null` is accepted as an empty argument object, and an optional property
/// set to `null` counts as absent. Only `required` and the declared property
/// `type`s are enforced; undeclared keys pass through.
pub fn validate_arguments(tool: &ToolDefinition, arguments: &Value) -> Result<()> {
    let empty = Map::new();
    let args = match arguments {
        Value::Null => &empty,
        Value::Object(map) => map,
        other => {
            return Err(Error::invalid_arguments(format!(
                "arguments for '{}' must be an object, got {}",
                tool.name,
                json_type_name(other)
            )));
        }
    };

    let required: Vec<&str> = tool
        .input_schema
        .get("required")
        .and_then(Value::as_array)
        .map(|keys| keys.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    for key in &required {
        if args.get(*key).is_none_or(Value::is_null) {
            return Err(Error::invalid_arguments(format!(
                "missing required argument '{}' for '{}'",
                key, tool.name
            )));
        }
    }

    let Some(properties) = tool
        .input_schema
        .get("properties")
        .and_then(Value::as_object)
    else {
        return Ok(());
    };

    for (key, value) in args {
        if value.is_null() && !required.contains(&key.as_str()) {
            continue;
        }
        let Some(declared) = properties.get(key).and_then(|p| p.get("type")) else {
            continue;
        };
        let allowed: Vec<&str> = match declared {
            Value::String(t) => vec![t.as_str()],
            Value::Array(types) => types.iter().filter_map(Value::as_str).collect(),
            _ => continue,
        };
        if !allowed.iter().any(|t| matches_type(value, t)) {
            return Err(Error::invalid_arguments(format!(
                "argument '{}' must be {}, got {}",
                key,
                allowed.join("|"),
                json_type_name(value)
            )));
        }
    }

    Ok(())
}

fn matches_type(value: &Value, schema_type: &str) -> bool {
    match schema_type {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
