//! The fixed set of tools advertised through `tools/list`.
//!
//! Schemas here describe arguments for the client. They are not enforced:
//! each tool decodes its own arguments and applies its own defaults.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::{json, Value};

use crate::alert::AlertStatus;

/// Name of the alert tool.
pub const SEND_ALERT: &str = "send_alert";

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDescriptor {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Immutable registry of tool descriptors.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// Creates a catalog from explicit descriptors.
    #[must_use]
    pub const fn new(tools: Vec<ToolDescriptor>) -> Self {
        Self { tools }
    }

    /// Returns the catalog shipped with the server.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![send_alert_descriptor()])
    }

    /// Returns every descriptor in declaration order.
    #[must_use]
    pub fn descriptors(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    /// Looks up a descriptor by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|tool| tool.name == name)
    }

    /// Returns `true` if a tool with this name is declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Checks that every schema is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for tool in &self.tools {
            if !seen.insert(tool.name.as_str()) {
                return Err(format!("duplicate tool name '{}'", tool.name));
            }
            validate_schema(&tool.name, &tool.input_schema)?;
        }
        Ok(())
    }
}

fn validate_schema(tool: &str, schema: &Value) -> Result<(), String> {
    if schema.get("type").and_then(Value::as_str) != Some("object") {
        return Err(format!("{tool}: input schema must have type \"object\""));
    }

    let properties = schema
        .get("properties")
        .and_then(Value::as_object)
        .ok_or_else(|| format!("{tool}: input schema has no properties map"))?;

    let required = schema
        .get("required")
        .map_or(Some(&[][..]), |r| r.as_array().map(Vec::as_slice))
        .ok_or_else(|| format!("{tool}: required must be an array"))?;

    for field in required {
        let name = field
            .as_str()
            .ok_or_else(|| format!("{tool}: required entries must be strings"))?;
        if !properties.contains_key(name) {
            return Err(format!(
                "{tool}: required field '{name}' missing from properties"
            ));
        }
    }

    for (name, property) in properties {
        if let (Some(default), Some(options)) = (
            property.get("default"),
            property.get("enum").and_then(Value::as_array),
        ) {
            if !options.contains(default) {
                return Err(format!(
                    "{tool}: default for '{name}' is not one of its enum values"
                ));
            }
        }
    }

    Ok(())
}

fn send_alert_descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: SEND_ALERT.to_string(),
        description: "Send an alert to incident.io. Re-sending with the same \
                      deduplication_key updates the existing alert; send \
                      status \"resolved\" to close it."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "title": {
                    "type": "string",
                    "description": "Alert title"
                },
                "description": {
                    "type": "string",
                    "description": "Alert description"
                },
                "deduplication_key": {
                    "type": "string",
                    "description": "Unique key to deduplicate alerts"
                },
                "status": {
                    "type": "string",
                    "description": "Alert status",
                    "enum": AlertStatus::VARIANTS,
                    "default": AlertStatus::default().as_str()
                },
                "metadata": {
                    "type": "object",
                    "description": "Additional metadata",
                    "additionalProperties": true
                }
            },
            "required": ["title", "deduplication_key"]
        }),
    }
}
