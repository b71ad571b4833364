//! Tool trait definition and types.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ToolError;

/// Arguments passed to a tool for execution.
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    /// The user message that triggered the tool.
    pub message: String,
    /// Explicit parameters as key-value pairs. These win over anything the
    /// tool would otherwise derive from the message.
    pub params: HashMap<String, Value>,
}

impl ToolArgs {
    /// Arguments carrying only the triggering message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            params: HashMap::new(),
        }
    }

    /// Add an explicit parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Get a string parameter, returning an error if missing or not a string.
    pub fn get_string(&self, key: &str) -> Result<String, ToolError> {
        self.params
            .get(key)
            .ok_or_else(|| ToolError::MissingParameter(key.to_string()))?
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| ToolError::InvalidParameter {
                name: key.to_string(),
                reason: "expected string".to_string(),
            })
    }

    /// Get an optional, non-blank string parameter.
    pub fn get_string_opt(&self, key: &str) -> Option<String> {
        self.params
            .get(key)?
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    }
}

/// Output from a tool execution.
///
/// Serialized as-is into the council's tool output map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Whether the execution produced usable data.
    pub ok: bool,
    /// Tool-specific payload.
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub data: Value,
    /// Error description when `ok` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutput {
    /// Create a successful output.
    pub fn success(data: Value) -> Self {
        Self {
            ok: true,
            data,
            error: None,
        }
    }

    /// Create a failed output with no payload.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: Value::Null,
            error: Some(error.into()),
        }
    }

    /// Create a failed output that still carries partial data.
    pub fn failure_with_data(error: impl Into<String>, data: Value) -> Self {
        Self {
            ok: false,
            data,
            error: Some(error.into()),
        }
    }
}

/// Trait for tools that can be executed by the tool router.
///
/// Tools are external capabilities (weather, news, web search, vision)
/// that take the triggering message plus optional parameters and return a
/// JSON payload. An `Err` is recorded by the router as a failed entry; it
/// never aborts the other tools.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for dispatch and as the output map key).
    fn name(&self) -> &str;

    /// Human-readable description of what the tool does.
    fn description(&self) -> &str;

    /// Execute the tool with the given arguments.
    async fn execute(&self, args: ToolArgs) -> Result<ToolOutput, ToolError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_args_params() {
        let args = ToolArgs::from_message("weather please")
            .with_param("location", "Boston")
            .with_param("blank", "  ")
            .with_param("count", 3);

        assert_eq!(args.message, "weather please");
        assert_eq!(args.get_string("location").unwrap(), "Boston");
        assert_eq!(args.get_string_opt("blank"), None);
        assert!(matches!(
            args.get_string("count"),
            Err(ToolError::InvalidParameter { .. })
        ));
        assert!(matches!(
            args.get_string("missing"),
            Err(ToolError::MissingParameter(_))
        ));
    }

    #[test]
    fn test_output_serialization() {
        let ok = ToolOutput::success(json!({"headlines": ["a"]}));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"ok": true, "data": {"headlines": ["a"]}})
        );

        let failed = ToolOutput::failure("boom");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"ok": false, "error": "boom"})
        );
    }
}
