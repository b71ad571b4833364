//! Council transcript types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role tag of a council transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CouncilRole {
    /// Tool routing step (runs once before the role calls).
    Tools,
    Proposer,
    Critic,
    Reviser,
    Final,
}

impl CouncilRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CouncilRole::Tools => "TOOLS",
            CouncilRole::Proposer => "PROPOSER",
            CouncilRole::Critic => "CRITIC",
            CouncilRole::Reviser => "REVISER",
            CouncilRole::Final => "FINAL",
        }
    }
}

impl fmt::Display for CouncilRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in a council transcript.
///
/// Events are appended in execution order and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliberationEvent {
    pub role: CouncilRole,
    /// Text produced by the role (or a short status line for TOOLS).
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Tool outputs keyed by tool name (TOOLS only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliberationEvent {
    /// A bare event for `role` carrying `text`.
    pub fn new(role: CouncilRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            provider: None,
            model: None,
            tools: None,
            error: None,
        }
    }

    /// Attach the provider and model that produced the text.
    pub fn with_source(mut self, provider: impl Into<String>, model: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self.model = Some(model.into());
        self
    }

    /// Attach a tool-output payload.
    pub fn with_tools(mut self, tools: Value) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Attach an error string.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Whether this event records a failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// A persisted council transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliberationLog {
    pub session_id: String,
    pub created: DateTime<Utc>,
    pub events: Vec<DeliberationEvent>,
}

impl DeliberationLog {
    pub fn new(session_id: impl Into<String>, events: Vec<DeliberationEvent>) -> Self {
        Self {
            session_id: session_id.into(),
            created: Utc::now(),
            events,
        }
    }
}
