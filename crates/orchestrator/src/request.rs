//! Query request and response shapes.

use arc_core::DeliberationEvent;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::council::clamp_rounds;
use crate::error::CallError;
use crate::fallback::CallAttempt;

/// Session id used when a request names none.
pub const DEFAULT_SESSION: &str = "default";

fn default_session() -> String {
    DEFAULT_SESSION.to_string()
}

fn default_provider() -> String {
    "auto".to_string()
}

/// An incoming query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    pub message: String,
    #[serde(default = "default_session")]
    pub session_id: String,
    /// `"auto"` or a provider id.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Forces this model for every provider tried.
    #[serde(default)]
    pub model: Option<String>,
    /// Skip the trigger heuristic and always deliberate.
    #[serde(default)]
    pub force_council: bool,
    /// Council rounds; the configured default applies when absent.
    #[serde(default)]
    pub council_rounds: Option<u32>,
    /// Include the council transcript in the response.
    #[serde(default)]
    pub debug: bool,
}

impl QueryRequest {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: default_session(),
            provider: default_provider(),
            model: None,
            force_council: false,
            council_rounds: None,
            debug: false,
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn force_council(mut self, rounds: u32) -> Self {
        self.force_council = true;
        self.council_rounds = Some(rounds);
        self
    }

    pub fn with_debug(mut self) -> Self {
        self.debug = true;
        self
    }

    /// Trimmed session id, falling back to [`DEFAULT_SESSION`].
    pub fn session(&self) -> &str {
        match self.session_id.trim() {
            "" => DEFAULT_SESSION,
            session => session,
        }
    }

    /// Lowercased, trimmed provider name; blank means `"auto"`.
    pub fn provider_name(&self) -> String {
        match self.provider.trim() {
            "" => default_provider(),
            provider => provider.to_lowercase(),
        }
    }

    /// Forced model, if any non-blank one was given.
    pub fn forced_model(&self) -> Option<&str> {
        self.model.as_deref().map(str::trim).filter(|m| !m.is_empty())
    }

    /// Round count clamped to the supported range.
    pub fn rounds(&self, default: u32) -> u32 {
        clamp_rounds(self.council_rounds.unwrap_or(default))
    }
}

/// Answer to a [`QueryRequest`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub ok: bool,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub ts: i64,
    /// Answering provider, or `"council"` for deliberated answers.
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// `None` only when a single call failed.
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attempts: Option<Vec<CallAttempt>>,
    /// Council transcript, in debug mode only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub council: Option<Vec<DeliberationEvent>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub council_session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryResponse {
    fn at_now(ok: bool) -> Self {
        Self {
            ok,
            ts: Utc::now().timestamp_millis(),
            provider: None,
            model: None,
            text: None,
            attempts: None,
            council: None,
            council_session_id: None,
            error: None,
        }
    }

    /// Rejected before any processing.
    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::at_now(false)
        }
    }

    /// A single-call answer.
    pub fn answered(
        session_id: &str,
        provider: impl Into<String>,
        model: impl Into<String>,
        text: impl Into<String>,
        attempts: Vec<CallAttempt>,
    ) -> Self {
        Self {
            provider: Some(provider.into()),
            model: Some(model.into()),
            text: Some(text.into()),
            attempts: Some(attempts),
            council_session_id: Some(session_id.to_string()),
            ..Self::at_now(true)
        }
    }

    /// A single call that produced no answer.
    pub fn failed(session_id: &str, error: impl Into<String>, attempts: Vec<CallAttempt>) -> Self {
        Self {
            error: Some(error.into()),
            attempts: Some(attempts),
            council_session_id: Some(session_id.to_string()),
            ..Self::at_now(false)
        }
    }

    /// A council answer; `ok` is whether the text is non-empty. A council
    /// that produced nothing reports [`CallError::NoProvidersSucceeded`].
    pub fn deliberated(
        session_id: &str,
        model: Option<&str>,
        text: impl Into<String>,
        ok: bool,
        council: Option<Vec<DeliberationEvent>>,
    ) -> Self {
        Self {
            provider: Some("council".to_string()),
            model: model.map(str::to_string),
            text: Some(text.into()),
            council,
            council_session_id: Some(session_id.to_string()),
            error: (!ok).then(|| CallError::NoProvidersSucceeded.to_string()),
            ..Self::at_now(ok)
        }
    }
}
