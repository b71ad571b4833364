//! Provider identifiers and the uniform provider call seam.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::ProviderError;

/// An LLM backend known to the orchestrator.
///
/// The declaration order is the fixed fallback priority used for
/// `auto` requests. It is never re-sorted per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    OpenAi,
    OpenRouter,
    Groq,
    HuggingFace,
    Anthropic,
    Gemini,
    Mistral,
    Perplexity,
}

impl ProviderId {
    /// All providers in fallback priority order.
    pub const PRIORITY: [ProviderId; 8] = [
        ProviderId::OpenAi,
        ProviderId::OpenRouter,
        ProviderId::Groq,
        ProviderId::HuggingFace,
        ProviderId::Anthropic,
        ProviderId::Gemini,
        ProviderId::Mistral,
        ProviderId::Perplexity,
    ];

    /// The lowercase wire id.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "openai",
            ProviderId::OpenRouter => "openrouter",
            ProviderId::Groq => "groq",
            ProviderId::HuggingFace => "huggingface",
            ProviderId::Anthropic => "anthropic",
            ProviderId::Gemini => "gemini",
            ProviderId::Mistral => "mistral",
            ProviderId::Perplexity => "perplexity",
        }
    }

    /// Environment variable that holds this provider's credential.
    pub fn credential_var(&self) -> &'static str {
        match self {
            ProviderId::OpenAi => "OPENAI_API_KEY",
            ProviderId::OpenRouter => "OPENROUTER_API_KEY",
            ProviderId::Groq => "GROQ_API_KEY",
            ProviderId::HuggingFace => "HF_TOKEN",
            ProviderId::Anthropic => "ANTHROPIC_API_KEY",
            ProviderId::Gemini => "GEMINI_API_KEY",
            ProviderId::Mistral => "MISTRAL_API_KEY",
            ProviderId::Perplexity => "PERPLEXITY_API_KEY",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a provider string does not name a known provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("provider not supported: {0}")]
pub struct UnknownProvider(pub String);

impl FromStr for ProviderId {
    type Err = UnknownProvider;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        ProviderId::PRIORITY
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or(UnknownProvider(normalized))
    }
}

/// Normalized outcome of a single provider call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderReply {
    /// Whether the upstream produced an answer.
    pub ok: bool,
    /// Answer text (empty on failure).
    pub text: String,
    /// Short error description on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Raw upstream error detail (status + body), kept verbatim for diagnostics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upstream: Option<String>,
}

impl ProviderReply {
    /// A successful reply.
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            ok: true,
            text: text.into(),
            error: None,
            upstream: None,
        }
    }

    /// A failed reply with an optional raw upstream payload.
    pub fn failure(error: impl Into<String>, upstream: Option<String>) -> Self {
        Self {
            ok: false,
            text: String::new(),
            error: Some(error.into()),
            upstream,
        }
    }
}

/// A uniform, per-provider LLM call.
///
/// Implementations return `Ok` with a failed [`ProviderReply`] when the
/// upstream rejected the request, and `Err` only for transport-level
/// failures. Both are recorded by the fallback executor and neither stops
/// the fallback loop.
#[async_trait]
pub trait ProviderCaller: Send + Sync {
    /// The provider this caller talks to.
    fn provider(&self) -> ProviderId;

    /// Send `text` as a single user turn to `model`.
    async fn call(&self, text: &str, model: &str) -> Result<ProviderReply, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_order() {
        let ids: Vec<&str> = ProviderId::PRIORITY.iter().map(|p| p.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "openai",
                "openrouter",
                "groq",
                "huggingface",
                "anthropic",
                "gemini",
                "mistral",
                "perplexity"
            ]
        );
    }

    #[test]
    fn test_parse_case_insensitive() {
        assert_eq!("  OpenAI ".parse::<ProviderId>(), Ok(ProviderId::OpenAi));
        assert_eq!("huggingface".parse::<ProviderId>(), Ok(ProviderId::HuggingFace));
        assert_eq!(
            "grok".parse::<ProviderId>(),
            Err(UnknownProvider("grok".to_string()))
        );
    }

    #[test]
    fn test_serde_uses_wire_ids() {
        let json = serde_json::to_string(&ProviderId::OpenRouter).unwrap();
        assert_eq!(json, "\"openrouter\"");
        let back: ProviderId = serde_json::from_str("\"gemini\"").unwrap();
        assert_eq!(back, ProviderId::Gemini);
    }

    #[test]
    fn test_reply_constructors() {
        let ok = ProviderReply::success("hi");
        assert!(ok.ok);
        assert!(ok.error.is_none());

        let failed = ProviderReply::failure("quota", Some("429 body".to_string()));
        assert!(!failed.ok);
        assert!(failed.text.is_empty());
        assert_eq!(failed.upstream.as_deref(), Some("429 body"));
    }
}
