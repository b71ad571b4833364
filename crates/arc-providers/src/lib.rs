//! HTTP provider callers for the ARC orchestrator.
//!
//! This crate implements [`arc_core::ProviderCaller`] for the eight
//! supported LLM backends and an environment-backed
//! [`arc_core::CapabilityRegistry`].
//!
//! # Features
//!
//! - One caller for every OpenAI-compatible backend (OpenAI, OpenRouter,
//!   Groq, HuggingFace, Mistral, Perplexity)
//! - Native callers for Anthropic and Gemini
//! - Credentials are read at call time, so keys can rotate without a restart
//! - Model lists overridable per provider via `ARC_MODELS_<PROVIDER>`
//!
//! # Usage
//!
//! ```rust,no_run
//! use arc_providers::{default_callers, EnvCapabilityRegistry};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let callers = default_callers()?;
//!     let registry = EnvCapabilityRegistry::new();
//!     assert_eq!(callers.len(), 8);
//!     # let _ = registry;
//!     Ok(())
//! }
//! ```

mod anthropic;
mod api_types;
mod catalog;
mod config;
mod gemini;
mod http;
mod openai_compat;

use std::sync::Arc;

pub use anthropic::AnthropicCaller;
pub use catalog::{default_models, models_var, EnvCapabilityRegistry};
pub use config::{default_api_url, ProviderConfig, ProviderConfigBuilder};
pub use gemini::GeminiCaller;
pub use openai_compat::{OpenAiCompatibleCaller, OPENAI_COMPATIBLE};

// Re-export arc-core types for convenience
pub use arc_core::{ProviderCaller, ProviderError, ProviderId, ProviderReply};

/// Build the environment-configured caller for a provider.
pub fn caller_from_env(provider: ProviderId) -> Result<Arc<dyn ProviderCaller>, ProviderError> {
    let caller: Arc<dyn ProviderCaller> = match provider {
        ProviderId::Anthropic => Arc::new(AnthropicCaller::from_env()?),
        ProviderId::Gemini => Arc::new(GeminiCaller::from_env()?),
        other => Arc::new(OpenAiCompatibleCaller::from_env(other)?),
    };
    Ok(caller)
}

/// Callers for every provider, in priority order.
pub fn default_callers() -> Result<Vec<Arc<dyn ProviderCaller>>, ProviderError> {
    ProviderId::PRIORITY
        .into_iter()
        .map(caller_from_env)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_callers_cover_priority() {
        let callers = default_callers().unwrap();
        let ids: Vec<ProviderId> = callers.iter().map(|c| c.provider()).collect();
        assert_eq!(ids, ProviderId::PRIORITY.to_vec());
    }
}
