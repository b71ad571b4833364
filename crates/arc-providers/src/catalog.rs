//! Environment-backed capability registry.

use std::env;

use arc_core::{CapabilityRegistry, ProviderId};

/// Built-in model lists, tried in order.
pub fn default_models(provider: ProviderId) -> &'static [&'static str] {
    match provider {
        ProviderId::OpenAi => &["gpt-4o-mini", "gpt-4o"],
        ProviderId::OpenRouter => &[
            "openai/gpt-4o-mini",
            "meta-llama/llama-3.1-70b-instruct",
        ],
        ProviderId::Groq => &["llama-3.3-70b-versatile", "llama-3.1-8b-instant"],
        ProviderId::HuggingFace => &["meta-llama/Llama-3.1-8B-Instruct"],
        ProviderId::Anthropic => &["claude-3-5-haiku-latest", "claude-3-5-sonnet-latest"],
        ProviderId::Gemini => &["gemini-1.5-flash", "gemini-1.5-pro"],
        ProviderId::Mistral => &["mistral-small-latest", "mistral-large-latest"],
        ProviderId::Perplexity => &["sonar", "sonar-pro"],
    }
}

/// Name of the variable overriding a provider's model list.
pub fn models_var(provider: ProviderId) -> String {
    format!("ARC_MODELS_{}", provider.as_str().to_uppercase())
}

/// Registry that reads the process environment on every query.
///
/// - Credential: the provider's key variable (e.g. `GROQ_API_KEY`) is set
///   and non-blank.
/// - Models: `ARC_MODELS_<PROVIDER>` as a comma-separated list when set
///   (an empty value disables the provider), else the built-in defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCapabilityRegistry;

impl EnvCapabilityRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl CapabilityRegistry for EnvCapabilityRegistry {
    fn is_credential_present(&self, provider: ProviderId) -> bool {
        env::var(provider.credential_var())
            .map(|v| !v.trim().is_empty())
            .unwrap_or(false)
    }

    fn candidate_models(&self, provider: ProviderId) -> Vec<String> {
        match env::var(models_var(provider)) {
            Ok(list) => list
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => default_models(provider)
                .iter()
                .map(|m| m.to_string())
                .collect(),
        }
    }
}
