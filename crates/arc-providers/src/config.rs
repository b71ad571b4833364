//! Configuration for provider callers.

use std::env;
use std::time::Duration;

use arc_core::ProviderId;

/// Default HTTP timeout for provider requests (60 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default base URL for a provider's API.
pub fn default_api_url(provider: ProviderId) -> &'static str {
    match provider {
        ProviderId::OpenAi => "https://api.openai.com/v1",
        ProviderId::OpenRouter => "https://openrouter.ai/api/v1",
        ProviderId::Groq => "https://api.groq.com/openai/v1",
        ProviderId::HuggingFace => "https://router.huggingface.co/v1",
        ProviderId::Anthropic => "https://api.anthropic.com/v1",
        ProviderId::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        ProviderId::Mistral => "https://api.mistral.ai/v1",
        ProviderId::Perplexity => "https://api.perplexity.ai",
    }
}

/// Configuration for one provider caller.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider this configuration belongs to.
    pub provider: ProviderId,

    /// API base URL.
    pub api_url: String,

    /// Explicit API key. When `None`, the provider's credential variable is
    /// read from the environment on every call.
    pub api_key: Option<String>,

    /// Optional system prompt sent ahead of the user turn.
    pub system_prompt: Option<String>,

    /// Maximum tokens for the response.
    pub max_tokens: Option<u32>,

    /// Temperature for generation (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// HTTP request timeout.
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Default configuration for a provider.
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            api_url: default_api_url(provider).to_string(),
            api_key: None,
            system_prompt: None,
            max_tokens: Some(1024),
            temperature: Some(0.7),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Create configuration from environment variables.
    ///
    /// Optional environment variables:
    /// - `<PROVIDER>_API_URL` - API base URL (e.g. `OPENAI_API_URL`)
    /// - `ARC_SYSTEM_PROMPT` - System prompt for every call
    /// - `ARC_MAX_TOKENS` - Max tokens (default: 1024)
    /// - `ARC_TEMPERATURE` - Temperature (default: 0.7)
    /// - `ARC_PROVIDER_TIMEOUT_SECS` - HTTP timeout (default: 60)
    ///
    /// The credential itself is not captured here; see [`ProviderConfig::api_key`].
    pub fn from_env(provider: ProviderId) -> Self {
        let defaults = Self::new(provider);

        let url_var = format!("{}_API_URL", provider.as_str().to_uppercase());
        let api_url = env::var(&url_var)
            .ok()
            .map(|v| v.trim().trim_end_matches('/').to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_url);

        let system_prompt = env::var("ARC_SYSTEM_PROMPT")
            .ok()
            .filter(|v| !v.trim().is_empty());

        let max_tokens = env::var("ARC_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(defaults.max_tokens);

        let temperature = env::var("ARC_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(defaults.temperature);

        let timeout = env::var("ARC_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        Self {
            provider,
            api_url,
            api_key: None,
            system_prompt,
            max_tokens,
            temperature,
            timeout,
        }
    }

    /// Create a new config builder.
    pub fn builder(provider: ProviderId) -> ProviderConfigBuilder {
        ProviderConfigBuilder {
            config: Self::new(provider),
        }
    }

    /// The key to use for the next call, if any.
    ///
    /// An explicit key wins; otherwise the provider's credential variable is
    /// read fresh so that key rotation does not need a restart.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            return Some(key.clone());
        }
        env::var(self.provider.credential_var())
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}

/// Builder for ProviderConfig.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
    config: ProviderConfig,
}

impl ProviderConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    /// Set the API URL.
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ProviderConfig {
        self.config
    }
}
