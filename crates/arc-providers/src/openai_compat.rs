//! Caller for providers speaking the OpenAI chat-completions dialect.
//!
//! Used for OpenAI, OpenRouter, Groq, HuggingFace (router), Mistral and
//! Perplexity. Only the base URL and credential differ between them.

use arc_core::{async_trait, ProviderCaller, ProviderError, ProviderId, ProviderReply};
use reqwest::Client;
use tracing::debug;

use crate::api_types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::ProviderConfig;
use crate::http;

/// Providers served by [`OpenAiCompatibleCaller`].
pub const OPENAI_COMPATIBLE: [ProviderId; 6] = [
    ProviderId::OpenAi,
    ProviderId::OpenRouter,
    ProviderId::Groq,
    ProviderId::HuggingFace,
    ProviderId::Mistral,
    ProviderId::Perplexity,
];

/// A [`ProviderCaller`] for an OpenAI-compatible chat-completions endpoint.
pub struct OpenAiCompatibleCaller {
    client: Client,
    config: ProviderConfig,
}

impl OpenAiCompatibleCaller {
    /// Create a caller with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if !OPENAI_COMPATIBLE.contains(&config.provider) {
            return Err(ProviderError::Configuration(format!(
                "{} does not speak the OpenAI chat-completions dialect",
                config.provider
            )));
        }
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Create a caller from environment variables.
    ///
    /// See [`ProviderConfig::from_env`].
    pub fn from_env(provider: ProviderId) -> Result<Self, ProviderError> {
        Self::new(ProviderConfig::from_env(provider))
    }

    /// Get the configuration.
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn build_request(&self, text: &str, model: &str) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(ref prompt) = self.config.system_prompt {
            messages.push(ChatMessage::system(prompt.clone()));
        }
        messages.push(ChatMessage::user(text));

        ChatCompletionRequest {
            model: model.to_string(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl ProviderCaller for OpenAiCompatibleCaller {
    fn provider(&self) -> ProviderId {
        self.config.provider
    }

    async fn call(&self, text: &str, model: &str) -> Result<ProviderReply, ProviderError> {
        let api_key = http::require_key(&self.config)?;
        let url = format!("{}/chat/completions", self.config.api_url);
        let request = self.build_request(text, model);

        debug!("Sending request to {} ({})", self.config.provider, model);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(http::send_error)?;

        if !response.status().is_success() {
            return Ok(http::upstream_failure(&self.config, response).await);
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        if let Some(ref usage) = completion.usage {
            debug!(
                "{} usage: prompt={}, completion={}, total={}",
                self.config.provider,
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total_tokens
            );
        }

        Ok(match completion.text() {
            Some(text) => ProviderReply::success(text),
            None => http::empty_completion(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_openai_provider() {
        let result = OpenAiCompatibleCaller::new(ProviderConfig::new(ProviderId::Anthropic));
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn test_request_includes_system_prompt() {
        let config = ProviderConfig::builder(ProviderId::Groq)
            .system_prompt("Be terse")
            .max_tokens(64)
            .build();
        let caller = OpenAiCompatibleCaller::new(config).unwrap();

        let request = caller.build_request("hello", "llama-3.1-8b-instant");
        assert_eq!(request.model, "llama-3.1-8b-instant");
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[1].content, "hello");
        assert_eq!(request.max_tokens, Some(64));
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error() {
        let config = ProviderConfig::builder(ProviderId::Mistral)
            .api_url("http://127.0.0.1:9")
            .build();
        let caller = OpenAiCompatibleCaller::new(config).unwrap();

        // Only fails on the key when MISTRAL_API_KEY is absent from the test env.
        if std::env::var("MISTRAL_API_KEY").is_err() {
            let result = caller.call("hi", "mistral-small-latest").await;
            assert!(matches!(result, Err(ProviderError::Configuration(_))));
        }
    }

    #[tokio::test]
    #[ignore] // Requires GROQ_API_KEY
    async fn test_live_groq_call() {
        dotenvy::dotenv().ok();
        let caller = OpenAiCompatibleCaller::from_env(ProviderId::Groq).unwrap();
        let reply = caller
            .call("Say hello in one word.", "llama-3.1-8b-instant")
            .await
            .unwrap();
        assert!(reply.ok, "reply failed: {:?}", reply.error);
    }
}
