//! Caller for the Anthropic messages API.

use arc_core::{async_trait, ProviderCaller, ProviderError, ProviderId, ProviderReply};
use reqwest::Client;
use tracing::debug;

use crate::api_types::{ChatMessage, MessagesRequest, MessagesResponse};
use crate::config::ProviderConfig;
use crate::http;

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// The messages API requires `max_tokens`.
const FALLBACK_MAX_TOKENS: u32 = 1024;

/// A [`ProviderCaller`] for Anthropic.
pub struct AnthropicCaller {
    client: Client,
    config: ProviderConfig,
}

impl AnthropicCaller {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(ProviderConfig::from_env(ProviderId::Anthropic))
    }

    fn build_request(&self, text: &str, model: &str) -> MessagesRequest {
        MessagesRequest {
            model: model.to_string(),
            max_tokens: self.config.max_tokens.unwrap_or(FALLBACK_MAX_TOKENS),
            system: self.config.system_prompt.clone(),
            messages: vec![ChatMessage::user(text)],
            temperature: self.config.temperature.map(|t| t.min(1.0)),
        }
    }
}

#[async_trait]
impl ProviderCaller for AnthropicCaller {
    fn provider(&self) -> ProviderId {
        ProviderId::Anthropic
    }

    async fn call(&self, text: &str, model: &str) -> Result<ProviderReply, ProviderError> {
        let api_key = http::require_key(&self.config)?;
        let url = format!("{}/messages", self.config.api_url);

        debug!("Sending request to anthropic ({})", model);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&self.build_request(text, model))
            .send()
            .await
            .map_err(http::send_error)?;

        if !response.status().is_success() {
            return Ok(http::upstream_failure(&self.config, response).await);
        }

        let message: MessagesResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        let text = message.text();
        if text.is_empty() {
            return Ok(http::empty_completion());
        }
        Ok(ProviderReply::success(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let config = ProviderConfig::builder(ProviderId::Anthropic)
            .system_prompt("sys")
            .temperature(1.5)
            .build();
        let caller = AnthropicCaller::new(config).unwrap();
        let request = caller.build_request("hi", "claude-3-5-haiku-latest");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["system"], "sys");
        assert_eq!(value["max_tokens"], 1024);
        assert_eq!(value["messages"][0]["content"], "hi");
        // Anthropic caps temperature at 1.0
        assert_eq!(request.temperature, Some(1.0));
    }
}
