//! Caller for the Gemini generateContent API.

use arc_core::{async_trait, ProviderCaller, ProviderError, ProviderId, ProviderReply};
use reqwest::Client;
use tracing::debug;

use crate::api_types::{
    GeminiContent, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use crate::config::ProviderConfig;
use crate::http;

/// A [`ProviderCaller`] for Google Gemini.
pub struct GeminiCaller {
    client: Client,
    config: ProviderConfig,
}

impl GeminiCaller {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let client = http::build_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(ProviderConfig::from_env(ProviderId::Gemini))
    }

    fn build_request(&self, text: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![GeminiContent::user(text)],
            system_instruction: self
                .config
                .system_prompt
                .as_ref()
                .map(GeminiContent::instruction),
            generation_config: Some(GenerationConfig {
                max_output_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            }),
        }
    }
}

#[async_trait]
impl ProviderCaller for GeminiCaller {
    fn provider(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn call(&self, text: &str, model: &str) -> Result<ProviderReply, ProviderError> {
        let api_key = http::require_key(&self.config)?;
        let url = format!("{}/models/{}:generateContent", self.config.api_url, model);

        debug!("Sending request to gemini ({})", model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&self.build_request(text))
            .send()
            .await
            .map_err(http::send_error)?;

        if !response.status().is_success() {
            return Ok(http::upstream_failure(&self.config, response).await);
        }

        let generated: GenerateContentResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
        })?;

        let text = generated.text();
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
    fn test_request_without_system_prompt() {
        let caller = GeminiCaller::new(ProviderConfig::new(ProviderId::Gemini)).unwrap();
        let value = serde_json::to_value(caller.build_request("hello")).unwrap();

        assert!(value.get("systemInstruction").is_none());
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 1024);
    }
}
