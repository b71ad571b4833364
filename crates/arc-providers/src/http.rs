//! HTTP plumbing shared by the provider callers.

use arc_core::{ProviderError, ProviderReply};
use reqwest::{Client, Response};
use tracing::warn;

use crate::api_types::ApiError;
use crate::config::ProviderConfig;

/// Build an HTTP client honoring the configured timeout.
pub(crate) fn build_client(config: &ProviderConfig) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| ProviderError::Configuration(format!("Failed to create HTTP client: {}", e)))
}

/// Map a transport failure to a provider error.
pub(crate) fn send_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Network(format!("Failed to send request: {}", e))
    }
}

/// Resolve the key for the next call or fail with a configuration error.
pub(crate) fn require_key(config: &ProviderConfig) -> Result<String, ProviderError> {
    config.resolve_api_key().ok_or_else(|| {
        ProviderError::Configuration(format!("{} is not set", config.provider.credential_var()))
    })
}

/// Turn a non-success response into a failed reply carrying the raw body.
pub(crate) async fn upstream_failure(config: &ProviderConfig, response: Response) -> ProviderReply {
    let status = response.status();
    let error_text = response.text().await.unwrap_or_default();

    let message = match serde_json::from_str::<ApiError>(&error_text) {
        Ok(api_error) => api_error.error.message,
        Err(_) => error_text.clone(),
    };

    warn!(
        "{} API error ({}): {}",
        config.provider,
        status.as_u16(),
        message
    );

    ProviderReply::failure(
        format!("API error ({}): {}", status.as_u16(), message),
        Some(format!("{} {}", status.as_u16(), error_text)),
    )
}

/// Reply for a well-formed response that carried no text.
pub(crate) fn empty_completion() -> ProviderReply {
    ProviderReply::failure("empty completion", None)
}
