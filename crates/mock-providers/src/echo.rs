//! Echo provider - answers with the prompt it was given.

use arc_core::{async_trait, ProviderCaller, ProviderError, ProviderId, ProviderReply};

/// A provider that echoes the prompt back.
///
/// Useful for testing the call flow without any upstream.
#[derive(Debug, Clone)]
pub struct EchoProvider {
    provider: ProviderId,
    /// Optional prefix to add before the echo.
    prefix: Option<String>,
}

impl EchoProvider {
    /// Create an echo provider posing as `provider`.
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            prefix: None,
        }
    }

    /// Create an echo provider with a custom prefix.
    ///
    /// # Example
    ///
    /// ```rust
    /// use arc_core::ProviderId;
    /// use mock_providers::EchoProvider;
    ///
    /// let provider = EchoProvider::with_prefix(ProviderId::Groq, "Echo: ");
    /// // Will respond with "Echo: <prompt>"
    /// ```
    pub fn with_prefix(provider: ProviderId, prefix: impl Into<String>) -> Self {
        Self {
            provider,
            prefix: Some(prefix.into()),
        }
    }
}

#[async_trait]
impl ProviderCaller for EchoProvider {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn call(&self, text: &str, _model: &str) -> Result<ProviderReply, ProviderError> {
        let reply = match &self.prefix {
            Some(prefix) => format!("{}{}", prefix, text),
            None => text.to_string(),
        };
        Ok(ProviderReply::success(reply))
    }
}
