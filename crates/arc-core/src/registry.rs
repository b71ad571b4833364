//! Capability registry: credential presence and candidate models.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::provider::ProviderId;

/// Answers, per provider, whether a credential is configured and which
/// models to try, in order.
///
/// Implementations must not cache across requests: the fallback executor
/// queries the registry on every attempt so that credentials and model
/// lists can change without a restart.
pub trait CapabilityRegistry: Send + Sync {
    /// Whether the provider's credential is present.
    fn is_credential_present(&self, provider: ProviderId) -> bool;

    /// Candidate models for the provider in priority order. May be empty.
    fn candidate_models(&self, provider: ProviderId) -> Vec<String>;

    /// Credential presence for every provider, in priority order.
    fn presence(&self) -> IndexMap<ProviderId, bool> {
        ProviderId::PRIORITY
            .into_iter()
            .map(|p| (p, self.is_credential_present(p)))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
struct Entry {
    credential: bool,
    models: Vec<String>,
}

/// A fixed, in-process registry.
///
/// Every provider has an entry; providers never configured report no
/// credential and no models.
///
/// ```rust
/// use arc_core::{CapabilityRegistry, ProviderId, StaticRegistry};
///
/// let registry = StaticRegistry::new()
///     .with_provider(ProviderId::Groq, ["llama-3.1-8b-instant"]);
///
/// assert!(registry.is_credential_present(ProviderId::Groq));
/// assert!(!registry.is_credential_present(ProviderId::OpenAi));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    entries: HashMap<ProviderId, Entry>,
}

impl StaticRegistry {
    /// Create a registry with no credentials and no models.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the provider's credential as present and set its models.
    pub fn with_provider<I, S>(mut self, provider: ProviderId, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.insert(
            provider,
            Entry {
                credential: true,
                models: models.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Configure models for a provider whose credential is absent.
    pub fn without_credential<I, S>(mut self, provider: ProviderId, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries.insert(
            provider,
            Entry {
                credential: false,
                models: models.into_iter().map(Into::into).collect(),
            },
        );
        self
    }
}

impl CapabilityRegistry for StaticRegistry {
    fn is_credential_present(&self, provider: ProviderId) -> bool {
        self.entries
            .get(&provider)
            .map(|e| e.credential)
            .unwrap_or(false)
    }

    fn candidate_models(&self, provider: ProviderId) -> Vec<String> {
        self.entries
            .get(&provider)
            .map(|e| e.models.clone())
            .unwrap_or_default()
    }
}
