//! Provider fallback executor.
//!
//! Walks providers in a fixed priority order and each provider's candidate
//! models in order, returning the first success together with the full
//! attempt trace. Calls are strictly sequential.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arc_core::{CapabilityRegistry, ProviderCaller, ProviderId};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::CallError;
use crate::last_tried::LastTriedStore;

/// Which provider(s) a call may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedProvider {
    /// Try every provider in priority order.
    Auto,
    /// Try only this provider.
    Specific(ProviderId),
}

impl RequestedProvider {
    /// Providers to walk, in order.
    fn order(&self) -> Vec<ProviderId> {
        match self {
            RequestedProvider::Auto => ProviderId::PRIORITY.to_vec(),
            RequestedProvider::Specific(id) => vec![*id],
        }
    }
}

impl FromStr for RequestedProvider {
    type Err = CallError;

    /// `""` and `"auto"` (any case) mean [`RequestedProvider::Auto`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        if normalized.is_empty() || normalized == "auto" {
            return Ok(RequestedProvider::Auto);
        }
        normalized
            .parse::<ProviderId>()
            .map(RequestedProvider::Specific)
            .map_err(|_| CallError::UnsupportedProvider(normalized))
    }
}

impl fmt::Display for RequestedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestedProvider::Auto => f.write_str("auto"),
            RequestedProvider::Specific(id) => write!(f, "{}", id),
        }
    }
}

/// Why a provider was passed over without a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    CredentialMissing,
    NoModelsConfigured,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::CredentialMissing => "key missing",
            SkipReason::NoModelsConfigured => "no models configured",
        }
    }
}

/// How a provider call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The upstream answered with an error.
    Upstream,
    /// The call itself raised (network, timeout, bad payload).
    Transport,
}

/// Outcome of one attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Skipped {
        reason: SkipReason,
    },
    Failed {
        kind: FailureKind,
        error: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        upstream: Option<String>,
    },
    Succeeded {
        text: String,
    },
}

/// One entry in an attempt trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallAttempt {
    pub provider: ProviderId,
    /// Absent for skipped providers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
    pub at: DateTime<Utc>,
}

impl CallAttempt {
    fn skipped(provider: ProviderId, reason: SkipReason) -> Self {
        Self {
            provider,
            model: None,
            outcome: AttemptOutcome::Skipped { reason },
            at: Utc::now(),
        }
    }

    fn called(provider: ProviderId, model: &str, outcome: AttemptOutcome) -> Self {
        Self {
            provider,
            model: Some(model.to_string()),
            outcome,
            at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Succeeded { .. })
    }
}

/// Result of a fallback call. Both variants carry the attempt trace.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    Success {
        provider: ProviderId,
        model: String,
        text: String,
        attempts: Vec<CallAttempt>,
    },
    Failure {
        error: CallError,
        attempts: Vec<CallAttempt>,
    },
}

impl CallResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CallResult::Success { .. })
    }

    /// Answer text, empty on failure.
    pub fn text(&self) -> &str {
        match self {
            CallResult::Success { text, .. } => text,
            CallResult::Failure { .. } => "",
        }
    }

    pub fn attempts(&self) -> &[CallAttempt] {
        match self {
            CallResult::Success { attempts, .. } | CallResult::Failure { attempts, .. } => attempts,
        }
    }

    pub fn into_attempts(self) -> Vec<CallAttempt> {
        match self {
            CallResult::Success { attempts, .. } | CallResult::Failure { attempts, .. } => attempts,
        }
    }

    pub fn error(&self) -> Option<&CallError> {
        match self {
            CallResult::Success { .. } => None,
            CallResult::Failure { error, .. } => Some(error),
        }
    }
}

/// Sequential provider/model fallback.
pub struct FallbackExecutor {
    callers: IndexMap<ProviderId, Arc<dyn ProviderCaller>>,
    registry: Arc<dyn CapabilityRegistry>,
    last_tried: Arc<LastTriedStore>,
}

impl FallbackExecutor {
    /// Create an executor. A later caller for the same provider replaces
    /// an earlier one.
    pub fn new<I>(
        callers: I,
        registry: Arc<dyn CapabilityRegistry>,
        last_tried: Arc<LastTriedStore>,
    ) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ProviderCaller>>,
    {
        let callers = callers
            .into_iter()
            .map(|caller| (caller.provider(), caller))
            .collect();

        Self {
            callers,
            registry,
            last_tried,
        }
    }

    /// Whether a caller is registered for the provider.
    pub fn has_caller(&self, provider: ProviderId) -> bool {
        self.callers.contains_key(&provider)
    }

    pub fn registry(&self) -> &Arc<dyn CapabilityRegistry> {
        &self.registry
    }

    pub fn last_tried(&self) -> &Arc<LastTriedStore> {
        &self.last_tried
    }

    /// Call with a provider given by name (`"auto"` or a provider id).
    ///
    /// Unknown names fail with [`CallError::UnsupportedProvider`] and no
    /// attempts.
    pub async fn call_named(&self, text: &str, provider: &str, model: Option<&str>) -> CallResult {
        match provider.parse::<RequestedProvider>() {
            Ok(requested) => self.call(text, requested, model).await,
            Err(error) => CallResult::Failure {
                error,
                attempts: Vec::new(),
            },
        }
    }

    /// Run the fallback loop.
    ///
    /// A forced model replaces every provider's candidate list.
    pub async fn call(
        &self,
        text: &str,
        requested: RequestedProvider,
        forced_model: Option<&str>,
    ) -> CallResult {
        if let RequestedProvider::Specific(id) = requested {
            if !self.has_caller(id) {
                return CallResult::Failure {
                    error: CallError::UnsupportedProvider(id.to_string()),
                    attempts: Vec::new(),
                };
            }
        }

        let forced_model = forced_model.map(str::trim).filter(|m| !m.is_empty());
        let mut attempts = Vec::new();

        for provider in requested.order() {
            let Some(caller) = self.callers.get(&provider) else {
                continue;
            };

            if !self.registry.is_credential_present(provider) {
                debug!("Skipping {}: credential missing", provider);
                attempts.push(CallAttempt::skipped(provider, SkipReason::CredentialMissing));
                continue;
            }

            let models = match forced_model {
                Some(model) => vec![model.to_string()],
                None => self.registry.candidate_models(provider),
            };

            if models.is_empty() {
                debug!("Skipping {}: no models configured", provider);
                attempts.push(CallAttempt::skipped(provider, SkipReason::NoModelsConfigured));
                continue;
            }

            for model in models {
                debug!("Calling {} ({})", provider, model);
                let started = self.last_tried.begin(provider, &model);

                let outcome = match caller.call(text, &model).await {
                    Ok(reply) if reply.ok => AttemptOutcome::Succeeded { text: reply.text },
                    Ok(reply) => AttemptOutcome::Failed {
                        kind: FailureKind::Upstream,
                        error: reply
                            .error
                            .unwrap_or_else(|| "provider returned no answer".to_string()),
                        upstream: reply.upstream,
                    },
                    Err(e) => AttemptOutcome::Failed {
                        kind: FailureKind::Transport,
                        error: e.to_string(),
                        upstream: None,
                    },
                };

                if let AttemptOutcome::Failed { ref error, .. } = outcome {
                    warn!("{} ({}) failed: {}", provider, model, error);
                    self.last_tried.fail(&started, error);
                }

                let attempt = CallAttempt::called(provider, &model, outcome);
                if let AttemptOutcome::Succeeded { ref text } = attempt.outcome {
                    info!(
                        "{} ({}) answered after {} attempt(s)",
                        provider,
                        model,
                        attempts.len() + 1
                    );
                    let text = text.clone();
                    attempts.push(attempt);
                    return CallResult::Success {
                        provider,
                        model,
                        text,
                        attempts,
                    };
                }
                attempts.push(attempt);
            }
        }

        warn!("No provider succeeded ({} attempts)", attempts.len());
        CallResult::Failure {
            error: CallError::NoProvidersSucceeded,
            attempts,
        }
    }
}
