//! Main orchestrator that answers queries.

use std::sync::Arc;

use arc_core::{
    CapabilityRegistry, DeliberationLog, InMemorySessionMemory, MessageRole, ProviderCaller,
    ProviderId, SessionMemory,
};
use arc_tools::{ImageSource, ToolRegistry};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::OrchestratorConfig;
use crate::council::{Council, CouncilRequest};
use crate::error::OrchestratorError;
use crate::fallback::{CallResult, FallbackExecutor};
use crate::last_tried::{LastTriedState, LastTriedStore};
use crate::request::{QueryRequest, QueryResponse};
use crate::tool_router::ToolRouter;
use crate::trigger::classify;

/// Per-provider view of what a call could use right now.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCandidate {
    /// Whether the provider's credential is configured.
    pub key_present: bool,
    /// Candidate models, in order.
    pub models: Vec<String>,
    /// Whether a caller is registered for the provider.
    pub callable: bool,
}

/// Main orchestrator.
///
/// The orchestrator:
/// - Rejects empty messages before touching any collaborator
/// - Records the user message in session memory
/// - Sends simple messages to a single fallback call
/// - Sends tool-flavoured, domain or complex messages to the council
/// - Records the assistant reply and returns the attempt trace or transcript
pub struct Orchestrator {
    executor: Arc<FallbackExecutor>,
    council: Council,
    memory: Arc<dyn SessionMemory>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::default()
    }

    /// Create an orchestrator from environment variables.
    ///
    /// Uses every provider caller, the env-backed capability registry, the
    /// default tool set and in-memory session storage.
    pub fn from_env(images: Arc<dyn ImageSource>) -> Result<Self, OrchestratorError> {
        let callers = arc_providers::default_callers()?;
        let tools = arc_tools::default_registry(images)?;

        Self::builder()
            .callers(callers)
            .registry(Arc::new(arc_providers::EnvCapabilityRegistry::new()))
            .tools(tools)
            .config(OrchestratorConfig::from_env())
            .build()
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Answer a query.
    pub async fn handle(&self, request: QueryRequest) -> QueryResponse {
        let message = request.message.trim();
        if message.is_empty() {
            return QueryResponse::rejected("empty message");
        }

        let session_id = request.session();
        let provider = request.provider_name();
        let model = request.forced_model();

        self.remember(session_id, MessageRole::User, message).await;

        let trigger = classify(message);
        debug!("Trigger for session {}: {:?}", session_id, trigger);

        if request.force_council || trigger.deliberate() {
            let rounds = request.rounds(self.config.default_rounds);
            info!("Deliberating for session {} ({} rounds)", session_id, rounds);

            let outcome = self
                .council
                .deliberate(CouncilRequest {
                    session_id,
                    message,
                    provider: &provider,
                    model,
                    rounds,
                })
                .await;

            self.remember(session_id, MessageRole::Assistant, &outcome.text)
                .await;

            let council = request.debug.then_some(outcome.events);
            return QueryResponse::deliberated(session_id, model, outcome.text, outcome.ok, council);
        }

        match self.executor.call_named(message, &provider, model).await {
            CallResult::Success {
                provider,
                model,
                text,
                attempts,
            } => {
                self.remember(session_id, MessageRole::Assistant, &text).await;
                QueryResponse::answered(session_id, provider.as_str(), model, text, attempts)
            }
            CallResult::Failure { error, attempts } => {
                warn!("Query for session {} failed: {}", session_id, error);
                QueryResponse::failed(session_id, error.to_string(), attempts)
            }
        }
    }

    /// Single fallback call, bypassing the council.
    pub async fn call(&self, text: &str, provider: &str, model: Option<&str>) -> CallResult {
        self.executor.call_named(text, provider, model).await
    }

    /// Credential, model list and callability for every provider, in
    /// priority order.
    pub fn candidates(&self) -> IndexMap<ProviderId, ProviderCandidate> {
        let registry = self.executor.registry();
        ProviderId::PRIORITY
            .into_iter()
            .map(|provider| {
                let key_present = registry.is_credential_present(provider);
                let models = registry.candidate_models(provider);
                (
                    provider,
                    ProviderCandidate {
                        key_present,
                        models,
                        callable: self.executor.has_caller(provider),
                    },
                )
            })
            .collect()
    }

    /// Which providers have a credential configured.
    pub fn presence(&self) -> IndexMap<ProviderId, bool> {
        self.executor.registry().presence()
    }

    /// The most recent provider call across all requests.
    pub fn last_tried(&self) -> Option<LastTriedState> {
        self.executor.last_tried().snapshot()
    }

    /// The session's latest council transcript.
    pub async fn council_log(
        &self,
        session_id: &str,
    ) -> Result<Option<DeliberationLog>, OrchestratorError> {
        Ok(self.memory.deliberation_log(session_id).await?)
    }

    /// The most recent council transcript across sessions.
    pub async fn last_council_log(&self) -> Result<Option<DeliberationLog>, OrchestratorError> {
        Ok(self.memory.last_deliberation_log().await?)
    }

    async fn remember(&self, session_id: &str, role: MessageRole, text: &str) {
        if let Err(e) = self.memory.append_message(session_id, role, text).await {
            warn!("Failed to record {} message: {}", role.as_str(), e);
        }
    }
}

/// Builder for [`Orchestrator`].
#[derive(Default)]
pub struct OrchestratorBuilder {
    callers: Vec<Arc<dyn ProviderCaller>>,
    registry: Option<Arc<dyn CapabilityRegistry>>,
    tools: Option<ToolRegistry>,
    memory: Option<Arc<dyn SessionMemory>>,
    last_tried: Option<Arc<LastTriedStore>>,
    config: Option<OrchestratorConfig>,
}

impl OrchestratorBuilder {
    /// Add provider callers. A later caller replaces an earlier one for the
    /// same provider.
    pub fn callers<I>(mut self, callers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn ProviderCaller>>,
    {
        self.callers.extend(callers);
        self
    }

    pub fn caller(mut self, caller: Arc<dyn ProviderCaller>) -> Self {
        self.callers.push(caller);
        self
    }

    /// Capability registry (required).
    pub fn registry(mut self, registry: Arc<dyn CapabilityRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Tools available to the council (default: none).
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Session storage (default: in-memory).
    pub fn memory(mut self, memory: Arc<dyn SessionMemory>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Shared last-tried slot (default: a fresh one).
    pub fn last_tried(mut self, last_tried: Arc<LastTriedStore>) -> Self {
        self.last_tried = Some(last_tried);
        self
    }

    pub fn config(mut self, config: OrchestratorConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<Orchestrator, OrchestratorError> {
        let registry = self.registry.ok_or_else(|| {
            OrchestratorError::Configuration("capability registry is required".to_string())
        })?;
        let memory = self
            .memory
            .unwrap_or_else(|| Arc::new(InMemorySessionMemory::new()));
        let last_tried = self.last_tried.unwrap_or_default();
        let config = self.config.unwrap_or_default();

        let executor = Arc::new(FallbackExecutor::new(self.callers, registry, last_tried));
        info!(
            "Orchestrator ready with {} provider caller(s)",
            ProviderId::PRIORITY
                .iter()
                .filter(|p| executor.has_caller(**p))
                .count()
        );

        let council = Council::new(
            executor.clone(),
            ToolRouter::new(self.tools.unwrap_or_default()),
            memory.clone(),
            config.system_name.clone(),
            config.memory_window,
        );

        Ok(Orchestrator {
            executor,
            council,
            memory,
            config,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arc_core::StaticRegistry;
    use mock_providers::{EchoProvider, ScriptedProvider};

    fn orchestrator(registry: StaticRegistry, callers: Vec<Arc<dyn ProviderCaller>>) -> Orchestrator {
        Orchestrator::builder()
            .callers(callers)
            .registry(Arc::new(registry))
            .build()
            .unwrap()
    }

    #[test]
    fn test_registry_is_required() {
        let result = Orchestrator::builder().build();
        assert!(matches!(result, Err(OrchestratorError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let provider = Arc::new(ScriptedProvider::always(ProviderId::Groq, "hi"));
        let orch = orchestrator(
            StaticRegistry::new().with_provider(ProviderId::Groq, ["m"]),
            vec![provider.clone() as Arc<dyn ProviderCaller>],
        );

        let response = orch.handle(QueryRequest::new("   ")).await;

        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("empty message"));
        assert_eq!(provider.call_count(), 0);
        assert!(orch.last_tried().is_none());
    }

    #[tokio::test]
    async fn test_single_call_path() {
        let orch = orchestrator(
            StaticRegistry::new().with_provider(ProviderId::Mistral, ["mistral-small-latest"]),
            vec![Arc::new(EchoProvider::new(ProviderId::Mistral)) as Arc<dyn ProviderCaller>],
        );

        let response = orch.handle(QueryRequest::new("hello")).await;

        assert!(response.ok);
        assert_eq!(response.provider.as_deref(), Some("mistral"));
        assert_eq!(response.model.as_deref(), Some("mistral-small-latest"));
        assert_eq!(response.council_session_id.as_deref(), Some("default"));
        assert_eq!(response.attempts.map(|a| a.len()), Some(1));
    }

    #[tokio::test]
    async fn test_candidates() {
        let orch = orchestrator(
            StaticRegistry::new()
                .with_provider(ProviderId::Groq, ["a", "b"])
                .with_provider(ProviderId::Gemini, Vec::<String>::new())
                .with_provider(ProviderId::OpenAi, ["gpt-4o-mini"]),
            vec![
                Arc::new(EchoProvider::new(ProviderId::Groq)) as Arc<dyn ProviderCaller>,
                Arc::new(EchoProvider::new(ProviderId::Mistral)) as Arc<dyn ProviderCaller>,
            ],
        );

        let candidates = orch.candidates();

        assert_eq!(candidates.len(), 8);
        assert_eq!(candidates.keys().next(), Some(&ProviderId::OpenAi));
        assert!(candidates[&ProviderId::Groq].callable);
        assert_eq!(candidates[&ProviderId::Groq].models, vec!["a", "b"]);
        assert!(candidates[&ProviderId::Gemini].key_present);
        assert!(!candidates[&ProviderId::Gemini].callable);
        // credential and models but no caller
        assert!(!candidates[&ProviderId::OpenAi].callable);
        // caller registered, credential and models missing
        assert!(candidates[&ProviderId::Mistral].callable);
        assert!(!candidates[&ProviderId::Mistral].key_present);
        assert!(candidates[&ProviderId::Mistral].models.is_empty());
        assert!(!orch.presence()[&ProviderId::Perplexity]);
    }
}
