//! Integration tests for arc-orchestrator.
//!
//! All providers and tools are deterministic stubs from `mock-providers`,
//! so these tests need no network access or credentials.
//!
//! Run with:
//!   cargo test -p arc-orchestrator --test integration_tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use arc_core::{
    async_trait, DeliberationEvent, DeliberationLog, InMemorySessionMemory, MemoryError,
    MessageRole, SessionMessage,
};
use arc_orchestrator::{
    should_deliberate, AttemptOutcome, CallAttempt, CallError, CallResult, CouncilRole,
    FailureKind, FallbackExecutor, LastTriedStore, Orchestrator, ProviderCaller, ProviderId,
    QueryRequest, SessionMemory, SkipReason, StaticRegistry,
};
use arc_tools::ToolRegistry;
use mock_providers::{EchoProvider, Scripted, ScriptedProvider, StaticTool};
use serde_json::json;

// ============================================================================
// Helpers
// ============================================================================

fn caller<P: ProviderCaller + 'static>(provider: P) -> Arc<dyn ProviderCaller> {
    Arc::new(provider)
}

fn executor(callers: Vec<Arc<dyn ProviderCaller>>, registry: StaticRegistry) -> FallbackExecutor {
    FallbackExecutor::new(callers, Arc::new(registry), Arc::new(LastTriedStore::new()))
}

/// Provider and model of every attempt, ignoring timestamps.
fn trace(attempts: &[CallAttempt]) -> Vec<(ProviderId, Option<String>, AttemptOutcome)> {
    attempts
        .iter()
        .map(|a| (a.provider, a.model.clone(), a.outcome.clone()))
        .collect()
}

fn role_of(prompt: &str) -> &'static str {
    for role in ["PROPOSER", "CRITIC", "REVISER", "FINAL"] {
        if prompt.contains(&format!("ROLE: {}\n", role)) {
            return role;
        }
    }
    "?"
}

/// Session memory that counts transcript saves and forwards to an
/// in-memory store.
#[derive(Default)]
struct CountingMemory {
    inner: InMemorySessionMemory,
    saves: AtomicUsize,
}

impl CountingMemory {
    fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionMemory for CountingMemory {
    async fn append_message(
        &self,
        session_id: &str,
        role: MessageRole,
        text: &str,
    ) -> Result<(), MemoryError> {
        self.inner.append_message(session_id, role, text).await
    }

    async fn recent_messages(
        &self,
        session_id: &str,
        limit: usize,
    ) -> Result<Vec<SessionMessage>, MemoryError> {
        self.inner.recent_messages(session_id, limit).await
    }

    async fn save_deliberation_log(
        &self,
        session_id: &str,
        events: &[DeliberationEvent],
    ) -> Result<(), MemoryError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save_deliberation_log(session_id, events).await
    }

    async fn deliberation_log(
        &self,
        session_id: &str,
    ) -> Result<Option<DeliberationLog>, MemoryError> {
        self.inner.deliberation_log(session_id).await
    }

    async fn last_deliberation_log(&self) -> Result<Option<DeliberationLog>, MemoryError> {
        self.inner.last_deliberation_log().await
    }
}

// ============================================================================
// Fallback executor
// ============================================================================

mod fallback_tests {
    use super::*;

    #[tokio::test]
    async fn test_auto_walks_priority_order_and_skips() {
        let registry = StaticRegistry::new()
            .without_credential(ProviderId::OpenAi, ["gpt-4o-mini"])
            .with_provider(ProviderId::OpenRouter, Vec::<String>::new())
            .with_provider(ProviderId::Groq, ["llama"])
            .with_provider(ProviderId::Anthropic, ["claude"]);
        let anthropic = Arc::new(ScriptedProvider::always(ProviderId::Anthropic, "hello"));

        let callers = vec![
            caller(ScriptedProvider::new(ProviderId::OpenAi)),
            caller(ScriptedProvider::new(ProviderId::OpenRouter)),
            caller(ScriptedProvider::always_raising(ProviderId::Groq, "reset")),
            caller(ScriptedProvider::new(ProviderId::HuggingFace)),
            anthropic.clone() as Arc<dyn ProviderCaller>,
            caller(ScriptedProvider::new(ProviderId::Gemini)),
        ];
        let exec = executor(callers, registry);

        let result = exec.call_named("hi", "auto", None).await;

        let providers: Vec<ProviderId> = result.attempts().iter().map(|a| a.provider).collect();
        assert_eq!(
            providers,
            vec![
                ProviderId::OpenAi,
                ProviderId::OpenRouter,
                ProviderId::Groq,
                ProviderId::HuggingFace,
                ProviderId::Anthropic,
            ]
        );
        assert_eq!(
            result.attempts()[0].outcome,
            AttemptOutcome::Skipped {
                reason: SkipReason::CredentialMissing
            }
        );
        assert_eq!(
            result.attempts()[1].outcome,
            AttemptOutcome::Skipped {
                reason: SkipReason::NoModelsConfigured
            }
        );
        assert!(matches!(
            result.attempts()[2].outcome,
            AttemptOutcome::Failed {
                kind: FailureKind::Transport,
                ..
            }
        ));
        match result {
            CallResult::Success { provider, text, .. } => {
                assert_eq!(provider, ProviderId::Anthropic);
                assert_eq!(text, "hello");
            }
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(anthropic.call_count(), 1);
    }

    #[tokio::test]
    async fn test_third_model_succeeds() {
        let registry =
            StaticRegistry::new().with_provider(ProviderId::Mistral, ["m1", "m2", "m3", "m4"]);
        let mistral = Arc::new(
            ScriptedProvider::new(ProviderId::Mistral)
                .on_model("m1", Scripted::reject("429 rate limited"))
                .on_model("m2", Scripted::raise("timeout"))
                .on_model("m3", Scripted::reply("answer")),
        );
        let exec = executor(vec![mistral.clone() as Arc<dyn ProviderCaller>], registry);

        let result = exec.call_named("q", "mistral", None).await;

        let models: Vec<Option<String>> =
            result.attempts().iter().map(|a| a.model.clone()).collect();
        assert_eq!(
            models,
            vec![Some("m1".into()), Some("m2".into()), Some("m3".into())]
        );
        match result {
            CallResult::Success { model, .. } => assert_eq!(model, "m3"),
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(mistral.models_called(), vec!["m1", "m2", "m3"]);
    }

    #[tokio::test]
    async fn test_exhaustion_counts_every_skip_and_failure() {
        let registry = StaticRegistry::new()
            .with_provider(ProviderId::OpenAi, ["a", "b"])
            .with_provider(ProviderId::Groq, Vec::<String>::new())
            .with_provider(ProviderId::Gemini, ["g"]);
        let callers: Vec<Arc<dyn ProviderCaller>> = ProviderId::PRIORITY
            .into_iter()
            .map(|p| caller(ScriptedProvider::new(p).otherwise(Scripted::reject("503"))))
            .collect();
        let exec = executor(callers, registry);

        let result = exec.call_named("q", "auto", None).await;

        assert_eq!(result.error(), Some(&CallError::NoProvidersSucceeded));
        // openai: 2 failures, groq: 1 skip, gemini: 1 failure, five others skipped
        assert_eq!(result.attempts().len(), 2 + 1 + 1 + 5);
        assert!(result.attempts().iter().all(|a| !a.is_success()));
    }

    #[tokio::test]
    async fn test_unknown_provider() {
        let exec = executor(Vec::new(), StaticRegistry::new());

        let result = exec.call_named("q", "cohere", None).await;

        assert_eq!(
            result.error(),
            Some(&CallError::UnsupportedProvider("cohere".to_string()))
        );
        assert!(result.attempts().is_empty());
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_traces() {
        let registry = StaticRegistry::new()
            .with_provider(ProviderId::Groq, ["x", "y"])
            .with_provider(ProviderId::Perplexity, ["sonar"]);
        let callers = vec![
            caller(ScriptedProvider::new(ProviderId::Groq).otherwise(Scripted::reject("overloaded"))),
            caller(EchoProvider::new(ProviderId::Perplexity)),
        ];
        let exec = executor(callers, registry);

        let first = exec.call_named("same", "auto", None).await;
        let second = exec.call_named("same", "auto", None).await;

        assert_eq!(trace(first.attempts()), trace(second.attempts()));
        assert_eq!(first.text(), second.text());
    }

    #[tokio::test]
    async fn test_forced_model_replaces_candidates() {
        let registry = StaticRegistry::new().with_provider(ProviderId::Groq, ["a", "b"]);
        let groq = Arc::new(ScriptedProvider::always(ProviderId::Groq, "ok"));
        let exec = executor(vec![groq.clone() as Arc<dyn ProviderCaller>], registry);

        let result = exec.call_named("q", "auto", Some("forced")).await;

        assert!(result.is_ok());
        assert_eq!(groq.models_called(), vec!["forced"]);
    }
}

// ============================================================================
// Trigger heuristic
// ============================================================================

mod trigger_tests {
    use super::*;

    #[test]
    fn test_weather_always_deliberates() {
        assert!(should_deliberate("weather?"));
        assert!(should_deliberate(&format!("{} weather", "a".repeat(700))));
    }

    #[test]
    fn test_short_single_question_does_not() {
        let message = "Can you tell me what a good name for my cat is?";
        assert!(message.chars().count() <= 50);
        assert!(!should_deliberate(message));
    }

    #[test]
    fn test_long_message_with_questions_and_however() {
        let filler = "z".repeat(580);
        let message = format!("{} however? why?", filler);
        assert!(message.chars().count() >= 590);
        assert!(should_deliberate(&message));
    }
}

// ============================================================================
// Orchestrator end to end
// ============================================================================

mod orchestrator_tests {
    use super::*;

    fn council_provider() -> Arc<ScriptedProvider> {
        Arc::new(
            ScriptedProvider::new(ProviderId::Groq)
                .with_handler(|prompt, _| Scripted::reply(format!("{} says hi", role_of(prompt)))),
        )
    }

    fn build(provider: Arc<ScriptedProvider>, memory: Arc<dyn SessionMemory>) -> Orchestrator {
        let mut tools = ToolRegistry::new();
        tools.register(StaticTool::ok("weather", json!({"summary": "sunny, 75F"})));

        Orchestrator::builder()
            .caller(provider as Arc<dyn ProviderCaller>)
            .registry(Arc::new(
                StaticRegistry::new().with_provider(ProviderId::Groq, ["llama"]),
            ))
            .tools(tools)
            .memory(memory)
            .build()
            .expect("orchestrator")
    }

    #[tokio::test]
    async fn test_two_rounds_produce_five_events() {
        let memory = Arc::new(CountingMemory::default());
        let orch = build(council_provider(), memory.clone());

        let response = orch
            .handle(QueryRequest::new("hello").force_council(2).with_debug())
            .await;

        let roles: Vec<CouncilRole> = response
            .council
            .expect("debug transcript")
            .iter()
            .map(|e| e.role)
            .collect();
        assert_eq!(
            roles,
            vec![
                CouncilRole::Tools,
                CouncilRole::Proposer,
                CouncilRole::Critic,
                CouncilRole::Reviser,
                CouncilRole::Final,
            ]
        );
        assert!(response.ok);
        assert_eq!(response.text.as_deref(), Some("FINAL says hi"));
        assert_eq!(response.provider.as_deref(), Some("council"));
        assert_eq!(memory.saves(), 1);
    }

    #[tokio::test]
    async fn test_failed_final_returns_reviser_text() {
        let provider = Arc::new(ScriptedProvider::new(ProviderId::Groq).with_handler(
            |prompt, _| match role_of(prompt) {
                "FINAL" => Scripted::reject("500 internal"),
                "REVISER" => Scripted::reply("revised answer"),
                role => Scripted::reply(format!("{} text", role)),
            },
        ));
        let orch = build(provider, Arc::new(InMemorySessionMemory::new()));

        let response = orch
            .handle(QueryRequest::new("hi").force_council(2))
            .await;

        assert!(response.ok);
        assert_eq!(response.text.as_deref(), Some("revised answer"));
        assert!(response.council.is_none());
    }

    #[tokio::test]
    async fn test_log_saved_even_when_text_is_empty() {
        let memory = Arc::new(CountingMemory::default());
        let provider = Arc::new(ScriptedProvider::always_raising(ProviderId::Groq, "down"));
        let orch = build(provider, memory.clone());

        for round in 1..=3 {
            let response = orch
                .handle(QueryRequest::new("hi").force_council(round))
                .await;
            assert!(!response.ok);
            assert_eq!(response.text.as_deref(), Some(""));
            assert_eq!(response.error.as_deref(), Some("no providers succeeded"));
            assert_eq!(memory.saves(), round as usize);
        }

        let log = orch.council_log("default").await.unwrap().expect("log");
        assert_eq!(log.events[0].role, CouncilRole::Tools);
        assert!(log.events[1..].iter().all(|e| e.is_error()));
    }

    #[tokio::test]
    async fn test_trigger_routes_to_council_with_tools() {
        let provider = council_provider();
        let orch = build(provider.clone(), Arc::new(InMemorySessionMemory::new()));

        let response = orch
            .handle(QueryRequest::new("What's the weather in Wilmington?").with_debug())
            .await;

        assert_eq!(response.provider.as_deref(), Some("council"));
        let events = response.council.expect("transcript");
        assert_eq!(events[0].tools.as_ref().unwrap()["weather"]["ok"], true);
        for call in provider.calls() {
            assert!(call.text.contains("TOOLS OUTPUTS (JSON):"));
            assert!(call.text.contains("sunny, 75F"));
        }
    }

    #[tokio::test]
    async fn test_history_is_recorded() {
        let memory = Arc::new(InMemorySessionMemory::new());
        let orch = build(council_provider(), memory.clone());

        orch.handle(QueryRequest::new("hello").with_session("s9"))
            .await;
        orch.handle(QueryRequest::new("thanks").with_session("s9"))
            .await;

        let history = memory.recent_messages("s9", 12).await.unwrap();
        let roles: Vec<MessageRole> = history.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::Assistant
            ]
        );
        assert_eq!(history[0].text, "hello");
    }

    #[tokio::test]
    async fn test_failed_single_call_keeps_history_to_user_turn() {
        let memory = Arc::new(InMemorySessionMemory::new());
        let provider = Arc::new(ScriptedProvider::new(ProviderId::Groq));
        let orch = build(provider, memory.clone());

        let response = orch.handle(QueryRequest::new("hello")).await;

        assert!(!response.ok);
        assert_eq!(response.error.as_deref(), Some("no providers succeeded"));
        assert!(response.text.is_none());
        assert_eq!(response.attempts.map(|a| a.len()), Some(1));

        let history = memory.recent_messages("default", 12).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_unsupported_provider_response() {
        let orch = build(council_provider(), Arc::new(InMemorySessionMemory::new()));

        let response = orch
            .handle(QueryRequest::new("hello").with_provider("anthropic"))
            .await;

        assert!(!response.ok);
        assert_eq!(
            response.error.as_deref(),
            Some("provider not supported: anthropic")
        );
        assert_eq!(response.attempts.map(|a| a.len()), Some(0));
    }

    #[tokio::test]
    async fn test_last_tried_and_last_council_log() {
        let orch = build(council_provider(), Arc::new(InMemorySessionMemory::new()));
        assert!(orch.last_council_log().await.unwrap().is_none());

        orch.handle(QueryRequest::new("hi").with_session("a").force_council(1))
            .await;

        let last = orch.last_tried().expect("last tried");
        assert_eq!(last.provider, ProviderId::Groq);
        assert_eq!(last.model, "llama");
        assert!(last.error.is_none());

        let log = orch.last_council_log().await.unwrap().expect("log");
        assert_eq!(log.session_id, "a");
        assert_eq!(log.events.len(), 4);
    }
}
