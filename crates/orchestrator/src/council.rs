//! Multi-role deliberation.
//!
//! A council run executes the tool router once, builds a shared base
//! context, then walks [`COUNCIL_PIPELINE`]. Every role call goes through
//! the fallback executor, and every step appends one [`DeliberationEvent`].

use std::sync::Arc;

use arc_core::{hash_prompt, CouncilRole, DeliberationEvent, SessionMemory};
use tracing::{debug, info, warn};

use crate::context::CouncilContext;
use crate::fallback::{CallResult, FallbackExecutor};
use crate::tool_router::ToolRouter;

/// Fewest rounds a council run may use.
pub const MIN_ROUNDS: u32 = 1;
/// Most rounds a council run may use.
pub const MAX_ROUNDS: u32 = 3;

/// Clamp a requested round count into `MIN_ROUNDS..=MAX_ROUNDS`.
pub fn clamp_rounds(rounds: u32) -> u32 {
    rounds.clamp(MIN_ROUNDS, MAX_ROUNDS)
}

/// How many times a pipeline step runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Once,
    /// `rounds - 1` times.
    ExtraRounds,
}

impl Repeat {
    pub fn times(&self, rounds: u32) -> u32 {
        match self {
            Repeat::Once => 1,
            Repeat::ExtraRounds => rounds.saturating_sub(1),
        }
    }
}

/// One entry of the council pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouncilStep {
    pub role: CouncilRole,
    pub instruction: &'static str,
    pub repeat: Repeat,
}

/// Role order, instructions and repetition.
pub const COUNCIL_PIPELINE: [CouncilStep; 4] = [
    CouncilStep {
        role: CouncilRole::Proposer,
        instruction: "Draft the best answer. If tools are available, incorporate them.",
        repeat: Repeat::Once,
    },
    CouncilStep {
        role: CouncilRole::Critic,
        instruction: "Find mistakes, missing steps, risks, and improvements. Be specific.",
        repeat: Repeat::Once,
    },
    CouncilStep {
        role: CouncilRole::Reviser,
        instruction: "Revise the answer to address CRITIC feedback. Output the improved answer.",
        repeat: Repeat::ExtraRounds,
    },
    CouncilStep {
        role: CouncilRole::Final,
        instruction: "Return ONLY the final user-facing answer. No role talk. Mention tools used if relevant.",
        repeat: Repeat::Once,
    },
];

/// Result of a council run.
#[derive(Debug, Clone, PartialEq)]
pub struct CouncilOutcome {
    /// Whether a non-empty answer was produced.
    pub ok: bool,
    pub text: String,
    /// Transcript in execution order, starting with TOOLS.
    pub events: Vec<DeliberationEvent>,
}

/// Parameters of one run.
#[derive(Debug, Clone, Copy)]
pub struct CouncilRequest<'a> {
    pub session_id: &'a str,
    pub message: &'a str,
    /// Provider name passed to the fallback executor (`"auto"` or an id).
    pub provider: &'a str,
    pub model: Option<&'a str>,
    pub rounds: u32,
}

/// Runs the council pipeline.
pub struct Council {
    executor: Arc<FallbackExecutor>,
    tools: ToolRouter,
    memory: Arc<dyn SessionMemory>,
    system_name: String,
    memory_window: usize,
}

impl Council {
    pub fn new(
        executor: Arc<FallbackExecutor>,
        tools: ToolRouter,
        memory: Arc<dyn SessionMemory>,
        system_name: impl Into<String>,
        memory_window: usize,
    ) -> Self {
        Self {
            executor,
            tools,
            memory,
            system_name: system_name.into(),
            memory_window,
        }
    }

    /// Run the full pipeline and persist the transcript.
    pub async fn deliberate(&self, request: CouncilRequest<'_>) -> CouncilOutcome {
        let rounds = clamp_rounds(request.rounds);
        let mut events = Vec::new();

        let routing = self.tools.route(request.message).await;
        let tools_event = match routing.failure {
            Some(ref error) => DeliberationEvent::new(CouncilRole::Tools, "Tool execution failed")
                .with_error(error.clone()),
            None => DeliberationEvent::new(CouncilRole::Tools, "Tools executed"),
        };
        events.push(tools_event.with_tools(routing.to_value()));

        let history = match self
            .memory
            .recent_messages(request.session_id, self.memory_window)
            .await
        {
            Ok(history) => history,
            Err(e) => {
                warn!("Failed to load session memory: {}", e);
                Vec::new()
            }
        };

        let context =
            CouncilContext::build(&self.system_name, &history, &routing, request.message);
        debug!(
            "Council context {} ({} rounds, {} history messages)",
            hash_prompt(context.base()),
            rounds,
            history.len()
        );

        let mut best = String::new();
        let mut final_text = String::new();

        for step in COUNCIL_PIPELINE.iter() {
            for _ in 0..step.repeat.times(rounds) {
                let prompt = context.role_prompt(step.role, step.instruction);
                let result = self
                    .executor
                    .call_named(&prompt, request.provider, request.model)
                    .await;

                let event = match result {
                    CallResult::Success {
                        provider,
                        model,
                        text,
                        ..
                    } => {
                        info!("{} answered via {} ({})", step.role, provider, model);
                        match step.role {
                            CouncilRole::Proposer => best = text.clone(),
                            CouncilRole::Reviser if !text.trim().is_empty() => {
                                best = text.clone()
                            }
                            CouncilRole::Final => final_text = text.clone(),
                            _ => {}
                        }
                        DeliberationEvent::new(step.role, text)
                            .with_source(provider.as_str(), model)
                    }
                    CallResult::Failure { error, .. } => {
                        warn!("{} failed: {}", step.role, error);
                        DeliberationEvent::new(step.role, "").with_error(error.to_string())
                    }
                };
                events.push(event);
            }
        }

        let text = match final_text.trim() {
            "" => best.trim().to_string(),
            answer => answer.to_string(),
        };

        if let Err(e) = self
            .memory
            .save_deliberation_log(request.session_id, &events)
            .await
        {
            warn!("Failed to save council log: {}", e);
        }

        CouncilOutcome {
            ok: !text.is_empty(),
            text,
            events,
        }
    }
}
