//! Query orchestrator for the ARC council.
//!
//! This crate provides the [`Orchestrator`] type which answers a query
//! either with a single provider call or with a multi-role council run.
//!
//! # Features
//!
//! - Sequential provider/model fallback with a full attempt trace
//! - Keyword heuristic deciding when to deliberate
//! - Keyword tool routing (weather, news, web, vision), run concurrently
//! - PROPOSER / CRITIC / REVISER / FINAL council with a persisted transcript
//!
//! # Architecture
//!
//! ```text
//! QueryRequest
//!      ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ORCHESTRATOR                           │
//! │                                                             │
//! │  1. Reject empty message                                    │
//! │         ↓                                                   │
//! │  2. Record user message (session memory)                    │
//! │         ↓                                                   │
//! │  3. Trigger heuristic (or force_council)                    │
//! │         ↓                          ↓                        │
//! │  single call                  council run:                  │
//! │  (fallback executor)          • tool router                 │
//! │                               • base context                │
//! │                               • PROPOSER → CRITIC →         │
//! │                                 REVISER × (rounds-1) →      │
//! │                                 FINAL (each via fallback)   │
//! │                               • save transcript             │
//! │         ↓                          ↓                        │
//! │  4. Record assistant reply                                  │
//! └─────────────────────────────────────────────────────────────┘
//!      ↓
//! QueryResponse
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use arc_orchestrator::{Orchestrator, QueryRequest};
//! use arc_tools::InMemoryImageSource;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let orchestrator = Orchestrator::from_env(Arc::new(InMemoryImageSource::new()))?;
//!
//!     let response = orchestrator
//!         .handle(QueryRequest::new("Do I need a permit for a storm shelter?"))
//!         .await;
//!
//!     println!("{}", response.text.unwrap_or_default());
//!     Ok(())
//! }
//! ```

mod config;
mod context;
mod council;
mod error;
mod fallback;
mod last_tried;
mod orchestrator;
mod request;
mod tool_router;
mod trigger;

pub use config::{OrchestratorConfig, OrchestratorConfigBuilder, DEFAULT_MEMORY_WINDOW, DEFAULT_ROUNDS};
pub use context::{CouncilContext, DEFAULT_SYSTEM_NAME};
pub use council::{
    clamp_rounds, Council, CouncilOutcome, CouncilRequest, CouncilStep, Repeat, COUNCIL_PIPELINE,
    MAX_ROUNDS, MIN_ROUNDS,
};
pub use error::{CallError, OrchestratorError};
pub use fallback::{
    AttemptOutcome, CallAttempt, CallResult, FailureKind, FallbackExecutor, RequestedProvider,
    SkipReason,
};
pub use last_tried::{LastTriedState, LastTriedStore};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, ProviderCandidate};
pub use request::{QueryRequest, QueryResponse, DEFAULT_SESSION};
pub use tool_router::{select_tools, ToolKind, ToolRouter, ToolRouting};
pub use trigger::{
    classify, complexity_score, should_deliberate, Trigger, COMPLEXITY_THRESHOLD, DOMAIN_PHRASES,
    TOOL_PHRASES,
};

// Re-export collaborator crates' core types for convenience
pub use arc_core::{
    CapabilityRegistry, CouncilRole, DeliberationEvent, DeliberationLog, InMemorySessionMemory,
    ProviderCaller, ProviderId, SessionMemory, StaticRegistry,
};
