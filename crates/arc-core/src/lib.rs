//! Core traits and types for the ARC council orchestrator.
//!
//! This crate provides the shared interface between the orchestrator and
//! its collaborators. It defines:
//!
//! - [`ProviderId`] - The fixed set of LLM providers, in priority order
//! - [`ProviderCaller`] / [`ProviderReply`] - The uniform per-provider call seam
//! - [`CapabilityRegistry`] - Credential presence and candidate models per provider
//! - [`SessionMemory`] - Per-session chat history and deliberation logs
//! - [`DeliberationEvent`] / [`CouncilRole`] - The council transcript types
//!
//! # Example
//!
//! ```rust
//! use arc_core::{async_trait, ProviderCaller, ProviderError, ProviderId, ProviderReply};
//!
//! struct Canned;
//!
//! #[async_trait]
//! impl ProviderCaller for Canned {
//!     fn provider(&self) -> ProviderId {
//!         ProviderId::OpenAi
//!     }
//!
//!     async fn call(&self, text: &str, model: &str) -> Result<ProviderReply, ProviderError> {
//!         Ok(ProviderReply::success(format!("{model}: {text}")))
//!     }
//! }
//! ```

mod error;
mod events;
mod prompt;
mod provider;
mod registry;
mod session;

pub use error::{MemoryError, ProviderError};
pub use events::{CouncilRole, DeliberationEvent, DeliberationLog};
pub use prompt::hash_prompt;
pub use provider::{ProviderCaller, ProviderId, ProviderReply, UnknownProvider};
pub use registry::{CapabilityRegistry, StaticRegistry};
pub use session::{InMemorySessionMemory, MessageRole, SessionMemory, SessionMessage};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
