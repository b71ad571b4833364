//! Mock provider and tool implementations for ARC orchestrator tests.
//!
//! This crate provides deterministic stand-ins for the `ProviderCaller` and
//! `Tool` seams:
//! - `EchoProvider` - Answers with the prompt it was given
//! - `ScriptedProvider` - Queued or computed outcomes per model, with call recording
//! - `StaticTool`, `ErrorTool`, `PanickingTool` - Tool stubs
//!
//! For real upstreams, use the `arc-providers` and `arc-tools` crates instead.
//!
//! # Example
//!
//! ```rust
//! use mock_providers::{EchoProvider, ProviderCaller, ProviderId};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_providers::ProviderError> {
//!     let provider = EchoProvider::new(ProviderId::Groq);
//!
//!     let reply = provider.call("Hello!", "llama-3.1-8b-instant").await?;
//!     println!("Response: {}", reply.text);
//!     Ok(())
//! }
//! ```

mod echo;
mod scripted;
mod tools;

// Re-export arc-core types for convenience
pub use arc_core::{async_trait, ProviderCaller, ProviderError, ProviderId, ProviderReply};

pub use echo::EchoProvider;
pub use scripted::{RecordedCall, Scripted, ScriptedProvider};
pub use tools::{ErrorTool, PanickingTool, StaticTool};
