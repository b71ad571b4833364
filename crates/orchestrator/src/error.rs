//! Error types for orchestrator operations.

use arc_core::{MemoryError, ProviderError};
use arc_tools::ToolError;
use thiserror::Error;

/// Errors that can occur while assembling or running the orchestrator.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Provider setup failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Tool setup failed.
    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    /// Session memory failed.
    #[error("memory error: {0}")]
    Memory(#[from] MemoryError),
}

/// Why a fallback call produced no answer.
///
/// These are the only two failures that surface from a call; everything
/// else is recorded as an attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CallError {
    /// The requested provider is unknown or has no registered caller.
    #[error("provider not supported: {0}")]
    UnsupportedProvider(String),

    /// Every candidate was skipped or failed.
    #[error("no providers succeeded")]
    NoProvidersSucceeded,
}
