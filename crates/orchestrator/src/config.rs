//! Orchestrator configuration.

use std::env;

use crate::context::DEFAULT_SYSTEM_NAME;
use crate::council::clamp_rounds;

/// Default number of history messages fed to the council.
pub const DEFAULT_MEMORY_WINDOW: usize = 12;

/// Default council round count.
pub const DEFAULT_ROUNDS: u32 = 2;

/// Orchestrator settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Name used in the council context header.
    pub system_name: String,
    /// Recent messages included in the council context.
    pub memory_window: usize,
    /// Rounds used when a request does not choose.
    pub default_rounds: u32,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            system_name: DEFAULT_SYSTEM_NAME.to_string(),
            memory_window: DEFAULT_MEMORY_WINDOW,
            default_rounds: DEFAULT_ROUNDS,
        }
    }
}

impl OrchestratorConfig {
    /// Create configuration from environment variables.
    ///
    /// - `ARC_SYSTEM_NAME` - Context header name (default: ARC-OMEGA Council)
    /// - `ARC_MEMORY_WINDOW` - History messages per council run (default: 12)
    /// - `ARC_COUNCIL_ROUNDS` - Default rounds, 1 to 3 (default: 2)
    ///
    /// Unparseable numbers fall back to the defaults.
    pub fn from_env() -> Self {
        let mut builder = Self::builder();

        if let Ok(name) = env::var("ARC_SYSTEM_NAME") {
            if !name.trim().is_empty() {
                builder = builder.system_name(name.trim());
            }
        }

        if let Some(window) = env::var("ARC_MEMORY_WINDOW")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            builder = builder.memory_window(window);
        }

        if let Some(rounds) = env::var("ARC_COUNCIL_ROUNDS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
        {
            builder = builder.default_rounds(rounds);
        }

        builder.build()
    }

    pub fn builder() -> OrchestratorConfigBuilder {
        OrchestratorConfigBuilder::default()
    }
}

/// Builder for [`OrchestratorConfig`].
#[derive(Debug, Default)]
pub struct OrchestratorConfigBuilder {
    system_name: Option<String>,
    memory_window: Option<usize>,
    default_rounds: Option<u32>,
}

impl OrchestratorConfigBuilder {
    pub fn system_name(mut self, name: impl Into<String>) -> Self {
        self.system_name = Some(name.into());
        self
    }

    pub fn memory_window(mut self, window: usize) -> Self {
        self.memory_window = Some(window);
        self
    }

    /// Clamped to the supported range on build.
    pub fn default_rounds(mut self, rounds: u32) -> Self {
        self.default_rounds = Some(rounds);
        self
    }

    pub fn build(self) -> OrchestratorConfig {
        let defaults = OrchestratorConfig::default();
        OrchestratorConfig {
            system_name: self.system_name.unwrap_or(defaults.system_name),
            memory_window: self.memory_window.unwrap_or(defaults.memory_window),
            default_rounds: clamp_rounds(self.default_rounds.unwrap_or(defaults.default_rounds)),
        }
    }
}
