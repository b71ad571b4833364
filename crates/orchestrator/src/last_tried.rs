//! Diagnostic slot recording the most recent provider call.

use std::sync::{Mutex, MutexGuard};

use arc_core::ProviderId;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// The most recent provider call, as seen by any request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastTriedState {
    /// Call start, milliseconds since the Unix epoch.
    pub ts: i64,
    pub provider: ProviderId,
    pub model: String,
    /// Set once the call has failed.
    pub error: Option<String>,
}

/// Single-slot, last-write-wins store for [`LastTriedState`].
///
/// Shared by all requests. The lock is held only for the copy in or out,
/// never across a provider call.
#[derive(Debug, Default)]
pub struct LastTriedStore {
    slot: Mutex<Option<LastTriedState>>,
}

impl LastTriedStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<LastTriedState>> {
        // The slot holds plain data; a poisoned lock still has a usable value.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record that a call to `provider`/`model` is starting.
    ///
    /// Returns the recorded state so the caller can later attach an error.
    pub fn begin(&self, provider: ProviderId, model: &str) -> LastTriedState {
        let state = LastTriedState {
            ts: Utc::now().timestamp_millis(),
            provider,
            model: model.to_string(),
            error: None,
        };
        *self.lock() = Some(state.clone());
        state
    }

    /// Attach an error to the call started by `started`.
    ///
    /// Does nothing when another call has been recorded since.
    pub fn fail(&self, started: &LastTriedState, error: &str) {
        let mut slot = self.lock();
        if let Some(current) = slot.as_mut() {
            if current.ts == started.ts
                && current.provider == started.provider
                && current.model == started.model
            {
                current.error = Some(error.to_string());
            }
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> Option<LastTriedState> {
        self.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_by_default() {
        assert!(LastTriedStore::new().snapshot().is_none());
    }

    #[test]
    fn test_begin_then_fail() {
        let store = LastTriedStore::new();
        let started = store.begin(ProviderId::Groq, "llama-3.1-8b-instant");

        let state = store.snapshot().unwrap();
        assert_eq!(state.provider, ProviderId::Groq);
        assert!(state.error.is_none());

        store.fail(&started, "429 rate limited");
        assert_eq!(
            store.snapshot().unwrap().error.as_deref(),
            Some("429 rate limited")
        );
    }

    #[test]
    fn test_last_write_wins() {
        let store = LastTriedStore::new();
        let first = store.begin(ProviderId::OpenAi, "gpt-4o-mini");
        store.begin(ProviderId::Gemini, "gemini-1.5-flash");

        // A late failure of the first call must not clobber the newer entry.
        store.fail(&first, "timeout");

        let state = store.snapshot().unwrap();
        assert_eq!(state.provider, ProviderId::Gemini);
        assert!(state.error.is_none());
    }
}
