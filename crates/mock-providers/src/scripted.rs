//! Scripted provider - returns queued outcomes per model and records calls.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use arc_core::{async_trait, ProviderCaller, ProviderError, ProviderId, ProviderReply};

/// One scripted outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scripted {
    /// `Ok` reply with the given text.
    Reply(String),
    /// `Ok` reply with `ok: false` (upstream rejection).
    Reject { error: String, upstream: Option<String> },
    /// `Err` from the caller (transport failure).
    Raise(String),
}

impl Scripted {
    pub fn reply(text: impl Into<String>) -> Self {
        Scripted::Reply(text.into())
    }

    pub fn reject(error: impl Into<String>) -> Self {
        Scripted::Reject {
            error: error.into(),
            upstream: None,
        }
    }

    pub fn raise(error: impl Into<String>) -> Self {
        Scripted::Raise(error.into())
    }

    fn into_result(self) -> Result<ProviderReply, ProviderError> {
        match self {
            Scripted::Reply(text) => Ok(ProviderReply::success(text)),
            Scripted::Reject { error, upstream } => Ok(ProviderReply::failure(error, upstream)),
            Scripted::Raise(error) => Err(ProviderError::Network(error)),
        }
    }
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub model: String,
    pub text: String,
}

type Handler = Box<dyn Fn(&str, &str) -> Scripted + Send + Sync>;

/// A provider whose outcomes are fixed up front.
///
/// Outcomes are looked up in this order: the queue for the called model,
/// then the handler (if any), then the default outcome.
///
/// ```rust
/// use arc_core::ProviderId;
/// use mock_providers::{Scripted, ScriptedProvider};
///
/// let provider = ScriptedProvider::new(ProviderId::Groq)
///     .on_model("small", Scripted::reject("429 rate limited"))
///     .on_model("large", Scripted::reply("hello"));
/// ```
pub struct ScriptedProvider {
    provider: ProviderId,
    queues: Mutex<HashMap<String, VecDeque<Scripted>>>,
    handler: Option<Handler>,
    default: Scripted,
    calls: Mutex<Vec<RecordedCall>>,
}

/// Lock a mutex, recovering the data if a panicking test poisoned it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedProvider {
    /// A provider that rejects every call until scripted otherwise.
    pub fn new(provider: ProviderId) -> Self {
        Self {
            provider,
            queues: Mutex::new(HashMap::new()),
            handler: None,
            default: Scripted::reject("unscripted call"),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A provider that answers every call with `text`.
    pub fn always(provider: ProviderId, text: impl Into<String>) -> Self {
        Self::new(provider).otherwise(Scripted::reply(text))
    }

    /// A provider that raises on every call.
    pub fn always_raising(provider: ProviderId, error: impl Into<String>) -> Self {
        Self::new(provider).otherwise(Scripted::raise(error))
    }

    /// Queue an outcome for the next call to `model`.
    pub fn on_model(self, model: impl Into<String>, outcome: Scripted) -> Self {
        lock(&self.queues)
            .entry(model.into())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Compute outcomes from `(prompt, model)` when no queued outcome applies.
    pub fn with_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &str) -> Scripted + Send + Sync + 'static,
    {
        self.handler = Some(Box::new(handler));
        self
    }

    /// Outcome used when nothing else applies.
    pub fn otherwise(mut self, outcome: Scripted) -> Self {
        self.default = outcome;
        self
    }

    /// Calls received so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls received so far.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Models called so far, in order.
    pub fn models_called(&self) -> Vec<String> {
        lock(&self.calls).iter().map(|c| c.model.clone()).collect()
    }
}

#[async_trait]
impl ProviderCaller for ScriptedProvider {
    fn provider(&self) -> ProviderId {
        self.provider
    }

    async fn call(&self, text: &str, model: &str) -> Result<ProviderReply, ProviderError> {
        lock(&self.calls).push(RecordedCall {
            model: model.to_string(),
            text: text.to_string(),
        });

        let queued = lock(&self.queues)
            .get_mut(model)
            .and_then(|queue| queue.pop_front());

        let outcome = match (queued, &self.handler) {
            (Some(outcome), _) => outcome,
            (None, Some(handler)) => handler(text, model),
            (None, None) => self.default.clone(),
        };

        outcome.into_result()
    }
}
