//! Error types shared by providers and session stores.

use thiserror::Error;

/// Errors a provider caller can raise instead of returning a reply.
///
/// A raised error is a transport-level failure. Upstream API errors (bad
/// status, quota, unknown model) are reported through a failed
/// [`ProviderReply`](crate::ProviderReply) instead.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The caller is misconfigured (missing key, bad URL).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request could not be sent or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The upstream answered with something that could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The call exceeded its deadline.
    #[error("request timed out")]
    Timeout,
}

/// Errors raised by a session memory backend.
#[derive(Debug, Error)]
pub enum MemoryError {
    /// The backing store is not reachable.
    #[error("memory store unavailable: {0}")]
    Unavailable(String),

    /// A read or write against the store failed.
    #[error("memory operation failed: {0}")]
    Operation(String),
}
