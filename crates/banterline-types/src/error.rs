use thiserror::Error;

/// Errors from the generative-model adapter.
///
/// Every variant is recovered inside the context assembler and
/// converted into the persona's fixed fallback reply; none of them
/// surface to the transport.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("request error: {0}")]
    Request(String),

    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited")]
    RateLimited,

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("model returned no content")]
    Empty,

    #[error("model call timed out")]
    Timeout,
}

/// Errors from a conversation store backend.
///
/// The in-process backend never produces these; the persistent backend
/// degrades them through the same fallback path as an adapter failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),
}

/// Failure to attach a reaction symbol to a message.
///
/// Swallowed silently by the caller: a missing reaction has no
/// user-visible effect.
#[derive(Debug, Error)]
pub enum ReactionError {
    #[error("reaction denied: {0}")]
    Denied(String),

    #[error("transport error: {0}")]
    Transport(String),
}

/// Failure to apply a sanitized display name downstream.
///
/// Recovered locally with a fixed apologetic message.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("sanitized display name is empty")]
    EmptyName,

    #[error("edit denied: {0}")]
    Denied(String),
}
