//! Error taxonomy for the quiz core.
//!
//! `GenerationError` lives here so the block generator can classify source
//! failures for its retry decisions without string matching. Only
//! `SessionError` ever crosses the service boundary to a caller.

use thiserror::Error;

/// Failures from a question source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The generation service could not be reached or refused the request.
    #[error("generation service unreachable: {0}")]
    Unreachable(String),

    /// The service responded, but the payload could not be parsed as a
    /// candidate batch after stripping delimiter markup.
    #[error("malformed generation output: {0}")]
    MalformedOutput(String),

    /// The request timed out.
    #[error("generation request timed out after {0}s")]
    Timeout(u64),
}

/// Errors surfaced across the session boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Bad start parameters; no session was created.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Caller protocol violation: answering without a served question, or
    /// submitting twice for the same index. Session state is unchanged.
    #[error("operation out of sequence: {0}")]
    OutOfSequence(String),

    /// No session exists under the given identity.
    #[error("unknown session: {0}")]
    UnknownSession(uuid::Uuid),
}
