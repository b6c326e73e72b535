//! Transport error mapping shared by the HTTP sources.

use quizsmith_core::error::GenerationError;

/// Map a reqwest transport failure onto the generation taxonomy.
pub(crate) fn map_transport_error(e: reqwest::Error, timeout_secs: u64) -> GenerationError {
    if e.is_timeout() {
        GenerationError::Timeout(timeout_secs)
    } else {
        GenerationError::Unreachable(e.to_string())
    }
}

/// Map a non-success HTTP status and body onto the generation taxonomy.
pub(crate) fn status_error(status: u16, body: String) -> GenerationError {
    GenerationError::Unreachable(format!("HTTP {status}: {body}"))
}
