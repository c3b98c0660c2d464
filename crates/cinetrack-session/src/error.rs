//! Error taxonomy for the session-aware request client
//!
//! Only `AuthUnrecoverable` carries a global side effect (credentials
//! cleared, invalidation event emitted); every other kind is returned to
//! the caller for page-level handling. A 401 that is healed by a
//! successful refresh-and-retry never surfaces here at all.
//!
//! The enum derives `Clone` because the outcome of the single in-flight
//! refresh operation is fanned out to every caller waiting on it through
//! a shared future.

/// Errors from session and request operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The request never reached the backend or no response was received.
    #[error("network error: {0}")]
    Network(String),

    /// No valid credential can be obtained without re-authenticating.
    /// Stored credentials have been cleared by the time this is returned.
    #[error("authentication required: {0}")]
    AuthUnrecoverable(String),

    /// Non-401 4xx/5xx, propagated verbatim for page-level handling.
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    /// Invalid or missing caller input, rejected before network dispatch.
    #[error("invalid request: {0}")]
    Validation(String),

    /// A success response carried a body that failed to decode.
    #[error("response decode error: {0}")]
    Decode(String),

    /// The credential store failed to read or persist.
    #[error("storage error: {0}")]
    Storage(String),
}

/// Result alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_and_body() {
        let err = Error::Server {
            status: 503,
            body: "maintenance".into(),
        };
        assert_eq!(err.to_string(), "server returned 503: maintenance");
    }

    #[test]
    fn errors_are_cloneable_for_shared_refresh_fanout() {
        let err = Error::AuthUnrecoverable("refresh rejected".into());
        let cloned = err.clone();
        assert_eq!(err.to_string(), cloned.to_string());
    }
}
