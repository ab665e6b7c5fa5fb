//! Error taxonomy shared by the dispatcher, session, and worker.
//!
//! Every variant is reported to the client as an `error` event; none of them
//! is fatal to the connection. Cooperative cancellation is deliberately not
//! represented here: a stopped run is an outcome, not a failure.

use thiserror::Error;

/// Result alias used across the session layer.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Failures surfaced to the client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Malformed frame: both or neither of request/command, unknown command
    /// keyword, undecodable payload.
    #[error("{0}")]
    Protocol(String),

    /// Well-formed request or command that is not acceptable right now:
    /// bad step count, bad domain, missing seeds, wrong session state.
    #[error("{0}")]
    Validation(String),

    /// Unknown algorithm, objective function, or request type.
    #[error("{0}")]
    Algorithm(String),

    /// Unexpected failure inside a worker step.
    #[error("{0}")]
    Runtime(String),
}

impl SessionError {
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn algorithm(msg: impl Into<String>) -> Self {
        Self::Algorithm(msg.into())
    }

    pub fn runtime(msg: impl Into<String>) -> Self {
        Self::Runtime(msg.into())
    }

    /// Short label for the error class, used in process logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Protocol(_) => "protocol",
            Self::Validation(_) => "validation",
            Self::Algorithm(_) => "algorithm",
            Self::Runtime(_) => "runtime",
        }
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(e: serde_json::Error) -> Self {
        Self::Protocol(format!("malformed frame: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_message() {
        let err = SessionError::protocol("Wrong command");
        assert_eq!(err.to_string(), "Wrong command");
        assert_eq!(err.kind(), "protocol");
    }

    #[test]
    fn test_json_error_maps_to_protocol() {
        let err: SessionError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, SessionError::Protocol(_)));
        assert!(err.to_string().starts_with("malformed frame"));
    }
}
