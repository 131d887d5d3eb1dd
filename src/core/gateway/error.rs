//! Gateway error types.

use thiserror::Error;

/// Faults in accepting a client message. Each one affects a single session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The message did not name a session.
    #[error("session_id is required")]
    MissingSessionId,

    /// The session id is not well formed.
    #[error("Invalid session ID")]
    InvalidSessionId,

    /// No live session has this id.
    #[error("Could not find session")]
    SessionNotFound,

    /// The body is not a JSON-RPC message. The session has been closed.
    #[error("Could not parse message: {0}")]
    Malformed(String),
}

/// Writing to a session whose stream is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("session closed")]
pub struct SessionClosed;
