use std::io;

use thiserror::Error;

/// Errors surfaced by the server to its embedder.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Could not bind the listening socket
    #[error("failed to bind {address}: {source}")]
    Bind { address: String, source: io::Error },

    /// The readiness poller failed
    #[error("poll failed: {0}")]
    Poll(#[source] io::Error),

    /// Other I/O errors (registration, accept, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// The peer on the other end of a session went away.
///
/// Send and receive paths return this so callers can tell a dead peer apart
/// from other failures. The session itself is reaped on the next polling
/// cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("connection lost")]
pub struct ConnectionLost;

/// Result type alias for server operations
pub type ServerResult<T> = Result<T, ServerError>;
