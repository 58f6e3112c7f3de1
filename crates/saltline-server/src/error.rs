//! Server error types.

use thiserror::Error;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error (invalid bind address, etc.).
    ///
    /// Fatal at startup: fix configuration and restart.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport/network error on the bound socket.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}
