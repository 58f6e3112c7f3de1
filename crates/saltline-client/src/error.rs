//! Client error types.

use thiserror::Error;

/// Errors surfaced by the client session and transport.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Identity was empty at session creation.
    #[error("identity is empty")]
    EmptyIdentity,

    /// Identity exceeded the wire limit at session creation.
    #[error("username must be under {max} bytes, got {size}")]
    IdentityTooLarge {
        /// Identity length supplied.
        size: usize,
        /// Maximum identity length.
        max: usize,
    },

    /// Chat message rejected locally before any transmission.
    #[error("messages must be under {max} bytes, got {size}")]
    MessageTooLarge {
        /// Message length supplied.
        size: usize,
        /// Largest sendable plaintext.
        max: usize,
    },

    /// No session key yet: the handshake has not completed.
    #[error("handshake has not completed yet")]
    NotEstablished,

    /// Socket-level failure (bind, connect, send).
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),
}
