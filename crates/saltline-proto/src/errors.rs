//! Wire format error types.

use thiserror::Error;

/// Result alias for codec operations.
pub type Result<T> = std::result::Result<T, WireError>;

/// Errors produced while encoding or decoding datagrams and payloads.
///
/// Framing errors (`Truncated`, `BadSignature`, `UnknownType`) are
/// indistinguishable from network noise: callers log them and discard the
/// datagram without replying. Payload errors surface after the type byte has
/// been accepted and drive protocol-level replies on the server side.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Datagram shorter than signature plus type byte.
    #[error("datagram too short: {actual} bytes, need at least {expected}")]
    Truncated {
        /// Minimum length for a parseable datagram.
        expected: usize,
        /// Length actually received.
        actual: usize,
    },

    /// First four bytes do not match the service signature.
    #[error("signature does not match")]
    BadSignature,

    /// Type byte is not a known [`crate::MessageType`].
    #[error("unknown message type: {0}")]
    UnknownType(u8),

    /// Handshake payload smaller than a public key.
    #[error("keys must be {expected} bytes, got {actual}")]
    BadKeyLength {
        /// Required public key length.
        expected: usize,
        /// Key bytes actually present.
        actual: usize,
    },

    /// Identity trailing the handshake key exceeds the allowed size.
    #[error("identity must be under {max} bytes, got {size}")]
    IdentityTooLarge {
        /// Identity bytes actually present.
        size: usize,
        /// Maximum identity length.
        max: usize,
    },

    /// Chat payload cannot hold a nonce and an authentication tag.
    #[error("chat payload too short: {actual} bytes, need at least {expected}")]
    ChatTooShort {
        /// Minimum sealed payload length.
        expected: usize,
        /// Length actually received.
        actual: usize,
    },
}
