//! Cryptographic error types.

use thiserror::Error;

/// Errors from the sealed-payload layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// AEAD open failed: wrong key, wrong nonce, or tampered ciphertext.
    ///
    /// The cipher does not distinguish these cases, by construction.
    #[error("authentication failed")]
    AuthFailure,
}
