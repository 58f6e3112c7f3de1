//! Saltline Cryptographic Primitives
//!
//! Cryptographic building blocks for Saltline sessions: X25519 key
//! agreement, HKDF session-key derivation, and XChaCha20-Poly1305
//! authenticated encryption.
//!
//! # Key Lifecycle
//!
//! Each peer pair shares one session key for the lifetime of the handshake.
//! The client generates a fresh ephemeral key pair per handshake attempt;
//! the server holds one long-lived pair reused across all peers. Both ends
//! derive the identical session key from their own private half and the
//! peer's public half - the key itself never travels.
//!
//! ```text
//! X25519 Key Agreement
//!        │
//!        ▼
//! HKDF-SHA256 → Session Key (per peer pair)
//!        │
//!        ▼
//! XChaCha20-Poly1305 AEAD → Ciphertext
//! ```
//!
//! # Security
//!
//! Authenticity:
//! - XChaCha20-Poly1305 AEAD provides tamper-proof encryption
//! - Failed authentication tag -> reject message
//!
//! Nonce discipline:
//! - 24-byte nonces drawn fresh from the OS CSPRNG per sealed payload
//! - The nonce travels in clear next to the ciphertext; the caller is
//!   responsible for transmitting it
//! - Reuse under the same key is a confidentiality break and is prevented
//!   only by random generation, not tracked state
//!
//! Key hygiene:
//! - Session keys and private halves are zeroized on drop
//! - Re-keying happens by running the handshake again; there is no ratchet
//!   and no forward secrecy within a session

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod keys;
pub mod seal;

pub use error::CryptoError;
pub use keys::{KEY_SIZE, KeyPair, SessionKey};
pub use seal::{NONCE_SIZE, TAG_SIZE, generate_nonce, open, seal};
