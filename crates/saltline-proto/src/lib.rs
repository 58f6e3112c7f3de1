//! Saltline wire format.
//!
//! Every datagram on the wire is `signature || type || payload`: a fixed
//! 4-byte service signature, a single-byte [`MessageType`], and a variable
//! payload. There is no length prefix - one UDP datagram carries exactly one
//! message, so framing relies on transport record boundaries.
//!
//! The signature is a cheap filter that lets both peers drop random or
//! garbage traffic at the codec boundary without further parsing. It is not
//! a security boundary; authenticity comes from the AEAD layer above.
//!
//! # Invariants
//!
//! - Every encoded datagram begins with [`SIGNATURE`] followed by a known
//!   type byte. [`Datagram::decode`] rejects anything else before semantic
//!   handling sees it.
//! - Round-trip encoding must produce identical values.

pub mod datagram;
pub mod errors;
pub mod payloads;

pub use datagram::{Datagram, MessageType};
pub use errors::WireError;

/// Service signature prefixing every valid datagram.
///
/// Datagrams whose first four bytes differ are discarded without parsing.
pub const SIGNATURE: [u8; 4] = [1, 2, 3, 4];

/// Bytes of framing before the payload: signature plus the type byte.
pub const HEADER_SIZE: usize = SIGNATURE.len() + 1;

/// Transport maximum for one datagram (508 bytes).
///
/// Chosen to avoid IP/UDP fragmentation on common links; both peers size
/// their receive buffers from it.
pub const MAX_DATAGRAM_SIZE: usize = 508;

/// X25519 public key length carried in handshake payloads.
pub const KEY_SIZE: usize = 32;

/// XChaCha20 nonce length transmitted in clear before chat ciphertext.
pub const NONCE_SIZE: usize = 24;

/// Poly1305 authentication tag appended to every ciphertext.
pub const TAG_SIZE: usize = 16;

/// Maximum identity length in bytes (UTF-8).
pub const MAX_IDENTITY_SIZE: usize = 20;

/// Separator the server inserts between identity and message on broadcast.
pub const IDENTITY_SEPARATOR: &str = ": ";

/// Largest chat plaintext a client may submit.
///
/// `MAX_DATAGRAM_SIZE` minus the nonce, the AEAD tag, the worst-case
/// identity prefix, and the separator between identity and message.
pub const MAX_MESSAGE_SIZE: usize =
    MAX_DATAGRAM_SIZE - (NONCE_SIZE + TAG_SIZE + MAX_IDENTITY_SIZE + IDENTITY_SEPARATOR.len());
