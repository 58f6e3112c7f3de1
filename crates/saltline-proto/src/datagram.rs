//! Datagram framing: signature, type byte, raw payload.
//!
//! A `Datagram` is the transport-layer unit: the 4-byte service signature,
//! one [`MessageType`] byte, and the payload bytes. It is a pure data holder;
//! typed payload parsing lives in [`crate::payloads`] so both peers can route
//! on the type byte without touching payload contents.

use bytes::{BufMut, Bytes};

use crate::{
    HEADER_SIZE, SIGNATURE,
    errors::{Result, WireError},
};

/// Single-byte message discriminant.
///
/// Values are fixed by the wire format and must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    /// Key exchange: client sends its public key and identity, the server
    /// replies with its own public key.
    Handshake = 0,

    /// Server-signaled disconnect carrying a human-readable reason.
    Disconnected = 1,

    /// Encrypted chat payload: cleartext nonce followed by ciphertext.
    Chat = 2,
}

impl MessageType {
    /// Wire value of this message type.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse a wire value. `None` if unrecognized.
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Handshake),
            1 => Some(Self::Disconnected),
            2 => Some(Self::Chat),
            _ => None,
        }
    }
}

/// Complete protocol datagram.
///
/// Layout on the wire: `[SIGNATURE: 4 bytes] + [type: 1 byte] + [payload]`.
///
/// Holds raw payload bytes, NOT a typed payload. The receive path can route
/// on `msg_type` and hand the bytes to the matching parser in
/// [`crate::payloads`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    /// Message discriminant.
    pub msg_type: MessageType,

    /// Raw payload bytes (contents depend on `msg_type` and direction).
    pub payload: Bytes,
}

impl Datagram {
    /// Create a new datagram from a type and payload bytes.
    #[must_use]
    pub fn new(msg_type: MessageType, payload: impl Into<Bytes>) -> Self {
        Self { msg_type, payload: payload.into() }
    }

    /// Total encoded length: framing plus payload.
    #[must_use]
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Encode into a buffer: signature, type byte, payload.
    pub fn encode(&self, dst: &mut impl BufMut) {
        dst.put_slice(&SIGNATURE);
        dst.put_u8(self.msg_type.to_u8());
        dst.put_slice(&self.payload);
    }

    /// Encode into a freshly allocated buffer.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut wire = Vec::with_capacity(self.encoded_len());
        self.encode(&mut wire);
        wire
    }

    /// Decode a datagram from wire bytes. Fails closed.
    ///
    /// Anything shorter than the framing, or not starting with the service
    /// signature, is classified as garbage and never reaches semantic
    /// handling. Callers log the error and discard without replying.
    ///
    /// # Errors
    ///
    /// - `WireError::Truncated` if fewer than [`HEADER_SIZE`] bytes
    /// - `WireError::BadSignature` if the prefix mismatches [`SIGNATURE`]
    /// - `WireError::UnknownType` for an unrecognized type byte
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(WireError::Truncated { expected: HEADER_SIZE, actual: bytes.len() });
        }

        if bytes[..SIGNATURE.len()] != SIGNATURE {
            return Err(WireError::BadSignature);
        }

        let type_byte = bytes[SIGNATURE.len()];
        let msg_type = MessageType::from_u8(type_byte).ok_or(WireError::UnknownType(type_byte))?;

        Ok(Self { msg_type, payload: Bytes::copy_from_slice(&bytes[HEADER_SIZE..]) })
    }
}
