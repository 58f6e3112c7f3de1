//! Typed payload views over raw datagram bytes.
//!
//! Payloads are plain byte layouts, not a self-describing encoding: the
//! type byte in the framing plus the direction of travel determine how the
//! remainder is parsed. A handshake from client to server carries a public
//! key and an identity; the reply carries a bare public key. Identities and
//! disconnect reasons are "remainder of payload" with no length prefix.

use bytes::Bytes;

use crate::{
    Datagram, KEY_SIZE, MAX_IDENTITY_SIZE, MessageType, NONCE_SIZE, TAG_SIZE,
    errors::{Result, WireError},
};

/// Client-to-server handshake: `public_key(32) || identity(0..=20, UTF-8)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRequest {
    /// Client's fresh ephemeral public key.
    pub public_key: [u8; KEY_SIZE],

    /// Display identity, the remainder of the payload.
    ///
    /// Decoded lossily: a peer that sends invalid UTF-8 gets replacement
    /// characters rather than a rejected handshake.
    pub identity: String,
}

impl HandshakeRequest {
    /// Encode as `public_key || identity`.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut payload = Vec::with_capacity(KEY_SIZE + self.identity.len());
        payload.extend_from_slice(&self.public_key);
        payload.extend_from_slice(self.identity.as_bytes());
        payload.into()
    }

    /// Parse a client handshake payload.
    ///
    /// # Errors
    ///
    /// - `WireError::BadKeyLength` if fewer than [`KEY_SIZE`] bytes
    /// - `WireError::IdentityTooLarge` if the identity remainder exceeds
    ///   [`MAX_IDENTITY_SIZE`]
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() < KEY_SIZE {
            return Err(WireError::BadKeyLength { expected: KEY_SIZE, actual: payload.len() });
        }

        let identity_bytes = &payload[KEY_SIZE..];
        if identity_bytes.len() > MAX_IDENTITY_SIZE {
            return Err(WireError::IdentityTooLarge {
                size: identity_bytes.len(),
                max: MAX_IDENTITY_SIZE,
            });
        }

        let mut public_key = [0u8; KEY_SIZE];
        public_key.copy_from_slice(&payload[..KEY_SIZE]);

        Ok(Self { public_key, identity: String::from_utf8_lossy(identity_bytes).into_owned() })
    }

    /// Wrap into a [`MessageType::Handshake`] datagram.
    #[must_use]
    pub fn to_datagram(&self) -> Datagram {
        Datagram::new(MessageType::Handshake, self.encode())
    }
}

/// Server-to-client handshake reply: `public_key(32)` only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandshakeReply {
    /// Server's long-lived public key.
    pub public_key: [u8; KEY_SIZE],
}

impl HandshakeReply {
    /// Parse a handshake reply payload.
    ///
    /// # Errors
    ///
    /// - `WireError::BadKeyLength` unless the payload is exactly
    ///   [`KEY_SIZE`] bytes
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() != KEY_SIZE {
            return Err(WireError::BadKeyLength { expected: KEY_SIZE, actual: payload.len() });
        }

        let mut public_key = [0u8; KEY_SIZE];
        public_key.copy_from_slice(payload);

        Ok(Self { public_key })
    }

    /// Wrap into a [`MessageType::Handshake`] datagram.
    #[must_use]
    pub fn to_datagram(&self) -> Datagram {
        Datagram::new(MessageType::Handshake, self.public_key.to_vec())
    }
}

/// Disconnect signal: the whole payload is a human-readable reason.
///
/// Unauthenticated on the wire; useful for an interactive interface or for
/// debugging, never as a trust decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disconnect {
    /// Why the peer was disconnected.
    pub reason: String,
}

impl Disconnect {
    /// Create a disconnect with the given reason.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    /// Parse a disconnect payload. Never fails: the reason is decoded
    /// lossily since it is only ever logged or displayed.
    #[must_use]
    pub fn decode(payload: &[u8]) -> Self {
        Self { reason: String::from_utf8_lossy(payload).into_owned() }
    }

    /// Wrap into a [`MessageType::Disconnected`] datagram.
    #[must_use]
    pub fn to_datagram(&self) -> Datagram {
        Datagram::new(MessageType::Disconnected, self.reason.clone().into_bytes())
    }
}

/// Sealed chat payload: `nonce(24) || ciphertext(plaintext + 16-byte tag)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPayload {
    /// Cleartext nonce the message was sealed under.
    pub nonce: [u8; NONCE_SIZE],

    /// AEAD ciphertext including the authentication tag.
    pub ciphertext: Vec<u8>,
}

impl ChatPayload {
    /// Encode as `nonce || ciphertext`.
    #[must_use]
    pub fn encode(&self) -> Bytes {
        let mut payload = Vec::with_capacity(NONCE_SIZE + self.ciphertext.len());
        payload.extend_from_slice(&self.nonce);
        payload.extend_from_slice(&self.ciphertext);
        payload.into()
    }

    /// Parse a sealed chat payload.
    ///
    /// # Errors
    ///
    /// - `WireError::ChatTooShort` if the payload cannot hold a nonce and an
    ///   authentication tag
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() < NONCE_SIZE + TAG_SIZE {
            return Err(WireError::ChatTooShort {
                expected: NONCE_SIZE + TAG_SIZE,
                actual: payload.len(),
            });
        }

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(&payload[..NONCE_SIZE]);

        Ok(Self { nonce, ciphertext: payload[NONCE_SIZE..].to_vec() })
    }

    /// Wrap into a [`MessageType::Chat`] datagram.
    #[must_use]
    pub fn to_datagram(&self) -> Datagram {
        Datagram::new(MessageType::Chat, self.encode())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::HEADER_SIZE;

    proptest! {
        #[test]
        fn handshake_request_round_trip(
            public_key in any::<[u8; KEY_SIZE]>(),
            identity in "[a-z]{1,20}",
        ) {
            let request = HandshakeRequest { public_key, identity: identity.clone() };
            let parsed = HandshakeRequest::decode(&request.encode()).expect("should decode");
            prop_assert_eq!(request, parsed);
        }

        #[test]
        fn handshake_datagram_size(
            public_key in any::<[u8; KEY_SIZE]>(),
            identity in "[a-z]{1,20}",
        ) {
            // signature(4) + type(1) + key(32) + identity
            let request = HandshakeRequest { public_key, identity: identity.clone() };
            let expected = HEADER_SIZE + KEY_SIZE + identity.len();
            prop_assert_eq!(request.to_datagram().to_vec().len(), expected);
        }

        #[test]
        fn chat_payload_round_trip(
            nonce in any::<[u8; NONCE_SIZE]>(),
            ciphertext in prop::collection::vec(any::<u8>(), TAG_SIZE..128),
        ) {
            let chat = ChatPayload { nonce, ciphertext };
            let parsed = ChatPayload::decode(&chat.encode()).expect("should decode");
            prop_assert_eq!(chat, parsed);
        }
    }

    #[test]
    fn handshake_request_rejects_short_key() {
        let result = HandshakeRequest::decode(&[0u8; KEY_SIZE - 1]);
        assert_eq!(result, Err(WireError::BadKeyLength { expected: KEY_SIZE, actual: 31 }));
    }

    #[test]
    fn handshake_request_rejects_oversized_identity() {
        let payload = vec![0u8; KEY_SIZE + MAX_IDENTITY_SIZE + 1];
        let result = HandshakeRequest::decode(&payload);
        assert_eq!(result, Err(WireError::IdentityTooLarge { size: 21, max: MAX_IDENTITY_SIZE }));
    }

    #[test]
    fn handshake_request_allows_empty_identity() {
        // The wire permits it; the client refuses to start with one.
        let parsed = HandshakeRequest::decode(&[7u8; KEY_SIZE]).unwrap();
        assert_eq!(parsed.identity, "");
        assert_eq!(parsed.public_key, [7u8; KEY_SIZE]);
    }

    #[test]
    fn handshake_reply_requires_exact_key() {
        assert!(HandshakeReply::decode(&[0u8; KEY_SIZE]).is_ok());
        assert!(HandshakeReply::decode(&[0u8; KEY_SIZE - 1]).is_err());
        assert!(HandshakeReply::decode(&[0u8; KEY_SIZE + 1]).is_err());
    }

    #[test]
    fn disconnect_reason_round_trip() {
        let disconnect = Disconnect::new("not registered...");
        let datagram = disconnect.to_datagram();
        assert_eq!(datagram.msg_type, MessageType::Disconnected);

        let parsed = Disconnect::decode(&datagram.payload);
        assert_eq!(parsed.reason, "not registered...");
    }

    #[test]
    fn disconnect_tolerates_invalid_utf8() {
        let parsed = Disconnect::decode(&[0xFF, 0xFE]);
        assert!(!parsed.reason.is_empty());
    }

    #[test]
    fn chat_payload_rejects_missing_tag() {
        let result = ChatPayload::decode(&[0u8; NONCE_SIZE + TAG_SIZE - 1]);
        assert_eq!(
            result,
            Err(WireError::ChatTooShort { expected: NONCE_SIZE + TAG_SIZE, actual: 39 })
        );
    }
}
