//! Client session state machine.
//!
//! Sans-IO core for one outbound session: handshake initiation, key
//! completion, chat seal/open, and automatic re-handshake on a
//! server-signaled disconnect. The transport layer feeds received bytes in
//! through [`ClientSession::handle_datagram`] and executes the returned
//! actions; nothing here touches a socket.
//!
//! States: `Idle → AwaitingReply → Established`, re-entering
//! `AwaitingReply` from any state when the server signals `Disconnected`.
//! Every (re-)handshake generates a fresh ephemeral key pair and discards
//! the previous one.

use saltline_crypto::{KeyPair, SessionKey, generate_nonce, open, seal};
use saltline_proto::{
    Datagram, MAX_IDENTITY_SIZE, MAX_MESSAGE_SIZE, MessageType,
    payloads::{ChatPayload, Disconnect, HandshakeRequest, HandshakeReply},
};

use crate::error::ClientError;

/// What the transport must do after the session handled a datagram.
#[derive(Debug)]
pub enum ClientAction {
    /// Transmit a datagram to the server.
    Send(Datagram),

    /// A decrypted chat line ready for display.
    Deliver(String),
}

/// Handshake progress for this session.
enum SessionState {
    /// No handshake attempted yet.
    Idle,

    /// Handshake sent; retaining the ephemeral private half until the
    /// server's public key arrives.
    AwaitingReply {
        /// Ephemeral pair generated for the outstanding handshake.
        pending: KeyPair,
    },

    /// Shared session key in place; chat flows both ways.
    Established {
        /// Precomputed session key.
        key: SessionKey,
    },
}

/// One outbound client session.
pub struct ClientSession {
    identity: String,
    state: SessionState,
}

impl ClientSession {
    /// Create a session for the given display identity.
    ///
    /// # Errors
    ///
    /// - `ClientError::EmptyIdentity` if the identity is empty
    /// - `ClientError::IdentityTooLarge` if it exceeds the wire limit
    pub fn new(identity: impl Into<String>) -> Result<Self, ClientError> {
        let identity = identity.into();

        if identity.is_empty() {
            return Err(ClientError::EmptyIdentity);
        }
        if identity.len() > MAX_IDENTITY_SIZE {
            return Err(ClientError::IdentityTooLarge {
                size: identity.len(),
                max: MAX_IDENTITY_SIZE,
            });
        }

        Ok(Self { identity, state: SessionState::Idle })
    }

    /// Display identity this session registered with.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Whether the handshake has completed and chat can flow.
    pub fn is_established(&self) -> bool {
        matches!(self.state, SessionState::Established { .. })
    }

    /// Start (or restart) the handshake.
    ///
    /// Generates a fresh ephemeral key pair, discarding any previous key
    /// material, and returns the handshake datagram to transmit. May be
    /// called repeatedly; each call invalidates the prior attempt.
    pub fn handshake(&mut self) -> Datagram {
        let pending = KeyPair::generate();
        let request =
            HandshakeRequest { public_key: pending.public_key(), identity: self.identity.clone() };

        self.state = SessionState::AwaitingReply { pending };
        request.to_datagram()
    }

    /// Seal a chat message for transmission.
    ///
    /// # Errors
    ///
    /// - `ClientError::MessageTooLarge` if the message exceeds
    ///   [`MAX_MESSAGE_SIZE`]; rejected before anything is sealed or sent
    /// - `ClientError::NotEstablished` if no handshake has completed
    pub fn send_chat(&self, message: &str) -> Result<Datagram, ClientError> {
        if message.len() > MAX_MESSAGE_SIZE {
            return Err(ClientError::MessageTooLarge {
                size: message.len(),
                max: MAX_MESSAGE_SIZE,
            });
        }

        let SessionState::Established { key } = &self.state else {
            return Err(ClientError::NotEstablished);
        };

        let nonce = generate_nonce();
        let ciphertext = seal(key, &nonce, message.as_bytes());

        Ok(ChatPayload { nonce, ciphertext }.to_datagram())
    }

    /// Process one received datagram and return the resulting actions.
    ///
    /// Framing failures and unknown types are logged and dropped; they
    /// cause no state change and no reply.
    pub fn handle_datagram(&mut self, bytes: &[u8]) -> Vec<ClientAction> {
        let datagram = match Datagram::decode(bytes) {
            Ok(datagram) => datagram,
            Err(err) => {
                tracing::warn!("discarding datagram: {err}");
                return Vec::new();
            },
        };

        match datagram.msg_type {
            MessageType::Handshake => {
                self.handle_handshake_reply(&datagram.payload);
                Vec::new()
            },
            MessageType::Disconnected => {
                let disconnect = Disconnect::decode(&datagram.payload);
                tracing::warn!("server disconnected us: {}", disconnect.reason);
                vec![ClientAction::Send(self.handshake())]
            },
            MessageType::Chat => {
                self.handle_chat(&datagram.payload).map(ClientAction::Deliver).into_iter().collect()
            },
        }
    }

    /// Complete the handshake by precomputing the received key.
    fn handle_handshake_reply(&mut self, payload: &[u8]) {
        let reply = match HandshakeReply::decode(payload) {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!("handshake failed due to key size: {err}");
                return;
            },
        };

        match &self.state {
            SessionState::AwaitingReply { pending } => {
                let key = pending.precompute(&reply.public_key);
                self.state = SessionState::Established { key };
                tracing::info!("handshake completed");
            },
            SessionState::Idle | SessionState::Established { .. } => {
                tracing::warn!("ignoring unsolicited handshake reply");
            },
        }
    }

    /// Open a received chat payload. `None` when the message is dropped.
    fn handle_chat(&self, payload: &[u8]) -> Option<String> {
        let SessionState::Established { key } = &self.state else {
            // No key to open with yet.
            tracing::debug!("dropping chat received before handshake completed");
            return None;
        };

        let chat = match ChatPayload::decode(payload) {
            Ok(chat) => chat,
            Err(err) => {
                tracing::warn!("dropping malformed chat payload: {err}");
                return None;
            },
        };

        match open(key, &chat.nonce, &chat.ciphertext) {
            Ok(plaintext) => Some(String::from_utf8_lossy(&plaintext).into_owned()),
            Err(err) => {
                tracing::warn!("failed to decrypt: {err}");
                None
            },
        }
    }
}
