//! Datagram dispatcher: the server's protocol core.
//!
//! Decodes each inbound datagram, routes it on the type byte, and produces
//! the datagrams to send in response. The transport loop executes the
//! returned [`Outbound`] sends; nothing here touches a socket, which keeps
//! the whole protocol path testable without I/O.
//!
//! # Concurrency
//!
//! The dispatcher owns the peer registry. Datagrams from different
//! addresses are dispatched concurrently, so every access goes through a
//! read/write lock: handshakes take the write lock to upsert, chats take
//! the read lock to look up the sender and to snapshot the broadcast set.
//! The lock is never held across an await, and never held while sealing.
//!
//! During fan-out, each recipient's address and session key are cloned out
//! of the registry into an owned tuple before any ciphertext is produced,
//! and every recipient gets its own freshly generated nonce. A concurrent
//! registration cannot retarget an in-flight send.

use std::{
    net::SocketAddr,
    sync::{PoisonError, RwLock},
};

use saltline_crypto::{KEY_SIZE, KeyPair, SessionKey, generate_nonce, open, seal};
use saltline_proto::{
    Datagram, IDENTITY_SEPARATOR, MAX_MESSAGE_SIZE, MessageType, WireError,
    payloads::{ChatPayload, Disconnect, HandshakeReply, HandshakeRequest},
};

use crate::registry::{ClientRecord, PeerRegistry};

/// One datagram to transmit, produced by [`Dispatcher::dispatch`].
#[derive(Debug)]
pub struct Outbound {
    /// Destination address.
    pub addr: SocketAddr,

    /// Datagram to send.
    pub datagram: Datagram,
}

/// Server protocol core: long-lived key pair plus the peer registry.
pub struct Dispatcher {
    keys: KeyPair,
    registry: RwLock<PeerRegistry>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Dispatcher {
    /// Create a dispatcher with a freshly generated long-lived key pair
    /// and an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { keys: KeyPair::generate(), registry: RwLock::new(PeerRegistry::new()) }
    }

    /// Server public key, as sent in handshake replies.
    #[must_use]
    pub fn public_key(&self) -> [u8; KEY_SIZE] {
        self.keys.public_key()
    }

    /// Number of registered peers.
    pub fn peer_count(&self) -> usize {
        self.registry.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether an address has a registered session.
    pub fn is_registered(&self, addr: &SocketAddr) -> bool {
        self.registry.read().unwrap_or_else(PoisonError::into_inner).contains(addr)
    }

    /// Drop every peer session (and with them the session keys).
    pub fn clear(&self) {
        self.registry.write().unwrap_or_else(PoisonError::into_inner).clear();
    }

    /// Process one inbound datagram and return the sends it requires.
    ///
    /// Framing failures and unknown types are logged and produce nothing:
    /// they are indistinguishable from network noise and get no reply.
    pub fn dispatch(&self, addr: SocketAddr, bytes: &[u8]) -> Vec<Outbound> {
        let datagram = match Datagram::decode(bytes) {
            Ok(datagram) => datagram,
            Err(err @ (WireError::Truncated { .. } | WireError::BadSignature)) => {
                tracing::warn!("signature does not match for address {addr}, discarding: {err}");
                return Vec::new();
            },
            Err(err) => {
                tracing::warn!("discarding datagram from {addr}: {err}");
                return Vec::new();
            },
        };

        match datagram.msg_type {
            MessageType::Handshake => self.handle_handshake(addr, &datagram.payload),
            MessageType::Chat => self.handle_chat(addr, &datagram.payload),
            MessageType::Disconnected => {
                let disconnect = Disconnect::decode(&datagram.payload);
                tracing::debug!("peer {addr} signaled disconnect: {}", disconnect.reason);
                Vec::new()
            },
        }
    }

    /// Register (or re-register) a peer and reply with our public key.
    fn handle_handshake(&self, addr: SocketAddr, payload: &[u8]) -> Vec<Outbound> {
        let request = match HandshakeRequest::decode(payload) {
            Ok(request) => request,
            Err(err @ WireError::BadKeyLength { .. }) => {
                tracing::warn!("handshake from {addr} failed due to key size: {err}");
                return vec![self.disconnected(addr, "invalid key size...")];
            },
            Err(err) => {
                tracing::warn!("handshake from {addr} rejected: {err}");
                return vec![self.disconnected(addr, "identity too large...")];
            },
        };

        let key = self.keys.precompute(&request.public_key);
        let identity = request.identity.clone();
        let fresh = {
            let mut registry = self.registry.write().unwrap_or_else(PoisonError::into_inner);
            registry.upsert(ClientRecord { address: addr, identity: request.identity, key })
        };

        if fresh {
            tracing::info!("established connection with {identity}@{addr}");
        } else {
            tracing::info!("re-established connection with {identity}@{addr}");
        }

        vec![Outbound {
            addr,
            datagram: HandshakeReply { public_key: self.keys.public_key() }.to_datagram(),
        }]
    }

    /// Open a chat from a registered peer and fan it out to everyone else.
    fn handle_chat(&self, addr: SocketAddr, payload: &[u8]) -> Vec<Outbound> {
        // Clone the sender's identity and key out of the registry so the
        // lock is released before any crypto runs.
        let sender = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            registry.get(&addr).map(|record| (record.identity.clone(), record.key.clone()))
        };

        let Some((identity, key)) = sender else {
            tracing::warn!("no registered client {addr}");
            return vec![self.disconnected(addr, "not registered...")];
        };

        let plaintext = match ChatPayload::decode(payload)
            .map_err(|_| saltline_crypto::CryptoError::AuthFailure)
            .and_then(|chat| open(&key, &chat.nonce, &chat.ciphertext))
        {
            Ok(plaintext) => plaintext,
            Err(err) => {
                tracing::warn!("failed to decrypt chat message from {addr}: {err}");
                return vec![self.disconnected(addr, "failed to decrypt chat message...")];
            },
        };

        if plaintext.len() > MAX_MESSAGE_SIZE {
            tracing::warn!(
                "message received from {addr} is too large: {} bytes",
                plaintext.len()
            );
        }

        let message =
            format!("{identity}{IDENTITY_SEPARATOR}{}", String::from_utf8_lossy(&plaintext));

        // Snapshot the broadcast set as owned (address, key) pairs before
        // sealing anything; the sender itself is excluded.
        let recipients: Vec<(SocketAddr, SessionKey)> = {
            let registry = self.registry.read().unwrap_or_else(PoisonError::into_inner);
            registry.others(&addr).map(|record| (record.address, record.key.clone())).collect()
        };

        tracing::debug!("broadcasting message from {identity} to {} peers", recipients.len());

        recipients
            .into_iter()
            .map(|(recipient, recipient_key)| {
                let nonce = generate_nonce();
                let ciphertext = seal(&recipient_key, &nonce, message.as_bytes());
                Outbound { addr: recipient, datagram: ChatPayload { nonce, ciphertext }.to_datagram() }
            })
            .collect()
    }

    /// Build a disconnect reply with a human-readable reason.
    ///
    /// Useful with an interactive interface or for debugging; the signal is
    /// unauthenticated by design.
    fn disconnected(&self, addr: SocketAddr, reason: &str) -> Outbound {
        Outbound { addr, datagram: Disconnect::new(reason).to_datagram() }
    }
}
