//! Peer registry: one record per remote address.
//!
//! The registry is a plain map with no interior locking. It is owned by the
//! dispatcher, which wraps it in a read/write lock; nothing else touches
//! it. Records live for the process lifetime of the server - there is no
//! idle expiry.

use std::{collections::HashMap, net::SocketAddr};

use saltline_crypto::SessionKey;

/// A client from the perspective of the server.
#[derive(Debug, Clone)]
pub struct ClientRecord {
    /// Remote address the client's datagrams arrive from.
    pub address: SocketAddr,

    /// Display identity carried in the client's handshake.
    pub identity: String,

    /// Session key precomputed from the client's handshake key.
    pub key: SessionKey,
}

/// Registry of active peer sessions keyed by remote address.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<SocketAddr, ClientRecord>,
}

impl PeerRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the record for its address.
    ///
    /// A repeated handshake from the same address replaces the old record
    /// (fresh identity and session key). Returns `true` if the address was
    /// not registered before.
    pub fn upsert(&mut self, record: ClientRecord) -> bool {
        self.peers.insert(record.address, record).is_none()
    }

    /// Record for an address. `None` if not registered.
    #[must_use]
    pub fn get(&self, address: &SocketAddr) -> Option<&ClientRecord> {
        self.peers.get(address)
    }

    /// Check whether an address is registered.
    #[must_use]
    pub fn contains(&self, address: &SocketAddr) -> bool {
        self.peers.contains_key(address)
    }

    /// All records except the one for `address` (the broadcast set for a
    /// chat received from `address`).
    pub fn others<'a>(
        &'a self,
        address: &'a SocketAddr,
    ) -> impl Iterator<Item = &'a ClientRecord> {
        self.peers.values().filter(move |record| record.address != *address)
    }

    /// Number of registered peers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.peers.len()
    }

    /// Whether no peer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Drop every record (and with them the session keys).
    pub fn clear(&mut self) {
        self.peers.clear();
    }
}
