//! Key pairs and session-key precomputation.
//!
//! A [`SessionKey`] is derived once per handshake and reused for every
//! seal/open under that session, avoiding per-message asymmetric work.

use hkdf::Hkdf;
use rand::rngs::OsRng;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroize;

/// Length of public keys, private keys, and session keys.
pub const KEY_SIZE: usize = 32;

/// Domain-separation label for session-key derivation.
const SESSION_KEY_LABEL: &[u8] = b"saltline session key v1";

/// An X25519 key pair.
///
/// The client generates a fresh pair for every handshake attempt and
/// discards the previous one; the server generates a single pair at startup
/// and reuses it across all peer sessions. The private half never leaves
/// this struct and is zeroized on drop.
pub struct KeyPair {
    secret: StaticSecret,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a fresh key pair from the OS CSPRNG.
    #[must_use]
    pub fn generate() -> Self {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Build a key pair from raw secret bytes.
    ///
    /// For deterministic tests. Production callers use [`Self::generate`].
    #[must_use]
    pub fn from_secret_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Public half, as sent in handshake payloads.
    #[must_use]
    pub fn public_key(&self) -> [u8; KEY_SIZE] {
        self.public.to_bytes()
    }

    /// Precompute the shared session key with a peer.
    ///
    /// Runs X25519 over our private half and the peer's public half, then
    /// expands the shared secret through HKDF-SHA256 under a fixed label.
    ///
    /// Reproducible from either side:
    /// `a.precompute(b.public) == b.precompute(a.public)`.
    #[must_use]
    pub fn precompute(&self, peer_public: &[u8; KEY_SIZE]) -> SessionKey {
        let shared = self.secret.diffie_hellman(&PublicKey::from(*peer_public));

        let hkdf = Hkdf::<Sha256>::new(None, shared.as_bytes());
        let mut key = [0u8; KEY_SIZE];
        let Ok(()) = hkdf.expand(SESSION_KEY_LABEL, &mut key) else {
            unreachable!("32 bytes is a valid HKDF-SHA256 output length");
        };

        SessionKey(key)
    }
}

/// A precomputed 32-byte symmetric session key.
///
/// Derived independently on both ends of a handshake; never transmitted.
/// Zeroized on drop.
#[derive(Clone)]
pub struct SessionKey([u8; KEY_SIZE]);

impl SessionKey {
    /// Raw key bytes for the AEAD layer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl Drop for SessionKey {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl std::fmt::Debug for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Key material stays out of logs.
        f.write_str("SessionKey(..)")
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn precompute_is_symmetric() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();

        let alice_key = alice.precompute(&bob.public_key());
        let bob_key = bob.precompute(&alice.public_key());

        assert_eq!(alice_key.as_bytes(), bob_key.as_bytes());
    }

    #[test]
    fn different_peers_derive_different_keys() {
        let alice = KeyPair::generate();
        let bob = KeyPair::generate();
        let carol = KeyPair::generate();

        let with_bob = alice.precompute(&bob.public_key());
        let with_carol = alice.precompute(&carol.public_key());

        assert_ne!(with_bob.as_bytes(), with_carol.as_bytes());
    }

    #[test]
    fn from_secret_bytes_is_deterministic() {
        let a = KeyPair::from_secret_bytes([7u8; KEY_SIZE]);
        let b = KeyPair::from_secret_bytes([7u8; KEY_SIZE]);

        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn debug_does_not_leak_key_bytes() {
        let key = KeyPair::generate().precompute(&KeyPair::generate().public_key());
        assert_eq!(format!("{key:?}"), "SessionKey(..)");
    }

    proptest! {
        #[test]
        fn precompute_symmetric_for_all_pairs(
            secret_a in any::<[u8; KEY_SIZE]>(),
            secret_b in any::<[u8; KEY_SIZE]>(),
        ) {
            let a = KeyPair::from_secret_bytes(secret_a);
            let b = KeyPair::from_secret_bytes(secret_b);

            let shared_a = a.precompute(&b.public_key());
            let shared_b = b.precompute(&a.public_key());
            prop_assert_eq!(shared_a.as_bytes(), shared_b.as_bytes());
        }
    }
}
