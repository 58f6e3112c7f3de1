//! Authenticated sealing and opening with XChaCha20-Poly1305.
//!
//! The nonce is explicit: callers generate one per sealed payload and send
//! it in clear alongside the ciphertext. Nothing here tracks nonce state.

use chacha20poly1305::{
    XChaCha20Poly1305, XNonce,
    aead::{Aead, KeyInit},
};
use rand::{RngCore, rngs::OsRng};

use crate::{error::CryptoError, keys::SessionKey};

/// XChaCha20 nonce size (24 bytes).
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size (16 bytes), appended to every ciphertext.
pub const TAG_SIZE: usize = 16;

/// Draw a fresh random nonce from the OS CSPRNG.
#[must_use]
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Seal a plaintext under a session key and nonce.
///
/// Returns the ciphertext with the 16-byte authentication tag appended.
///
/// # Security
///
/// The nonce MUST be fresh for every call under the same key; reuse breaks
/// confidentiality. [`generate_nonce`] satisfies this by construction.
#[must_use]
pub fn seal(key: &SessionKey, nonce: &[u8; NONCE_SIZE], plaintext: &[u8]) -> Vec<u8> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    let Ok(ciphertext) = cipher.encrypt(XNonce::from_slice(nonce), plaintext) else {
        unreachable!("XChaCha20-Poly1305 encryption cannot fail with valid inputs");
    };

    ciphertext
}

/// Open a sealed payload.
///
/// # Errors
///
/// - `CryptoError::AuthFailure` if the key is wrong, the nonce does not
///   match the one the payload was sealed under, or the ciphertext was
///   tampered with
pub fn open(
    key: &SessionKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = XChaCha20Poly1305::new(key.as_bytes().into());

    cipher.decrypt(XNonce::from_slice(nonce), ciphertext).map_err(|_| CryptoError::AuthFailure)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::keys::KeyPair;

    fn session_key() -> SessionKey {
        KeyPair::from_secret_bytes([1u8; 32]).precompute(&KeyPair::from_secret_bytes([2u8; 32]).public_key())
    }

    #[test]
    fn seal_open_round_trip() {
        let key = session_key();
        let nonce = generate_nonce();

        let ciphertext = seal(&key, &nonce, b"Hello, World!");
        let plaintext = open(&key, &nonce, &ciphertext).unwrap();

        assert_eq!(plaintext, b"Hello, World!");
    }

    #[test]
    fn ciphertext_carries_tag_overhead() {
        let key = session_key();
        let nonce = generate_nonce();

        let ciphertext = seal(&key, &nonce, b"test message");
        assert_eq!(ciphertext.len(), b"test message".len() + TAG_SIZE);
    }

    #[test]
    fn empty_plaintext_round_trips() {
        let key = session_key();
        let nonce = generate_nonce();

        let ciphertext = seal(&key, &nonce, b"");
        assert_eq!(open(&key, &nonce, &ciphertext).unwrap(), b"");
    }

    #[test]
    fn wrong_key_fails_open() {
        let key = session_key();
        let other = KeyPair::from_secret_bytes([3u8; 32])
            .precompute(&KeyPair::from_secret_bytes([4u8; 32]).public_key());
        let nonce = generate_nonce();

        let ciphertext = seal(&key, &nonce, b"secret");
        assert_eq!(open(&other, &nonce, &ciphertext), Err(CryptoError::AuthFailure));
    }

    #[test]
    fn wrong_nonce_fails_open() {
        let key = session_key();
        let nonce = [0u8; NONCE_SIZE];
        let other_nonce = [1u8; NONCE_SIZE];

        let ciphertext = seal(&key, &nonce, b"secret");
        assert_eq!(open(&key, &other_nonce, &ciphertext), Err(CryptoError::AuthFailure));
    }

    #[test]
    fn tampered_ciphertext_fails_open() {
        let key = session_key();
        let nonce = generate_nonce();

        let mut ciphertext = seal(&key, &nonce, b"original message");
        ciphertext[0] ^= 0xFF;

        assert_eq!(open(&key, &nonce, &ciphertext), Err(CryptoError::AuthFailure));
    }

    #[test]
    fn fresh_nonces_differ() {
        // Statistically certain for 24 random bytes.
        assert_ne!(generate_nonce(), generate_nonce());
    }

    proptest! {
        #[test]
        fn round_trip_for_all_messages(
            plaintext in prop::collection::vec(any::<u8>(), 0..=446),
            nonce in any::<[u8; NONCE_SIZE]>(),
        ) {
            let key = session_key();
            let ciphertext = seal(&key, &nonce, &plaintext);
            prop_assert_eq!(open(&key, &nonce, &ciphertext).unwrap(), plaintext);
        }
    }
}
