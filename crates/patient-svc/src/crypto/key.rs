//! [`KeyMaterial`]: a configured secret normalised to the AES-256 key length.
//!
//! Normalisation right-pads the UTF-8 bytes of the secret with ASCII spaces
//! and truncates to [`KEY_LEN`] bytes. This is a compatibility shim, not a
//! key-derivation function: it adds no entropy, and two secrets sharing their
//! first 32 bytes yield the same key.

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Byte length of an AES-256 key (32 bytes = 256 bits).
pub const KEY_LEN: usize = 32;

/// Filler byte used to right-pad short secrets.
pub const PAD_BYTE: u8 = b' ';

/// Exactly [`KEY_LEN`] bytes of key material, zeroed on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct KeyMaterial([u8; KEY_LEN]);

impl KeyMaterial {
    /// Normalise an arbitrary-length secret into a [`KEY_LEN`]-byte key.
    pub fn normalize(secret: &str) -> Self {
        let mut key = [PAD_BYTE; KEY_LEN];
        let bytes = secret.as_bytes();
        let n = bytes.len().min(KEY_LEN);
        key[..n].copy_from_slice(&bytes[..n]);
        Self(key)
    }

    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("KeyMaterial([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secret_is_right_padded() {
        let key = KeyMaterial::normalize("test");
        assert_eq!(&key.as_bytes()[..4], b"test");
        assert!(key.as_bytes()[4..].iter().all(|&b| b == PAD_BYTE));
    }

    #[test]
    fn long_secret_is_truncated() {
        let secret = "0123456789abcdef0123456789abcdefTRAILING";
        let key = KeyMaterial::normalize(secret);
        assert_eq!(key.as_bytes(), &secret.as_bytes()[..KEY_LEN]);
    }

    #[test]
    fn exact_length_secret_is_unchanged() {
        let secret = "k".repeat(KEY_LEN);
        assert_eq!(KeyMaterial::normalize(&secret).as_bytes(), secret.as_bytes());
    }

    #[test]
    fn normalisation_is_deterministic() {
        assert_eq!(KeyMaterial::normalize("abc"), KeyMaterial::normalize("abc"));
        assert_ne!(KeyMaterial::normalize("abc"), KeyMaterial::normalize("abd"));
    }

    #[test]
    fn empty_secret_is_all_padding() {
        assert_eq!(KeyMaterial::normalize("").as_bytes(), &[PAD_BYTE; KEY_LEN]);
    }

    #[test]
    fn redacted_in_debug() {
        let key = KeyMaterial::normalize("super-secret");
        let dbg = format!("{key:?}");
        assert!(dbg.contains("REDACTED"));
        assert!(!dbg.contains("super-secret"));
    }
}
