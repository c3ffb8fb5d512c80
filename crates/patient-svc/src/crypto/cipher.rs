//! AES-256-CBC encryption and decryption of individual string fields.
//!
//! **IV handling:** CBC is only semantically secure when every encryption uses
//! a fresh, unpredictable IV. [`encrypt`] draws one from the OS CSPRNG on every
//! call and returns it next to the ciphertext; the IV is public and is stored
//! with the record.
//!
//! **Do NOT cache or derive the IV from the record.** Identical SSNs would
//! then produce identical ciphertext, leaking equality across patients.
//!
//! Error values carry static messages only. Plaintext, ciphertext and key
//! bytes never appear in them.

use aes::Aes256;
use cbc::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::{rngs::OsRng, RngCore};
use thiserror::Error;
use zeroize::Zeroize;

use super::key::KEY_LEN;
use super::options::{Algorithm, EncryptionOptions};

/// AES block length in bytes.
pub const BLOCK_LEN: usize = 16;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Output of one [`encrypt`] call. Both fields are lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionResult {
    pub ciphertext: String,
    pub iv: String,
}

/// Errors produced while encrypting.
#[derive(Debug, Error)]
pub enum EncryptionError {
    /// The cipher rejected the key or IV (wrong IV length in configuration).
    #[error("cipher initialisation failed: key must be {KEY_LEN} bytes and IV {BLOCK_LEN} bytes")]
    CipherInit,
}

/// Errors produced while decrypting.
#[derive(Debug, Error)]
pub enum DecryptionError {
    /// The ciphertext or the IV is not valid hex.
    #[error("ciphertext or IV is not valid hex")]
    InvalidEncoding,

    /// The ciphertext is empty or not a whole number of blocks.
    #[error("ciphertext length is not a multiple of the {BLOCK_LEN}-byte block size")]
    InvalidLength,

    /// The cipher rejected the key or IV (wrong IV length).
    #[error("cipher initialisation failed: key must be {KEY_LEN} bytes and IV {BLOCK_LEN} bytes")]
    CipherInit,

    /// PKCS#7 padding check failed (wrong key, wrong IV, or corrupted data).
    #[error("invalid padding")]
    InvalidPadding,

    /// The decrypted bytes are not UTF-8.
    #[error("decrypted value is not valid UTF-8")]
    InvalidUtf8,
}

/// Encrypt `plaintext` (UTF-8 bytes) under the configured key and a fresh IV.
///
/// # Errors
///
/// Returns [`EncryptionError::CipherInit`] if `opts.iv_length` is not a valid
/// IV length for the algorithm.
pub fn encrypt(plaintext: &str, opts: &EncryptionOptions) -> Result<EncryptionResult, EncryptionError> {
    let mut iv = vec![0u8; opts.iv_length];
    OsRng.fill_bytes(&mut iv);
    encrypt_with_iv(plaintext, &iv, opts)
}

fn encrypt_with_iv(
    plaintext: &str,
    iv: &[u8],
    opts: &EncryptionOptions,
) -> Result<EncryptionResult, EncryptionError> {
    let ciphertext = match opts.algorithm {
        Algorithm::Aes256Cbc => Aes256CbcEnc::new_from_slices(opts.key().as_bytes(), iv)
            .map_err(|_| EncryptionError::CipherInit)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes()),
    };

    Ok(EncryptionResult {
        ciphertext: hex::encode(ciphertext),
        iv: hex::encode(iv),
    })
}

/// Decrypt hex `ciphertext_hex` using the hex `iv_hex` it was produced with.
///
/// # Errors
///
/// See [`DecryptionError`] for the individual failure modes.
pub fn decrypt(
    ciphertext_hex: &str,
    iv_hex: &str,
    opts: &EncryptionOptions,
) -> Result<String, DecryptionError> {
    let ciphertext = hex::decode(ciphertext_hex).map_err(|_| DecryptionError::InvalidEncoding)?;
    let iv = hex::decode(iv_hex).map_err(|_| DecryptionError::InvalidEncoding)?;

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_LEN != 0 {
        return Err(DecryptionError::InvalidLength);
    }

    let plaintext = match opts.algorithm {
        Algorithm::Aes256Cbc => Aes256CbcDec::new_from_slices(opts.key().as_bytes(), &iv)
            .map_err(|_| DecryptionError::CipherInit)?
            .decrypt_padded_vec_mut::<Pkcs7>(&ciphertext)
            .map_err(|_| DecryptionError::InvalidPadding)?,
    };

    String::from_utf8(plaintext).map_err(|e| {
        let mut bytes = e.into_bytes();
        bytes.zeroize();
        DecryptionError::InvalidUtf8
    })
}

/// Return `length_bytes` CSPRNG bytes, hex-encoded. Used for key provisioning.
pub fn generate_key(length_bytes: usize) -> String {
    let mut key = vec![0u8; length_bytes];
    OsRng.fill_bytes(&mut key);
    let encoded = hex::encode(&key);
    key.zeroize();
    encoded
}
