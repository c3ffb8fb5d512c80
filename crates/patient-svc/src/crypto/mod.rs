//! AES-256-CBC field encryption primitives.
//!
//! This module is intentionally free of storage and HTTP dependencies.
//! It provides the low-level encrypt/decrypt operations used by the
//! [`crate::codec`] layer.
//!
//! # Stored format
//!
//! ```text
//! ssn   = hex(AES-256-CBC(key, iv, PKCS#7(plaintext)))
//! ivKey = hex(iv)            // 16 fresh CSPRNG bytes per encryption
//! ```
//!
//! The format is byte-compatible with records written by the previous
//! Node.js deployment (`crypto.createCipheriv("aes-256-cbc", ...)` with hex
//! output), so existing rows decrypt unchanged.

pub mod cipher;
pub mod key;
pub mod options;

pub use cipher::{decrypt, encrypt, generate_key, DecryptionError, EncryptionError, EncryptionResult};
pub use key::{KeyMaterial, KEY_LEN};
pub use options::{Algorithm, EncryptionOptions, DEFAULT_IV_LEN};
