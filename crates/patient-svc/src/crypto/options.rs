//! [`EncryptionOptions`]: key material plus the fixed algorithm parameters.

use std::str::FromStr;

use thiserror::Error;

use super::key::KeyMaterial;

/// IV length for a 128-bit block cipher.
pub const DEFAULT_IV_LEN: usize = 16;

/// Supported cipher identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Algorithm {
    /// AES with a 256-bit key in CBC mode, PKCS#7 padding.
    #[default]
    Aes256Cbc,
}

impl Algorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            Algorithm::Aes256Cbc => "aes-256-cbc",
        }
    }
}

/// The configured algorithm name is not supported.
#[derive(Debug, Error)]
#[error("unsupported encryption algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aes-256-cbc" => Ok(Algorithm::Aes256Cbc),
            other => Err(UnknownAlgorithm(other.to_owned())),
        }
    }
}

/// Parameters for every encrypt/decrypt call.
///
/// The secret is normalised once, at construction; the raw string is not
/// retained. Treated as immutable for the lifetime of the process.
#[derive(Clone)]
pub struct EncryptionOptions {
    key: KeyMaterial,
    /// IV length in bytes. Must be [`DEFAULT_IV_LEN`] for AES-CBC; any other
    /// value makes every encryption fail at cipher initialisation.
    pub iv_length: usize,
    pub algorithm: Algorithm,
}

impl EncryptionOptions {
    /// Options for `secret_key` with the default IV length and algorithm.
    pub fn new(secret_key: &str) -> Self {
        Self {
            key: KeyMaterial::normalize(secret_key),
            iv_length: DEFAULT_IV_LEN,
            algorithm: Algorithm::default(),
        }
    }

    pub fn with_iv_length(mut self, iv_length: usize) -> Self {
        self.iv_length = iv_length;
        self
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn key(&self) -> &KeyMaterial {
        &self.key
    }
}

impl std::fmt::Debug for EncryptionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionOptions")
            .field("key", &"[REDACTED]")
            .field("iv_length", &self.iv_length)
            .field("algorithm", &self.algorithm.as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let opts = EncryptionOptions::new("k");
        assert_eq!(opts.iv_length, 16);
        assert_eq!(opts.algorithm, Algorithm::Aes256Cbc);
    }

    #[test]
    fn algorithm_parses_case_insensitively() {
        assert_eq!("AES-256-CBC".parse::<Algorithm>().unwrap(), Algorithm::Aes256Cbc);
        assert!("aes-128-gcm".parse::<Algorithm>().is_err());
    }

    #[test]
    fn debug_hides_secret() {
        let opts = EncryptionOptions::new("hunter2");
        let dbg = format!("{opts:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("aes-256-cbc"));
    }
}
