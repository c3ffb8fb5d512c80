//! SSN field codec: encrypt-on-write and decrypt-on-read for patient records.
//!
//! This is the only component that knows `ssn` is the sensitive field and that
//! `iv_key` carries its IV.

use std::sync::Arc;

use common::ServiceError;
use zeroize::Zeroize;

use crate::crypto::{self, DecryptionError, EncryptionError, EncryptionOptions};
use crate::store::{NewPatient, PatientRecord};

impl From<EncryptionError> for ServiceError {
    fn from(e: EncryptionError) -> Self {
        ServiceError::Encryption(e.to_string())
    }
}

impl From<DecryptionError> for ServiceError {
    fn from(e: DecryptionError) -> Self {
        ServiceError::Decryption(e.to_string())
    }
}

/// Applies the cipher to the sensitive field of patient records.
///
/// Cheap to clone; the options are shared.
#[derive(Debug, Clone)]
pub struct SensitiveFieldCodec {
    options: Arc<EncryptionOptions>,
}

impl SensitiveFieldCodec {
    pub fn new(options: EncryptionOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    /// Replace the plaintext `ssn` of an unsaved record with ciphertext and
    /// set `iv_key` to the fresh IV. Any caller-supplied `iv_key` is discarded.
    ///
    /// Only accepts [`NewPatient`], so persisted ciphertext can never be
    /// encrypted a second time.
    ///
    /// # Errors
    ///
    /// Returns [`EncryptionError`] if the cipher cannot be initialised.
    pub fn protect(&self, mut patient: NewPatient) -> Result<NewPatient, EncryptionError> {
        let encrypted = crypto::encrypt(&patient.ssn, &self.options)?;
        patient.ssn.zeroize();
        patient.ssn = encrypted.ciphertext;
        patient.iv_key = encrypted.iv;
        Ok(patient)
    }

    /// Replace the ciphertext `ssn` of a fetched record with its plaintext,
    /// decrypting with `iv`.
    ///
    /// # Errors
    ///
    /// Returns [`DecryptionError`] if the stored values do not decrypt.
    pub fn reveal(&self, mut record: PatientRecord, iv: &str) -> Result<PatientRecord, DecryptionError> {
        record.ssn = crypto::decrypt(&record.ssn, iv, &self.options)?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> SensitiveFieldCodec {
        SensitiveFieldCodec::new(EncryptionOptions::new("test"))
    }

    fn new_patient() -> NewPatient {
        NewPatient {
            first_name: "test first 1".into(),
            last_name: "test Last 1".into(),
            dob: "2022-09-27".into(),
            ssn: "666-66-7777".into(),
            iv_key: String::new(),
        }
    }

    #[test]
    fn protect_encrypts_ssn_and_sets_iv() {
        let protected = codec().protect(new_patient()).unwrap();
        assert_ne!(protected.ssn, "666-66-7777");
        assert_eq!(protected.iv_key.len(), 32);
        assert_eq!(protected.first_name, "test first 1");
        assert_eq!(protected.dob, "2022-09-27");
    }

    #[test]
    fn protect_ignores_supplied_iv() {
        let mut patient = new_patient();
        patient.iv_key = "00".repeat(16);
        let protected = codec().protect(patient).unwrap();
        assert_ne!(protected.iv_key, "00".repeat(16));
    }

    #[test]
    fn protect_then_reveal_restores_ssn() {
        let codec = codec();
        let protected = codec.protect(new_patient()).unwrap();
        let record = PatientRecord::with_id(1, protected);
        let iv = record.iv_key.clone();
        let revealed = codec.reveal(record, &iv).unwrap();
        assert_eq!(revealed.ssn, "666-66-7777");
        assert_eq!(revealed.id, 1);
    }

    #[test]
    fn identical_ssns_get_distinct_ciphertext() {
        let codec = codec();
        let a = codec.protect(new_patient()).unwrap();
        let b = codec.protect(new_patient()).unwrap();
        assert_ne!(a.iv_key, b.iv_key);
        assert_ne!(a.ssn, b.ssn);
    }

    #[test]
    fn reveal_with_corrupt_iv_fails() {
        let codec = codec();
        let record = PatientRecord::with_id(1, codec.protect(new_patient()).unwrap());
        let result = codec.reveal(record, "");
        assert!(result.is_err());
    }

    #[test]
    fn bad_iv_length_is_encryption_error() {
        let codec = SensitiveFieldCodec::new(EncryptionOptions::new("test").with_iv_length(8));
        let err: ServiceError = codec.protect(new_patient()).unwrap_err().into();
        assert!(matches!(err, ServiceError::Encryption(_)));
        assert!(!err.to_string().contains("666-66-7777"));
    }
}
