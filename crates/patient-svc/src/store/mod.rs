//! Storage collaborator: the generic CRUD boundary for patient records.
//!
//! # Responsibilities
//!
//! - Persist and fetch [`PatientRecord`]s exactly as handed over. Ciphertext
//!   and IV strings are stored byte-for-byte; no layer below this trait
//!   decrypts, trims or re-encodes them.
//! - Own the connection pool and its reconnection policy. Callers borrow a
//!   handle (`Arc<dyn PatientStore>`) and never retry.
//!
//! Two implementations live here: [`memory::InMemoryStore`] for tests and
//! local runs, [`sqlite::SqliteStore`] for a persistent deployment.

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;
use common::protocol::{PatientSummary, StoredPatient};
use common::ServiceError;
use thiserror::Error;

/// Errors from the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying database returned an error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The database could not be reached (connection retries exhausted).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        ServiceError::Internal(e.to_string())
    }
}

/// A patient record that has not been persisted yet and has no identity.
///
/// Between validation and [`crate::codec::SensitiveFieldCodec::protect`] the
/// `ssn` field holds plaintext, so `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub ssn: String,
    pub iv_key: String,
}

/// A persisted patient record. `ssn` is ciphertext, `iv_key` its hex IV.
#[derive(Clone, PartialEq, Eq)]
pub struct PatientRecord {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub ssn: String,
    pub iv_key: String,
}

impl PatientRecord {
    /// Attach a storage-assigned identity to `patient`.
    pub fn with_id(id: i64, patient: NewPatient) -> Self {
        Self {
            id,
            first_name: patient.first_name,
            last_name: patient.last_name,
            dob: patient.dob,
            ssn: patient.ssn,
            iv_key: patient.iv_key,
        }
    }
}

impl std::fmt::Debug for NewPatient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewPatient")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("dob", &self.dob)
            .field("ssn", &"[REDACTED]")
            .field("iv_key", &self.iv_key)
            .finish()
    }
}

impl std::fmt::Debug for PatientRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatientRecord")
            .field("id", &self.id)
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .field("dob", &self.dob)
            .field("ssn", &"[REDACTED]")
            .field("iv_key", &self.iv_key)
            .finish()
    }
}

impl From<PatientRecord> for StoredPatient {
    fn from(r: PatientRecord) -> Self {
        Self {
            id: r.id,
            first_name: r.first_name,
            last_name: r.last_name,
            dob: r.dob,
            ssn: r.ssn,
            iv_key: r.iv_key,
        }
    }
}

/// List-path projection: keeps the ciphertext, drops IV and date of birth.
impl From<PatientRecord> for PatientSummary {
    fn from(r: PatientRecord) -> Self {
        Self {
            id: r.id,
            first_name: r.first_name,
            last_name: r.last_name,
            ssn: r.ssn,
        }
    }
}

/// Generic CRUD interface over persisted patient records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientStore: Send + Sync {
    /// Every stored record, ordered by id.
    async fn find_all(&self) -> Result<Vec<PatientRecord>, StoreError>;

    /// The record with `id`, or `None`.
    async fn find_by_id(&self, id: i64) -> Result<Option<PatientRecord>, StoreError>;

    /// Persist `patient` and return it with its assigned id.
    async fn insert(&self, patient: NewPatient) -> Result<PatientRecord, StoreError>;

    /// Cheap liveness probe used by `GET /health`.
    async fn ping(&self) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PatientRecord {
        PatientRecord::with_id(
            3,
            NewPatient {
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                dob: "1815-12-10".into(),
                ssn: "cafe".into(),
                iv_key: "beef".into(),
            },
        )
    }

    #[test]
    fn debug_redacts_ssn() {
        let new = NewPatient {
            first_name: "a".into(),
            last_name: "b".into(),
            dob: "2022-09-27".into(),
            ssn: "666-66-7777".into(),
            iv_key: String::new(),
        };
        assert!(!format!("{new:?}").contains("666-66-7777"));
        assert!(!format!("{:?}", record()).contains("cafe"));
    }

    #[test]
    fn summary_keeps_ciphertext() {
        let summary = PatientSummary::from(record());
        assert_eq!(summary.id, 3);
        assert_eq!(summary.ssn, "cafe");
    }

    #[test]
    fn stored_patient_keeps_iv() {
        let stored = StoredPatient::from(record());
        assert_eq!(stored.iv_key, "beef");
        assert_eq!(stored.dob, "1815-12-10");
    }

    #[test]
    fn store_error_maps_to_internal() {
        let e: ServiceError = StoreError::Unavailable("down".into()).into();
        assert_eq!(e.http_status(), 500);
    }
}
