//! [`InMemoryStore`]: process-local storage collaborator.
//!
//! Used by tests and by deployments without `DATABASE_URL`. Contents are lost
//! on restart.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{NewPatient, PatientRecord, PatientStore, StoreError};
use crate::identity::{Caller, UserDirectory};
use crate::policy::Role;

#[derive(Debug, Default)]
struct Inner {
    patients: BTreeMap<i64, PatientRecord>,
    users: BTreeMap<i64, Caller>,
    user_emails: HashMap<String, i64>,
    last_patient_id: i64,
    last_user_id: i64,
}

/// Thread-safe in-memory patient and user tables.
///
/// Cloning shares the same underlying tables. IDs are assigned sequentially
/// from 1, like an auto-increment column.
#[derive(Clone, Debug, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryStore {
    /// Create a new, empty [`InMemoryStore`].
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PatientStore for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<PatientRecord>, StoreError> {
        Ok(self.inner.read().await.patients.values().cloned().collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PatientRecord>, StoreError> {
        Ok(self.inner.read().await.patients.get(&id).cloned())
    }

    async fn insert(&self, patient: NewPatient) -> Result<PatientRecord, StoreError> {
        let mut inner = self.inner.write().await;
        inner.last_patient_id += 1;
        let record = PatientRecord::with_id(inner.last_patient_id, patient);
        inner.patients.insert(record.id, record.clone());
        Ok(record)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_user(&self, id: i64) -> Result<Option<Caller>, StoreError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn upsert_user(&self, email: &str, _name: &str, role: Role) -> Result<Caller, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(existing) = inner.user_emails.get(email).and_then(|id| inner.users.get(id)) {
            return Ok(existing.clone());
        }
        inner.last_user_id += 1;
        let caller = Caller {
            id: inner.last_user_id,
            role,
        };
        inner.users.insert(caller.id, caller.clone());
        inner.user_emails.insert(email.to_owned(), caller.id);
        Ok(caller)
    }
}
