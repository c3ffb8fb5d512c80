//! Demo data for local runs: one user per role and two patients.
//!
//! Patients go through [`SensitiveFieldCodec::protect`] like any other create,
//! so seeded SSNs are encrypted at rest.

use anyhow::{Context, Result};
use tracing::info;

use crate::codec::SensitiveFieldCodec;
use crate::identity::UserDirectory;
use crate::policy::Role;
use crate::store::{NewPatient, PatientStore};

const DEMO_USERS: [(&str, &str, Role); 3] = [
    ("test1@user.com", "test 1", Role::Billing),
    ("test2@user.com", "test 2", Role::Admin),
    ("test3@user.com", "test 3", Role::Provider),
];

const DEMO_SSN: &str = "666-66-7777";

/// Upsert the demo users and, if the patient table is empty, insert two
/// demo patients.
///
/// # Errors
///
/// Returns an error if the storage collaborator fails or encryption fails.
pub async fn seed_demo_data(
    users: &dyn UserDirectory,
    patients: &dyn PatientStore,
    codec: &SensitiveFieldCodec,
) -> Result<()> {
    for (email, name, role) in DEMO_USERS {
        let caller = users
            .upsert_user(email, name, role)
            .await
            .with_context(|| format!("failed to seed user {email}"))?;
        info!(caller_id = caller.id, role = %caller.role, "seeded demo user");
    }

    if !patients.find_all().await.context("failed to list patients")?.is_empty() {
        info!("patients already present; skipping demo patients");
        return Ok(());
    }

    for n in 1..=2 {
        let patient = codec
            .protect(NewPatient {
                first_name: format!("test first {n}"),
                last_name: format!("test Last {n}"),
                dob: "2022-09-27".into(),
                ssn: DEMO_SSN.into(),
                iv_key: String::new(),
            })
            .context("failed to encrypt demo patient")?;
        let record = patients
            .insert(patient)
            .await
            .context("failed to seed demo patient")?;
        info!(patient_id = record.id, "seeded demo patient");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EncryptionOptions;
    use crate::store::InMemoryStore;

    fn codec() -> SensitiveFieldCodec {
        SensitiveFieldCodec::new(EncryptionOptions::new("seed-test"))
    }

    #[tokio::test]
    async fn seeds_users_and_encrypted_patients() {
        let store = InMemoryStore::new();
        seed_demo_data(&store, &store, &codec()).await.unwrap();

        assert_eq!(store.find_user(1).await.unwrap().unwrap().role, Role::Billing);
        assert_eq!(store.find_user(2).await.unwrap().unwrap().role, Role::Admin);
        assert_eq!(store.find_user(3).await.unwrap().unwrap().role, Role::Provider);

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|p| p.ssn != DEMO_SSN && !p.iv_key.is_empty()));
    }

    #[tokio::test]
    async fn reseeding_is_idempotent() {
        let store = InMemoryStore::new();
        seed_demo_data(&store, &store, &codec()).await.unwrap();
        seed_demo_data(&store, &store, &codec()).await.unwrap();
        assert_eq!(store.find_all().await.unwrap().len(), 2);
        assert!(store.find_user(4).await.unwrap().is_none());
    }
}
