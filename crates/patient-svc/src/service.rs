//! [`PatientService`]: orchestrates caller resolution, the access policy, the
//! SSN codec and the storage collaborator.
//!
//! Every operation runs the same linear flow:
//!
//! ```text
//! resolve caller → authorize → (validate) → encrypt / fetch → sanitize or reveal
//! ```
//!
//! Only [`PatientService::get_by_id`] ever produces a plaintext SSN. The list
//! path returns ciphertext and never decrypts.

use std::sync::Arc;

use chrono::NaiveDate;
use common::protocol::{CreatePatientRequest, PatientSummary, PatientView, StoredPatient};
use common::ServiceError;
use tracing::{error, info};

use crate::codec::SensitiveFieldCodec;
use crate::identity::{resolve_caller, Caller, UserDirectory};
use crate::policy::{self, Operation};
use crate::store::{NewPatient, PatientStore};

/// Patient record operations with access control and SSN protection.
///
/// Holds no per-request state; clone freely across handlers.
#[derive(Clone)]
pub struct PatientService {
    patients: Arc<dyn PatientStore>,
    users: Arc<dyn UserDirectory>,
    codec: SensitiveFieldCodec,
}

impl PatientService {
    pub fn new(
        patients: Arc<dyn PatientStore>,
        users: Arc<dyn UserDirectory>,
        codec: SensitiveFieldCodec,
    ) -> Self {
        Self {
            patients,
            users,
            codec,
        }
    }

    /// Resolve the caller and check that their role may perform `operation`.
    ///
    /// Runs before any input is validated.
    pub async fn authorize(
        &self,
        caller_id: Option<&str>,
        operation: Operation,
    ) -> Result<Caller, ServiceError> {
        let caller = resolve_caller(self.users.as_ref(), caller_id).await?;
        policy::authorize(&caller, operation)?;
        Ok(caller)
    }

    /// List every patient. ADMIN only. SSNs stay encrypted; IVs are dropped.
    pub async fn list(&self, caller_id: Option<&str>) -> Result<Vec<PatientSummary>, ServiceError> {
        let caller = self.authorize(caller_id, Operation::ListPatients).await?;

        let patients = self.patients.find_all().await?;

        info!(
            caller_id = caller.id,
            role = %caller.role,
            count = patients.len(),
            "retrieved all patients"
        );
        Ok(patients.into_iter().map(PatientSummary::from).collect())
    }

    /// Fetch one patient with its SSN decrypted. ADMIN and BILLING.
    pub async fn get_by_id(
        &self,
        caller_id: Option<&str>,
        patient_id: &str,
    ) -> Result<PatientView, ServiceError> {
        let caller = self.authorize(caller_id, Operation::ReadPatient).await?;

        let id: i64 = patient_id
            .trim()
            .parse()
            .map_err(|_| ServiceError::Validation("invalid patient ID".into()))?;

        let record = self
            .patients
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("patient with id {id} not found")))?;

        let iv = record.iv_key.clone();
        let revealed = self.codec.reveal(record, &iv).map_err(|e| {
            error!(caller_id = caller.id, patient_id = id, error = %e, "failed to decrypt patient SSN");
            ServiceError::from(e)
        })?;

        info!(
            caller_id = caller.id,
            role = %caller.role,
            patient_id = id,
            "retrieved patient"
        );
        Ok(PatientView {
            id: revealed.id,
            first_name: revealed.first_name,
            last_name: revealed.last_name,
            ssn: revealed.ssn,
        })
    }

    /// Validate, encrypt and persist a new patient. ADMIN and BILLING.
    ///
    /// The returned record carries the stored ciphertext, not the plaintext.
    pub async fn create(
        &self,
        caller_id: Option<&str>,
        input: CreatePatientRequest,
    ) -> Result<StoredPatient, ServiceError> {
        let caller = self.authorize(caller_id, Operation::CreatePatient).await?;

        let patient = validate(input)?;
        let protected = self.codec.protect(patient).map_err(|e| {
            error!(caller_id = caller.id, error = %e, "failed to encrypt patient SSN");
            ServiceError::from(e)
        })?;

        let record = self.patients.insert(protected).await?;

        info!(
            caller_id = caller.id,
            role = %caller.role,
            patient_id = record.id,
            "created patient"
        );
        Ok(record.into())
    }

    /// Whether the storage collaborator currently answers.
    pub async fn storage_ready(&self) -> bool {
        self.patients.ping().await.is_ok()
    }
}

/// Check required fields, reporting every missing or invalid one at once.
fn validate(input: CreatePatientRequest) -> Result<NewPatient, ServiceError> {
    let mut problems = Vec::new();

    let first_name = required(input.first_name, "firstName", &mut problems);
    let last_name = required(input.last_name, "lastName", &mut problems);
    let dob = required(input.dob, "dob", &mut problems);
    let ssn = required(input.ssn, "ssn", &mut problems);

    if !dob.is_empty() && !is_iso_date(&dob) {
        problems.push("dob (expected YYYY-MM-DD)");
    }

    if !problems.is_empty() {
        return Err(ServiceError::Validation(format!(
            "missing or invalid fields: {}",
            problems.join(", ")
        )));
    }

    Ok(NewPatient {
        first_name,
        last_name,
        dob,
        ssn,
        iv_key: String::new(),
    })
}

fn required(value: Option<String>, name: &'static str, problems: &mut Vec<&'static str>) -> String {
    match value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty()) {
        Some(v) => v,
        None => {
            problems.push(name);
            String::new()
        }
    }
}

fn is_iso_date(s: &str) -> bool {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}
