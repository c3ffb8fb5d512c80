//! Request and response types exchanged with callers of the patient API.
//!
//! Field names are camelCase on the wire (`firstName`, `ivKey`, ...).

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Create endpoint
// ---------------------------------------------------------------------------

/// Request body for `POST /api/patients`.
///
/// Every field is optional at the deserialisation layer so that validation can
/// report all missing fields at once instead of failing on the first one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Date of birth, `YYYY-MM-DD`.
    pub dob: Option<String>,
    /// Plaintext national identity number. Encrypted before storage.
    pub ssn: Option<String>,
}

/// A patient record exactly as persisted: `ssn` is ciphertext (hex) and
/// `iv_key` is the hex IV used to produce it.
///
/// Returned by `POST /api/patients`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPatient {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub dob: String,
    pub ssn: String,
    pub iv_key: String,
}

// ---------------------------------------------------------------------------
// Read endpoints
// ---------------------------------------------------------------------------

/// Element of the `GET /api/patients` response.
///
/// `ssn` is the stored ciphertext; the IV and date of birth are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub ssn: String,
}

/// Response body for `GET /api/patients/:id`, with `ssn` decrypted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientView {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub ssn: String,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Overall service status: `"ok"` or `"degraded"`.
    pub status: String,
    /// Whether the storage collaborator answered the last probe.
    pub storage_ready: bool,
}
