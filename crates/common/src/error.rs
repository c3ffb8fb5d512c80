//! Common error types shared across crates.

use thiserror::Error;

/// Top-level service error type.
///
/// Variants map to HTTP status codes returned to callers:
/// - [`ServiceError::Validation`] → 400
/// - [`ServiceError::Authorization`] → 403
/// - [`ServiceError::NotFound`] → 404
/// - [`ServiceError::Encryption`], [`ServiceError::Decryption`],
///   [`ServiceError::Internal`] → 500
///
/// Messages must never carry the sensitive field's plaintext or key material.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Missing or malformed caller identity or input fields.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller is known but its role does not permit the operation.
    #[error("authorization error: {0}")]
    Authorization(String),

    /// The referenced entity (patient or caller) does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Encrypting the sensitive field failed.
    #[error("encryption failure: {0}")]
    Encryption(String),

    /// Decrypting the sensitive field failed.
    #[error("decryption failure: {0}")]
    Decryption(String),

    /// An unexpected internal error occurred (e.g. the storage collaborator failed).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Returns the HTTP status code that should be sent for this error.
    pub fn http_status(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 400,
            ServiceError::Authorization(_) => 403,
            ServiceError::NotFound(_) => 404,
            ServiceError::Encryption(_) => 500,
            ServiceError::Decryption(_) => 500,
            ServiceError::Internal(_) => 500,
        }
    }

    /// Short machine-readable code used in [`crate::protocol::ErrorResponse`].
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "bad_request",
            ServiceError::Authorization(_) => "forbidden",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::Encryption(_)
            | ServiceError::Decryption(_)
            | ServiceError::Internal(_) => "internal_error",
        }
    }

    /// The bare message, without the variant prefix used by `Display`.
    pub fn message(&self) -> &str {
        match self {
            ServiceError::Validation(m)
            | ServiceError::Authorization(m)
            | ServiceError::NotFound(m)
            | ServiceError::Encryption(m)
            | ServiceError::Decryption(m)
            | ServiceError::Internal(m) => m,
        }
    }

    /// `true` for server-side faults whose detail must not reach the caller.
    pub fn is_server_fault(&self) -> bool {
        self.http_status() >= 500
    }
}
