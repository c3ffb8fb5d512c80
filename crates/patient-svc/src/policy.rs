//! Role-based access policy for patient operations.
//!
//! | Operation           | ADMIN | BILLING | PROVIDER |
//! |---------------------|-------|---------|----------|
//! | list all patients   | allow | deny    | deny     |
//! | read one patient    | allow | allow   | deny     |
//! | create patient      | allow | allow   | deny     |
//!
//! Any role outside the table is denied everything.

use std::fmt;

use common::ServiceError;
use tracing::warn;

use crate::identity::Caller;

/// Caller role as stored by the user collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    Billing,
    Provider,
    /// Any stored value we do not recognise. Kept for audit logs.
    Unrecognised(String),
}

impl Role {
    /// Parse a stored role name. Never fails; unknown names are kept verbatim.
    pub fn parse(s: &str) -> Self {
        match s {
            "ADMIN" => Role::Admin,
            "BILLING" => Role::Billing,
            "PROVIDER" => Role::Provider,
            other => Role::Unrecognised(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => "ADMIN",
            Role::Billing => "BILLING",
            Role::Provider => "PROVIDER",
            Role::Unrecognised(s) => s,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations guarded by the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListPatients,
    ReadPatient,
    CreatePatient,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::ListPatients => "list all patients",
            Operation::ReadPatient => "read one patient",
            Operation::CreatePatient => "create patient",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Pure decision over the static role × operation matrix.
pub fn check(role: &Role, operation: Operation) -> Decision {
    use Operation::*;
    match (role, operation) {
        (Role::Admin, _) => Decision::Allow,
        (Role::Billing, ReadPatient | CreatePatient) => Decision::Allow,
        _ => Decision::Deny,
    }
}

/// Gate `operation` for `caller`, logging every denial for audit.
///
/// # Errors
///
/// Returns [`ServiceError::Authorization`] when [`check`] denies.
pub fn authorize(caller: &Caller, operation: Operation) -> Result<(), ServiceError> {
    match check(&caller.role, operation) {
        Decision::Allow => Ok(()),
        Decision::Deny => {
            warn!(
                caller_id = caller.id,
                role = %caller.role,
                operation = operation.as_str(),
                "caller is not authorized for operation"
            );
            Err(ServiceError::Authorization(
                "user is not authorized to access this resource".into(),
            ))
        }
    }
}
