//! Caller identity: the user collaborator boundary and caller resolution.
//!
//! Authentication is out of scope; the caller ID arrives as an opaque,
//! caller-supplied header value and is trusted once it resolves to a user.

use async_trait::async_trait;
use common::ServiceError;
use tracing::warn;

use crate::policy::Role;
use crate::store::StoreError;

/// An identified caller and the role used for authorization decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub id: i64,
    pub role: Role,
}

/// User lookup collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// The user with `id`, or `None`.
    async fn find_user(&self, id: i64) -> Result<Option<Caller>, StoreError>;

    /// Insert a user keyed by `email` unless one already exists; return it.
    async fn upsert_user(&self, email: &str, name: &str, role: Role) -> Result<Caller, StoreError>;
}

/// Resolve the raw caller ID supplied with a request.
///
/// Runs before any authorization check.
///
/// # Errors
///
/// - [`ServiceError::Validation`] if `raw_id` is absent, blank or not an integer.
/// - [`ServiceError::NotFound`] if no user has that ID.
/// - [`ServiceError::Internal`] if the directory lookup itself fails.
pub async fn resolve_caller(
    directory: &dyn UserDirectory,
    raw_id: Option<&str>,
) -> Result<Caller, ServiceError> {
    let raw = match raw_id.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => raw,
        None => {
            warn!("caller identity is missing");
            return Err(ServiceError::Validation("user ID header is missing".into()));
        }
    };

    let id: i64 = raw
        .parse()
        .map_err(|_| ServiceError::Validation("user ID must be an integer".into()))?;

    directory
        .find_user(id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("user with id {id} not found")))
}
