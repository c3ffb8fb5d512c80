//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::service::PatientService;

/// Application state shared across all request handlers.
///
/// All fields are cheaply cloneable (`Arc`-wrapped or already `Arc`-backed) so
/// that Axum can clone the state for each request without copying expensive data.
#[derive(Clone)]
pub struct AppState {
    /// Patient operations with access control and SSN protection.
    pub service: PatientService,
    /// Name of the HTTP header carrying the caller's user ID.
    pub caller_header_name: Arc<String>,
}

impl AppState {
    /// Create a new [`AppState`] with the provided service and header name.
    pub fn new(service: PatientService, caller_header_name: String) -> Self {
        Self {
            service,
            caller_header_name: Arc::new(caller_header_name),
        }
    }
}
