//! Axum request handlers for all service endpoints.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use common::protocol::{CreatePatientRequest, ErrorResponse, HealthResponse};
use common::ServiceError;
use tracing::error;

use super::state::AppState;
use crate::policy::Operation;

/// `GET /api/patients` — list all patients with SSNs left encrypted.
pub async fn list_patients(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let caller = match caller_id(&headers, &state.caller_header_name) {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };

    match state.service.list(caller).await {
        Ok(patients) => (StatusCode::OK, Json(patients)).into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /api/patients/:id` — one patient with the SSN decrypted.
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let caller = match caller_id(&headers, &state.caller_header_name) {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };

    match state.service.get_by_id(caller, &id).await {
        Ok(patient) => (StatusCode::OK, Json(patient)).into_response(),
        Err(e) => error_response(e),
    }
}

/// `POST /api/patients` — create a patient; responds `201` with the stored record.
pub async fn create_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<CreatePatientRequest>, JsonRejection>,
) -> Response {
    let caller = match caller_id(&headers, &state.caller_header_name) {
        Ok(c) => c,
        Err(e) => return error_response(e),
    };

    let Json(req) = match body {
        Ok(b) => b,
        Err(rejection) => {
            // Body errors are only reported to callers allowed to create.
            if let Err(e) = state.service.authorize(caller, Operation::CreatePatient).await {
                return error_response(e);
            }
            return error_response(ServiceError::Validation(format!(
                "invalid request body: {}",
                rejection.body_text()
            )));
        }
    };

    match state.service.create(caller, req).await {
        Ok(patient) => (StatusCode::CREATED, Json(patient)).into_response(),
        Err(e) => error_response(e),
    }
}

/// `GET /health` — liveness and readiness check.
///
/// Returns `200 OK` when the storage collaborator answers.
/// Returns `503 Service Unavailable` otherwise.
pub async fn health(State(state): State<AppState>) -> Response {
    let storage_ready = state.service.storage_ready().await;

    let (status_code, status_str) = if storage_ready {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let body = HealthResponse {
        status: status_str.into(),
        storage_ready,
    };
    (status_code, Json(body)).into_response()
}

/// Catch-all 404 handler.
pub async fn not_found() -> impl IntoResponse {
    let err = ErrorResponse::new("not_found", "the requested resource does not exist");
    (StatusCode::NOT_FOUND, Json(err))
}

/// Read the caller ID header. Absence is not an error here; the service
/// decides how to treat a missing caller.
fn caller_id<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ServiceError> {
    headers
        .get(name)
        .map(|v| {
            v.to_str().map_err(|_| {
                ServiceError::Validation(format!("{name} header contains non-ASCII characters"))
            })
        })
        .transpose()
}

/// Render a [`ServiceError`] as a JSON error body.
///
/// Server faults (cipher or storage failures) are logged in full and reach
/// the caller only as a generic message.
fn error_response(err: ServiceError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let message = if err.is_server_fault() {
        error!(error = %err, "request failed");
        "internal server error".to_owned()
    } else {
        err.message().to_owned()
    };

    (status, Json(ErrorResponse::new(err.code(), message))).into_response()
}
