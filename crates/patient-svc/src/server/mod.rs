//! Axum HTTP server, routing, and middleware.
//!
//! # Responsibilities
//! - Define the Axum router with all routes and shared middleware.
//! - Read the caller ID header and hand it to [`crate::service::PatientService`].
//! - Map [`common::ServiceError`] to status codes and JSON error bodies.

pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;
