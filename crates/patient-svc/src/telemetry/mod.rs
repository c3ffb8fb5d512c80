//! Tracing setup: structured JSON logs, optionally exported via OTLP.
//!
//! # Telemetry invariants
//!
//! - **No SSN plaintext, ciphertext or key material** in any span attribute or
//!   log field. Audit events carry `caller_id`, `role` and `patient_id` only.
//! - Log level is configurable via `LOG_LEVEL` (default: `info`), overridden by
//!   `RUST_LOG` when set.

pub mod init;

pub use init::init_telemetry;
