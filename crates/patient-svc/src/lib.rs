//! `patient-svc` — patient records service with SSN field encryption and
//! role-based access control.
//!
//! The binary in `main.rs` wires these modules together; integration tests
//! drive the same router through [`server::router::build`].

pub mod codec;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod policy;
pub mod seed;
pub mod server;
pub mod service;
pub mod store;
pub mod telemetry;
