//! `patient-svc` binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline (OTEL + tracing).
//! 3. Build the encryption options and SSN codec.
//! 4. Connect the storage collaborator (SQLite, or in-memory without `DATABASE_URL`).
//! 5. Seed demo users and patients when `SEED_DEMO_DATA` is set.
//! 6. Build the Axum router and start the HTTP server.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use patient_svc::codec::SensitiveFieldCodec;
use patient_svc::config::Config;
use patient_svc::identity::UserDirectory;
use patient_svc::server::{self, state::AppState};
use patient_svc::service::PatientService;
use patient_svc::store::{InMemoryStore, PatientStore, SqliteStore};
use patient_svc::{seed, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otel_exporter_otlp_endpoint.as_deref(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        port = cfg.port,
        "patient-svc starting"
    );

    // -----------------------------------------------------------------------
    // 3. Encryption
    // -----------------------------------------------------------------------
    let options = cfg.encryption_options()?;
    info!(algorithm = options.algorithm.as_str(), "field encryption configured");
    let codec = SensitiveFieldCodec::new(options);

    // -----------------------------------------------------------------------
    // 4. Storage
    // -----------------------------------------------------------------------
    let (patients, users): (Arc<dyn PatientStore>, Arc<dyn UserDirectory>) =
        match cfg.connect_options() {
            Some(opts) => {
                let store = SqliteStore::connect(&opts)
                    .await
                    .context("database unavailable")?;
                (Arc::new(store.clone()), Arc::new(store))
            }
            None => {
                warn!("DATABASE_URL not set; records are kept in memory and lost on exit");
                let store = InMemoryStore::new();
                (Arc::new(store.clone()), Arc::new(store))
            }
        };

    // -----------------------------------------------------------------------
    // 5. Demo data
    // -----------------------------------------------------------------------
    if cfg.seed_demo_data {
        seed::seed_demo_data(users.as_ref(), patients.as_ref(), &codec).await?;
    }

    // -----------------------------------------------------------------------
    // 6. HTTP server
    // -----------------------------------------------------------------------
    let service = PatientService::new(patients, users, codec);
    let state = AppState::new(service, cfg.caller_header_name.clone());
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
