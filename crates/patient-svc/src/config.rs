//! Configuration loading and validation for the patient service.
//!
//! All values are read from environment variables at startup. The process will
//! exit with a clear error message if any required variable is missing or invalid.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use zeroize::Zeroize;

use crate::crypto::{Algorithm, EncryptionOptions, DEFAULT_IV_LEN};
use crate::store::sqlite::ConnectOptions;

/// A secret string that is redacted in `Debug` output and zeroed on drop.
#[derive(Clone, Deserialize)]
#[serde(transparent)]
pub struct SecretString(String);

impl SecretString {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for SecretString {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Secret used to derive the field-encryption key. **Required.**
    pub encryption_secret_key: SecretString,

    /// Cipher identifier; only `aes-256-cbc` is accepted.
    #[serde(default = "default_encryption_algorithm")]
    pub encryption_algorithm: String,

    /// IV length in bytes.
    #[serde(default = "default_encryption_iv_length")]
    pub encryption_iv_length: usize,

    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// SQLite URL. When absent the service runs on an in-memory store.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Maximum size of the database connection pool.
    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Database connection attempts before startup fails.
    #[serde(default = "default_db_max_retries")]
    pub db_max_retries: u32,

    /// Delay (milliseconds) between database connection attempts.
    #[serde(default = "default_db_retry_delay_ms")]
    pub db_retry_delay_ms: u64,

    /// HTTP header carrying the caller's user ID.
    #[serde(default = "default_caller_header")]
    pub caller_header_name: String,

    /// Insert demo users and patients at startup.
    #[serde(default)]
    pub seed_demo_data: bool,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional OTLP endpoint for span export.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_encryption_algorithm() -> String {
    Algorithm::Aes256Cbc.as_str().into()
}
fn default_encryption_iv_length() -> usize {
    DEFAULT_IV_LEN
}
fn default_port() -> u16 {
    3000
}
fn default_db_max_connections() -> u32 {
    5
}
fn default_db_max_retries() -> u32 {
    5
}
fn default_db_retry_delay_ms() -> u64 {
    5000
}
fn default_caller_header() -> String {
    "user-id".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if any required variable is absent or cannot be parsed.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.encryption_secret_key.expose().is_empty() {
            anyhow::bail!("ENCRYPTION_SECRET_KEY is required and must not be empty");
        }
        self.algorithm()?;
        if self.encryption_iv_length != DEFAULT_IV_LEN {
            anyhow::bail!("ENCRYPTION_IV_LENGTH must be {DEFAULT_IV_LEN} for {}", self.encryption_algorithm);
        }
        if let Some(url) = &self.database_url {
            ensure_non_empty(url, "DATABASE_URL")?;
        }
        if self.db_max_connections == 0 {
            anyhow::bail!("DB_MAX_CONNECTIONS must be > 0");
        }
        if self.db_max_retries == 0 {
            anyhow::bail!("DB_MAX_RETRIES must be > 0");
        }
        ensure_non_empty(&self.caller_header_name, "CALLER_HEADER_NAME")?;
        Ok(())
    }

    fn algorithm(&self) -> Result<Algorithm> {
        self.encryption_algorithm
            .parse()
            .context("ENCRYPTION_ALGORITHM is invalid")
    }

    /// Encryption parameters derived from this configuration.
    pub fn encryption_options(&self) -> Result<EncryptionOptions> {
        Ok(EncryptionOptions::new(self.encryption_secret_key.expose())
            .with_iv_length(self.encryption_iv_length)
            .with_algorithm(self.algorithm()?))
    }

    /// Database connection policy, or `None` when no `DATABASE_URL` is set.
    pub fn connect_options(&self) -> Option<ConnectOptions> {
        self.database_url.as_ref().map(|url| ConnectOptions {
            url: url.clone(),
            max_connections: self.db_max_connections,
            max_retries: self.db_max_retries,
            retry_delay: Duration::from_millis(self.db_retry_delay_ms),
        })
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> Config {
        Config {
            encryption_secret_key: "test".into(),
            encryption_algorithm: default_encryption_algorithm(),
            encryption_iv_length: default_encryption_iv_length(),
            port: default_port(),
            database_url: None,
            db_max_connections: default_db_max_connections(),
            db_max_retries: default_db_max_retries(),
            db_retry_delay_ms: default_db_retry_delay_ms(),
            caller_header_name: default_caller_header(),
            seed_demo_data: false,
            log_level: default_log_level(),
            otel_exporter_otlp_endpoint: None,
        }
    }

    #[test]
    fn defaults_are_correct() {
        assert_eq!(default_encryption_algorithm(), "aes-256-cbc");
        assert_eq!(default_encryption_iv_length(), 16);
        assert_eq!(default_port(), 3000);
        assert_eq!(default_db_max_connections(), 5);
        assert_eq!(default_db_max_retries(), 5);
        assert_eq!(default_db_retry_delay_ms(), 5000);
        assert_eq!(default_caller_header(), "user-id");
        assert_eq!(default_log_level(), "info");
    }

    #[test]
    fn validate_accepts_valid_config() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_secret() {
        let cfg = Config {
            encryption_secret_key: "".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_unknown_algorithm() {
        let cfg = Config {
            encryption_algorithm: "aes-256-gcm".into(),
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_wrong_iv_length() {
        let cfg = Config {
            encryption_iv_length: 12,
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_retries() {
        let cfg = Config {
            db_max_retries: 0,
            ..valid()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn debug_redacts_secret() {
        let cfg = Config {
            encryption_secret_key: "hunter2-hunter2".into(),
            ..valid()
        };
        let dbg = format!("{cfg:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("REDACTED"));
    }

    #[test]
    fn connect_options_follow_database_url() {
        assert!(valid().connect_options().is_none());
        let cfg = Config {
            database_url: Some("sqlite://patients.db".into()),
            db_retry_delay_ms: 250,
            ..valid()
        };
        let opts = cfg.connect_options().unwrap();
        assert_eq!(opts.url, "sqlite://patients.db");
        assert_eq!(opts.max_retries, 5);
        assert_eq!(opts.retry_delay, Duration::from_millis(250));
    }

    #[test]
    fn encryption_options_use_configured_secret() {
        let opts = valid().encryption_options().unwrap();
        assert_eq!(opts.key(), &crate::crypto::KeyMaterial::normalize("test"));
        assert_eq!(opts.iv_length, 16);
    }
}
