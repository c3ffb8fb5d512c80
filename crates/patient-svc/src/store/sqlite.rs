//! [`SqliteStore`]: relational storage collaborator backed by `sqlx`.
//!
//! Connection establishment retries with a fixed delay, bounded by
//! [`ConnectOptions::max_retries`]. Once connected, the pool handles its own
//! reconnects; no query is retried.

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{error, info, warn};

use super::{NewPatient, PatientRecord, PatientStore, StoreError};
use crate::identity::{Caller, UserDirectory};
use crate::policy::Role;

/// Connection and reconnection policy for [`SqliteStore::connect`].
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    /// sqlx SQLite URL, e.g. `sqlite://data/patients.db` or `sqlite::memory:`.
    pub url: String,
    pub max_connections: u32,
    /// Connection attempts before giving up. `0` is treated as `1`.
    pub max_retries: u32,
    pub retry_delay: Duration,
}

/// Patient and user tables in a SQLite database.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect (with retries) and create the schema if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Database`] if the URL is malformed or the schema
    /// cannot be created, and [`StoreError::Unavailable`] once every
    /// connection attempt has failed.
    pub async fn connect(opts: &ConnectOptions) -> Result<Self, StoreError> {
        let connect_opts = SqliteConnectOptions::from_str(&opts.url)?.create_if_missing(true);
        let max_attempts = opts.max_retries.max(1);

        let mut attempt = 0;
        let pool = loop {
            attempt += 1;
            match SqlitePoolOptions::new()
                .max_connections(opts.max_connections)
                .connect_with(connect_opts.clone())
                .await
            {
                Ok(pool) => break pool,
                Err(e) if attempt < max_attempts => {
                    warn!(attempt, max_attempts, error = %e, "database connection attempt failed; retrying");
                    tokio::time::sleep(opts.retry_delay).await;
                }
                Err(e) => {
                    error!(attempt, error = %e, "giving up on database connection");
                    return Err(StoreError::Unavailable(format!(
                        "failed to connect to database after {attempt} attempts"
                    )));
                }
            }
        };

        info!(attempt, "connected to database");
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and create the schema if it does not exist.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StoreError> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                role TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS patients (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                dob TEXT NOT NULL,
                ssn TEXT NOT NULL,
                iv_key TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

fn patient_from_row(row: &SqliteRow) -> Result<PatientRecord, StoreError> {
    Ok(PatientRecord {
        id: row.try_get("id")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        dob: row.try_get("dob")?,
        ssn: row.try_get("ssn")?,
        iv_key: row.try_get("iv_key")?,
    })
}

fn caller_from_row(row: &SqliteRow) -> Result<Caller, StoreError> {
    let role: String = row.try_get("role")?;
    Ok(Caller {
        id: row.try_get("id")?,
        role: Role::parse(&role),
    })
}

#[async_trait]
impl PatientStore for SqliteStore {
    async fn find_all(&self) -> Result<Vec<PatientRecord>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, first_name, last_name, dob, ssn, iv_key FROM patients ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(patient_from_row).collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<PatientRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, dob, ssn, iv_key FROM patients WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(patient_from_row).transpose()
    }

    async fn insert(&self, patient: NewPatient) -> Result<PatientRecord, StoreError> {
        let result = sqlx::query(
            "INSERT INTO patients (first_name, last_name, dob, ssn, iv_key) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&patient.first_name)
        .bind(&patient.last_name)
        .bind(&patient.dob)
        .bind(&patient.ssn)
        .bind(&patient.iv_key)
        .execute(&self.pool)
        .await?;

        Ok(PatientRecord::with_id(result.last_insert_rowid(), patient))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserDirectory for SqliteStore {
    async fn find_user(&self, id: i64) -> Result<Option<Caller>, StoreError> {
        let row = sqlx::query("SELECT id, role FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(caller_from_row).transpose()
    }

    async fn upsert_user(&self, email: &str, name: &str, role: Role) -> Result<Caller, StoreError> {
        sqlx::query(
            "INSERT INTO users (email, name, role) VALUES (?, ?, ?) ON CONFLICT(email) DO NOTHING",
        )
        .bind(email)
        .bind(name)
        .bind(role.as_str())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query("SELECT id, role FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;

        caller_from_row(&row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn memory_store() -> SqliteStore {
        // A single connection keeps every query on the same in-memory database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        SqliteStore::from_pool(pool).await.unwrap()
    }

    fn new_patient(ssn: &str, iv_key: &str) -> NewPatient {
        NewPatient {
            first_name: "test first 1".into(),
            last_name: "test Last 1".into(),
            dob: "2022-09-27".into(),
            ssn: ssn.into(),
            iv_key: iv_key.into(),
        }
    }

    #[tokio::test]
    async fn insert_and_fetch_round_trip() {
        let store = memory_store().await;
        let inserted = store
            .insert(new_patient("edd03a3df18acb5f3f1c41cc1959d3db", "000102030405060708090a0b0c0d0e0f"))
            .await
            .unwrap();
        assert_eq!(inserted.id, 1);

        let fetched = store.find_by_id(inserted.id).await.unwrap().unwrap();
        assert_eq!(fetched, inserted);
        assert_eq!(fetched.ssn, "edd03a3df18acb5f3f1c41cc1959d3db");
        assert_eq!(fetched.iv_key, "000102030405060708090a0b0c0d0e0f");
    }

    #[tokio::test]
    async fn find_all_orders_by_id() {
        let store = memory_store().await;
        store.insert(new_patient("aa", "01")).await.unwrap();
        store.insert(new_patient("bb", "02")).await.unwrap();
        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].ssn, "aa");
        assert_eq!(all[1].ssn, "bb");
    }

    #[tokio::test]
    async fn missing_patient_is_none() {
        let store = memory_store().await;
        assert!(store.find_by_id(404).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn upsert_user_keeps_first_role() {
        let store = memory_store().await;
        let billing = store.upsert_user("test1@user.com", "test 1", Role::Billing).await.unwrap();
        let again = store.upsert_user("test1@user.com", "test 1", Role::Admin).await.unwrap();
        assert_eq!(billing, again);
        assert_eq!(store.find_user(billing.id).await.unwrap().unwrap().role, Role::Billing);
    }

    #[tokio::test]
    async fn unknown_role_text_is_unrecognised() {
        let store = memory_store().await;
        sqlx::query("INSERT INTO users (email, name, role) VALUES ('n@x', 'n', 'NURSE')")
            .execute(&store.pool)
            .await
            .unwrap();
        let caller = store.find_user(1).await.unwrap().unwrap();
        assert_eq!(caller.role, Role::Unrecognised("NURSE".into()));
    }

    #[tokio::test]
    async fn ping_succeeds_on_live_pool() {
        let store = memory_store().await;
        assert!(store.ping().await.is_ok());
    }

    #[tokio::test]
    async fn connect_gives_up_after_max_retries() {
        let opts = ConnectOptions {
            url: "sqlite:///nonexistent-dir/definitely/missing.db".into(),
            max_connections: 1,
            max_retries: 2,
            retry_delay: Duration::from_millis(1),
        };
        let err = SqliteStore::connect(&opts).await.unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }
}
