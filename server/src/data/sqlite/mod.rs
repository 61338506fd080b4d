//! SQLite database service
//!
//! Embedded store for executions, their variables and event subscriptions.
//! Configured for low-latency local use with:
//! - WAL mode for concurrent reads during writes
//! - In-memory temp storage for fast queries
//! - Periodic WAL checkpointing
//!
//! All schema definitions and migrations are managed here.

pub mod error;
mod migrations;
pub mod query;
pub mod repositories;
mod repository_impl;
pub mod schema;

pub use error::SqliteError;
pub use sqlx::SqlitePool;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use sqlx::ConnectOptions;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::log::LevelFilter;

use crate::core::constants::{
    SQLITE_BUSY_TIMEOUT_SECS, SQLITE_CACHE_SIZE, SQLITE_CHECKPOINT_INTERVAL_SECS,
    SQLITE_MAX_CONNECTIONS, SQLITE_WAL_AUTOCHECKPOINT,
};

/// SQLite database service
///
/// Created once at startup and shared by every request handler.
pub struct SqliteService {
    pool: SqlitePool,
}

impl SqliteService {
    /// Open (creating if missing) the database at `db_path` and migrate it
    pub async fn init(db_path: &Path) -> Result<Self, SqliteError> {
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(SQLITE_BUSY_TIMEOUT_SECS))
            .pragma("cache_size", SQLITE_CACHE_SIZE)
            .pragma("temp_store", "MEMORY")
            .pragma("wal_autocheckpoint", SQLITE_WAL_AUTOCHECKPOINT)
            .log_statements(LevelFilter::Trace);

        let pool = SqlitePoolOptions::new()
            .max_connections(SQLITE_MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        let version = migrations::run_migrations(&pool).await?;

        tracing::debug!(
            path = %db_path.display(),
            schema_version = version,
            "SqliteService initialized"
        );
        Ok(Self { pool })
    }

    /// Wrap an existing, already migrated pool
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Schema version recorded in the database
    pub async fn schema_version(&self) -> Result<i32, SqliteError> {
        let version = sqlx::query_scalar("SELECT version FROM schema_version WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(version)
    }

    pub async fn checkpoint(&self) -> Result<(), SqliteError> {
        sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(&self.pool)
            .await?;
        tracing::debug!("WAL checkpoint completed");
        Ok(())
    }

    /// Close the connection pool gracefully
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::debug!("SQLite pool closed");
    }

    pub fn start_checkpoint_task(
        self: &Arc<Self>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let db = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(SQLITE_CHECKPOINT_INTERVAL_SECS));
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::debug!("WAL checkpoint task shutting down");
                            break;
                        }
                    }
                    _ = interval.tick() => {
                        if let Err(e) = db.checkpoint().await {
                            tracing::warn!("WAL checkpoint failed: {}", e);
                        }
                    }
                }
            }
        })
    }
}

/// In-memory databases and seed data shared by tests across the crate
#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::BTreeMap;

    use sqlx::sqlite::SqlitePoolOptions;

    use super::SqlitePool;
    use super::repositories::{add_event_subscription, insert_execution, set_variables};
    use crate::data::types::{EventType, NewExecution};
    use crate::domain::executions::VariableValue;

    /// A migrated in-memory database. One connection keeps a single database.
    pub async fn test_pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        super::migrations::run_migrations(&pool).await.unwrap();
        pool
    }

    async fn set(pool: &SqlitePool, execution_id: &str, vars: &[(&str, VariableValue)]) {
        let vars: BTreeMap<String, VariableValue> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect();
        set_variables(pool, execution_id, &vars).await.unwrap();
    }

    /// Seed three process instances and two child executions.
    ///
    /// - `pi-1` invoice-approval, INV-1: amount=100 (long), customer="ACME"
    /// - `ex-1a` child of pi-1 at `review`: flag=true, message `paymentReceived`
    /// - `pi-2` invoice-approval, INV-2: amount=250 (long), customer="Globex"
    /// - `ex-2a` child of pi-2 at `approve`: signal `cancel`
    /// - `pi-3` order-fulfillment, ORD-1: amount=100 (integer)
    pub async fn seed_invoices(pool: &SqlitePool) {
        let pi1 = NewExecution::process_instance("pi-1", "invoice-approval", 1)
            .with_business_key("INV-1");
        let ex1a = NewExecution::child_of(&pi1, "ex-1a", "review");
        let pi2 = NewExecution::process_instance("pi-2", "invoice-approval", 1)
            .with_business_key("INV-2");
        let ex2a = NewExecution::child_of(&pi2, "ex-2a", "approve");
        let pi3 = NewExecution::process_instance("pi-3", "order-fulfillment", 2)
            .with_business_key("ORD-1");

        for execution in [&pi1, &ex1a, &pi2, &ex2a, &pi3] {
            insert_execution(pool, execution).await.unwrap();
        }

        set(
            pool,
            "pi-1",
            &[
                ("amount", VariableValue::Long(100)),
                ("customer", VariableValue::String("ACME".into())),
            ],
        )
        .await;
        set(pool, "ex-1a", &[("flag", VariableValue::Boolean(true))]).await;
        set(
            pool,
            "pi-2",
            &[
                ("amount", VariableValue::Long(250)),
                ("customer", VariableValue::String("Globex".into())),
            ],
        )
        .await;
        set(pool, "pi-3", &[("amount", VariableValue::Integer(100))]).await;

        add_event_subscription(pool, "ex-1a", EventType::Message, "paymentReceived")
            .await
            .unwrap();
        add_event_subscription(pool, "ex-2a", EventType::Signal, "cancel")
            .await
            .unwrap();
    }
}
