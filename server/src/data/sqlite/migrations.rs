//! Database migration system
//!
//! Fresh databases receive the full `SCHEMA` at `SCHEMA_VERSION`. Existing
//! databases are stepped forward one version at a time, each step recorded in
//! `schema_migrations` with a checksum of the SQL that ran.

use sqlx::{Sqlite, SqlitePool, Transaction};

use super::error::SqliteError;
use super::schema::{SCHEMA, SCHEMA_VERSION};
use crate::utils::crypto::sha256_hex;

const MIGRATION_V2: &str =
    "CREATE INDEX IF NOT EXISTS idx_variables_name_type ON variables(name, var_type)";

const MIGRATION_V3: &str = "ALTER TABLE variables ADD COLUMN text_value_lower TEXT";

/// Run all pending migrations, returning the resulting schema version
pub async fn run_migrations(pool: &SqlitePool) -> Result<i32, SqliteError> {
    let table_exists: bool = sqlx::query_scalar(
        "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(pool)
    .await?;

    if !table_exists {
        tracing::debug!(version = SCHEMA_VERSION, "Initializing database schema");
        apply_initial_schema(pool).await?;
        return Ok(SCHEMA_VERSION);
    }

    let current_version: i32 =
        sqlx::query_scalar("SELECT version FROM schema_version WHERE id = 1")
            .fetch_optional(pool)
            .await?
            .unwrap_or(0);

    if current_version >= SCHEMA_VERSION {
        tracing::debug!(version = current_version, "Database schema is up to date");
        return Ok(current_version);
    }

    for version in (current_version + 1)..=SCHEMA_VERSION {
        tracing::debug!(version, "Applying migration");
        apply_migration(pool, version).await?;
    }

    Ok(SCHEMA_VERSION)
}

async fn apply_initial_schema(pool: &SqlitePool) -> Result<(), SqliteError> {
    let start = std::time::Instant::now();

    let mut tx = pool.begin().await?;

    sqlx::query(SCHEMA).execute(&mut *tx).await?;

    let now = chrono::Utc::now().timestamp_millis();
    sqlx::query(
        "INSERT INTO schema_version (id, version, applied_at, description) VALUES (1, ?, ?, 'Initial schema')",
    )
    .bind(SCHEMA_VERSION)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let checksum = sha256_hex(SCHEMA);
    let elapsed_ms = start.elapsed().as_millis() as i64;
    sqlx::query(
        "INSERT INTO schema_migrations (version, name, applied_at, checksum, execution_time_ms, success) VALUES (?, ?, ?, ?, ?, 1)",
    )
    .bind(SCHEMA_VERSION)
    .bind("initial_schema")
    .bind(now)
    .bind(&checksum)
    .bind(elapsed_ms)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::debug!(elapsed_ms, "Applied initial schema");
    Ok(())
}

async fn apply_migration(pool: &SqlitePool, version: i32) -> Result<(), SqliteError> {
    match version {
        // Covered by the initial schema
        1 => Ok(()),
        2 => apply_versioned_migration(pool, 2, "add_variable_name_type_index", MIGRATION_V2).await,
        3 => apply_text_value_lower_migration(pool).await,
        _ => Err(SqliteError::MigrationFailed {
            version,
            name: "unknown".to_string(),
            error: format!("Unknown migration version: {}", version),
        }),
    }
}

async fn apply_versioned_migration(
    pool: &SqlitePool,
    version: i32,
    name: &str,
    sql: &str,
) -> Result<(), SqliteError> {
    let start = std::time::Instant::now();

    let mut tx = pool.begin().await?;
    execute_statements(&mut tx, version, name, sql).await?;
    record_migration(&mut tx, version, name, sql, start).await?;
    tx.commit().await?;

    tracing::debug!(
        version,
        name,
        elapsed_ms = start.elapsed().as_millis() as i64,
        "Applied migration"
    );
    Ok(())
}

/// Adds `text_value_lower` and fills it for stored strings.
///
/// The fill runs here rather than in SQL because `LOWER()` only folds ASCII.
async fn apply_text_value_lower_migration(pool: &SqlitePool) -> Result<(), SqliteError> {
    const NAME: &str = "add_variable_text_value_lower";
    let start = std::time::Instant::now();

    let mut tx = pool.begin().await?;
    execute_statements(&mut tx, 3, NAME, MIGRATION_V3).await?;

    let rows: Vec<(String, String, String)> = sqlx::query_as(
        "SELECT execution_id, name, text_value FROM variables WHERE text_value IS NOT NULL",
    )
    .fetch_all(&mut *tx)
    .await?;
    for (execution_id, name, text) in &rows {
        sqlx::query(
            "UPDATE variables SET text_value_lower = ? WHERE execution_id = ? AND name = ?",
        )
        .bind(text.to_lowercase())
        .bind(execution_id)
        .bind(name)
        .execute(&mut *tx)
        .await?;
    }

    record_migration(&mut tx, 3, NAME, MIGRATION_V3, start).await?;
    tx.commit().await?;

    tracing::debug!(version = 3, backfilled = rows.len(), "Applied migration");
    Ok(())
}

async fn execute_statements(
    tx: &mut Transaction<'_, Sqlite>,
    version: i32,
    name: &str,
    sql: &str,
) -> Result<(), SqliteError> {
    for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        sqlx::query(statement)
            .execute(&mut **tx)
            .await
            .map_err(|e| SqliteError::MigrationFailed {
                version,
                name: name.to_string(),
                error: format!(
                    "Failed at statement: {} - {}",
                    &statement[..statement.len().min(50)],
                    e
                ),
            })?;
    }
    Ok(())
}

async fn record_migration(
    tx: &mut Transaction<'_, Sqlite>,
    version: i32,
    name: &str,
    sql: &str,
    start: std::time::Instant,
) -> Result<(), SqliteError> {
    let now = chrono::Utc::now().timestamp_millis();
    sqlx::query(
        "UPDATE schema_version SET version = ?, applied_at = ?, description = ? WHERE id = 1",
    )
    .bind(version)
    .bind(now)
    .bind(name)
    .execute(&mut **tx)
    .await?;

    let checksum = sha256_hex(sql);
    let elapsed_ms = start.elapsed().as_millis() as i64;
    sqlx::query(
        "INSERT INTO schema_migrations (version, name, applied_at, checksum, execution_time_ms, success) VALUES (?, ?, ?, ?, ?, 1)",
    )
    .bind(version)
    .bind(name)
    .bind(now)
    .bind(&checksum)
    .bind(elapsed_ms)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
