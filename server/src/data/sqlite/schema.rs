//! SQLite schema definitions
//!
//! `SCHEMA` always describes the latest version. Older databases are brought
//! forward by the incremental migrations in `migrations.rs`.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 3;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    applied_at INTEGER NOT NULL,
    checksum TEXT NOT NULL,
    execution_time_ms INTEGER,
    success INTEGER NOT NULL DEFAULT 1
);

-- =============================================================================
-- 1. Executions (process instances are executions with id = process_instance_id)
-- =============================================================================
CREATE TABLE IF NOT EXISTS executions (
    id TEXT PRIMARY KEY,
    process_instance_id TEXT NOT NULL,
    parent_id TEXT REFERENCES executions(id) ON DELETE CASCADE,
    process_definition_id TEXT NOT NULL,
    process_definition_key TEXT NOT NULL,
    business_key TEXT,
    activity_id TEXT,
    is_active INTEGER NOT NULL DEFAULT 1,
    suspended INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_executions_process_instance ON executions(process_instance_id);
CREATE INDEX IF NOT EXISTS idx_executions_definition_key ON executions(process_definition_key);
CREATE INDEX IF NOT EXISTS idx_executions_business_key ON executions(business_key);

-- =============================================================================
-- 2. Variables (one typed column set per row, selected by var_type)
--    text_value_lower holds the Unicode lowercase of text_value, since
--    SQLite's LOWER() only folds ASCII.
-- =============================================================================
CREATE TABLE IF NOT EXISTS variables (
    execution_id TEXT NOT NULL REFERENCES executions(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    var_type TEXT NOT NULL,
    text_value TEXT,
    text_value_lower TEXT,
    long_value INTEGER,
    double_value REAL,
    updated_at INTEGER NOT NULL,
    PRIMARY KEY (execution_id, name)
);

CREATE INDEX IF NOT EXISTS idx_variables_name_type ON variables(name, var_type);

-- =============================================================================
-- 3. Event subscriptions
-- =============================================================================
CREATE TABLE IF NOT EXISTS event_subscriptions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    execution_id TEXT NOT NULL REFERENCES executions(id) ON DELETE CASCADE,
    event_type TEXT NOT NULL CHECK(event_type IN ('message', 'signal')),
    event_name TEXT NOT NULL,
    created_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_event_subscriptions_lookup
    ON event_subscriptions(event_type, event_name);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[allow(clippy::assertions_on_constants)]
    fn test_schema_version_is_positive() {
        assert!(SCHEMA_VERSION > 0);
    }

    #[test]
    fn test_schema_contains_required_tables() {
        let required_tables = [
            "schema_version",
            "schema_migrations",
            "executions",
            "variables",
            "event_subscriptions",
        ];

        for table in required_tables {
            assert!(
                SCHEMA.contains(&format!("CREATE TABLE IF NOT EXISTS {}", table)),
                "Schema missing table: {}",
                table
            );
        }
    }

    #[test]
    fn test_schema_contains_migrated_objects() {
        assert!(SCHEMA.contains("idx_variables_name_type"));
        assert!(SCHEMA.contains("text_value_lower TEXT"));
    }
}
