//! Variable repository for SQLite operations
//!
//! Each variable is one row. `var_type` selects which typed column holds the
//! value: strings in `text_value`, integral values, booleans and dates (epoch
//! millis) in `long_value`, doubles in `double_value`. Null values leave all
//! three columns empty. Strings also keep their Unicode lowercase form in
//! `text_value_lower` for case-insensitive matching.

use std::collections::BTreeMap;

use chrono::DateTime;
use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::domain::executions::VariableValue;
use crate::domain::executions::variables::{
    TYPE_BOOLEAN, TYPE_DATE, TYPE_DOUBLE, TYPE_INTEGER, TYPE_LONG, TYPE_NULL, TYPE_SHORT,
    TYPE_STRING,
};

type Columns = (Option<String>, Option<i64>, Option<f64>);

fn encode(value: &VariableValue) -> Columns {
    match value {
        VariableValue::String(s) => (Some(s.clone()), None, None),
        VariableValue::Integer(v) => (None, Some(i64::from(*v)), None),
        VariableValue::Short(v) => (None, Some(i64::from(*v)), None),
        VariableValue::Long(v) => (None, Some(*v), None),
        VariableValue::Double(v) => (None, None, Some(*v)),
        VariableValue::Boolean(v) => (None, Some(i64::from(*v)), None),
        VariableValue::Date(d) => (None, Some(d.timestamp_millis()), None),
        VariableValue::Null => (None, None, None),
    }
}

fn decode(name: &str, var_type: &str, columns: Columns) -> Result<VariableValue, SqliteError> {
    let (text, long, double) = columns;
    let invalid = || {
        SqliteError::InvalidData(format!(
            "Variable '{}' of type '{}' has no usable value",
            name, var_type
        ))
    };

    let value = match var_type {
        TYPE_NULL => VariableValue::Null,
        TYPE_STRING => VariableValue::String(text.ok_or_else(invalid)?),
        TYPE_INTEGER => long
            .and_then(|v| i32::try_from(v).ok())
            .map(VariableValue::Integer)
            .ok_or_else(invalid)?,
        TYPE_SHORT => long
            .and_then(|v| i16::try_from(v).ok())
            .map(VariableValue::Short)
            .ok_or_else(invalid)?,
        TYPE_LONG => VariableValue::Long(long.ok_or_else(invalid)?),
        TYPE_DOUBLE => VariableValue::Double(double.ok_or_else(invalid)?),
        TYPE_BOOLEAN => VariableValue::Boolean(long.ok_or_else(invalid)? != 0),
        TYPE_DATE => long
            .and_then(DateTime::from_timestamp_millis)
            .map(VariableValue::Date)
            .ok_or_else(invalid)?,
        other => {
            return Err(SqliteError::InvalidData(format!(
                "Unknown variable type '{}' for variable '{}'",
                other, name
            )));
        }
    };
    Ok(value)
}

/// Create or overwrite variables of an execution in a single transaction
pub async fn set_variables(
    pool: &SqlitePool,
    execution_id: &str,
    variables: &BTreeMap<String, VariableValue>,
) -> Result<(), SqliteError> {
    let now = chrono::Utc::now().timestamp_millis();
    let mut tx = pool.begin().await?;

    for (name, value) in variables {
        let (text, long, double) = encode(value);
        let text_lower = text.as_deref().map(str::to_lowercase);
        sqlx::query(
            r#"
            INSERT INTO variables (execution_id, name, var_type, text_value, text_value_lower,
                                   long_value, double_value, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(execution_id, name) DO UPDATE SET
                var_type = excluded.var_type,
                text_value = excluded.text_value,
                text_value_lower = excluded.text_value_lower,
                long_value = excluded.long_value,
                double_value = excluded.double_value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(execution_id)
        .bind(name)
        .bind(value.type_name())
        .bind(text)
        .bind(text_lower)
        .bind(long)
        .bind(double)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    tracing::debug!(execution_id, count = variables.len(), "Variables stored");
    Ok(())
}

/// All variables of an execution, by name
pub async fn get_variables(
    pool: &SqlitePool,
    execution_id: &str,
) -> Result<BTreeMap<String, VariableValue>, SqliteError> {
    let rows: Vec<(String, String, Option<String>, Option<i64>, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT name, var_type, text_value, long_value, double_value
        FROM variables
        WHERE execution_id = ?
        ORDER BY name
        "#,
    )
    .bind(execution_id)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(|(name, var_type, text, long, double)| {
            let value = decode(&name, &var_type, (text, long, double))?;
            Ok((name, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::data::sqlite::repositories::execution::insert_execution;
    use crate::data::sqlite::test_support::test_pool;
    use crate::data::types::NewExecution;

    async fn pool_with_execution() -> SqlitePool {
        let pool = test_pool().await;
        insert_execution(&pool, &NewExecution::process_instance("pi-1", "p", 1))
            .await
            .unwrap();
        pool
    }

    #[tokio::test]
    async fn test_set_and_get_all_types() {
        let pool = pool_with_execution().await;
        let due = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

        let mut vars = BTreeMap::new();
        vars.insert("s".to_string(), VariableValue::String("text".into()));
        vars.insert("i".to_string(), VariableValue::Integer(-7));
        vars.insert("sh".to_string(), VariableValue::Short(12));
        vars.insert("l".to_string(), VariableValue::Long(9_000_000_000));
        vars.insert("d".to_string(), VariableValue::Double(2.5));
        vars.insert("b".to_string(), VariableValue::Boolean(false));
        vars.insert("due".to_string(), VariableValue::Date(due));
        vars.insert("n".to_string(), VariableValue::Null);

        set_variables(&pool, "pi-1", &vars).await.unwrap();
        let stored = get_variables(&pool, "pi-1").await.unwrap();
        assert_eq!(stored, vars);
    }

    #[tokio::test]
    async fn test_overwrite_changes_type() {
        let pool = pool_with_execution().await;

        let mut vars = BTreeMap::new();
        vars.insert("amount".to_string(), VariableValue::Long(100));
        set_variables(&pool, "pi-1", &vars).await.unwrap();

        vars.insert("amount".to_string(), VariableValue::String("lots".into()));
        set_variables(&pool, "pi-1", &vars).await.unwrap();

        let stored = get_variables(&pool, "pi-1").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored["amount"], VariableValue::String("lots".into()));
    }

    #[tokio::test]
    async fn test_strings_store_unicode_lowercase() {
        let pool = pool_with_execution().await;

        let mut vars = BTreeMap::new();
        vars.insert("city".to_string(), VariableValue::String("ÅRHUS".into()));
        vars.insert("count".to_string(), VariableValue::Long(3));
        set_variables(&pool, "pi-1", &vars).await.unwrap();

        let lowered: Vec<Option<String>> =
            sqlx::query_scalar("SELECT text_value_lower FROM variables ORDER BY name")
                .fetch_all(&pool)
                .await
                .unwrap();
        assert_eq!(lowered, vec![Some("århus".to_string()), None]);
    }

    #[tokio::test]
    async fn test_unknown_execution_rejected_by_foreign_key() {
        let pool = test_pool().await;
        let mut vars = BTreeMap::new();
        vars.insert("x".to_string(), VariableValue::Long(1));
        assert!(set_variables(&pool, "ghost", &vars).await.is_err());
    }

    #[test]
    fn test_decode_rejects_unknown_type() {
        let err = decode("x", "serializable", (None, None, None)).unwrap_err();
        assert!(matches!(err, SqliteError::InvalidData(_)));
    }

    #[test]
    fn test_decode_rejects_missing_column() {
        assert!(decode("x", TYPE_LONG, (Some("1".into()), None, None)).is_err());
        assert!(decode("x", TYPE_SHORT, (None, Some(70_000), None)).is_err());
    }
}
