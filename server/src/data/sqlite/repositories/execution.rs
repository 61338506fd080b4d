//! Execution repository for SQLite operations

use sqlx::SqlitePool;

use crate::data::sqlite::SqliteError;
use crate::data::sqlite::query::{
    EXECUTION_COLUMNS, EXECUTION_FROM, SqlExecutionQuery, SqlParam, bind_params, order_by_sql,
};
use crate::data::types::{ExecutionRow, NewExecution};
use crate::domain::executions::{CompiledQuery, SortOrder};

type ExecutionTuple = (
    String,
    String,
    Option<String>,
    String,
    String,
    Option<String>,
    Option<String>,
    bool,
    bool,
);

fn into_row(t: ExecutionTuple) -> ExecutionRow {
    ExecutionRow {
        id: t.0,
        process_instance_id: t.1,
        parent_id: t.2,
        process_definition_id: t.3,
        process_definition_key: t.4,
        business_key: t.5,
        activity_id: t.6,
        is_active: t.7,
        suspended: t.8,
    }
}

fn render(query: &CompiledQuery) -> (String, Vec<SqlParam>) {
    let mut builder = SqlExecutionQuery::new();
    query.apply(&mut builder);
    builder.render()
}

/// Insert a new execution
pub async fn insert_execution(
    pool: &SqlitePool,
    execution: &NewExecution,
) -> Result<ExecutionRow, SqliteError> {
    let now = chrono::Utc::now().timestamp_millis();

    sqlx::query(
        r#"
        INSERT INTO executions (id, process_instance_id, parent_id, process_definition_id,
                                process_definition_key, business_key, activity_id, is_active,
                                suspended, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?, ?)
        "#,
    )
    .bind(&execution.id)
    .bind(execution.instance_id())
    .bind(&execution.parent_id)
    .bind(&execution.process_definition_id)
    .bind(&execution.process_definition_key)
    .bind(&execution.business_key)
    .bind(&execution.activity_id)
    .bind(execution.suspended)
    .bind(now)
    .execute(pool)
    .await?;

    get_execution(pool, &execution.id).await?.ok_or_else(|| {
        SqliteError::InvalidData(format!("Execution {} vanished after insert", execution.id))
    })
}

/// Get an execution by ID
pub async fn get_execution(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<ExecutionRow>, SqliteError> {
    let sql = format!(
        "SELECT {} FROM {} WHERE e.id = ?",
        EXECUTION_COLUMNS, EXECUTION_FROM
    );
    let row: Option<ExecutionTuple> = sqlx::query_as(&sql).bind(id).fetch_optional(pool).await?;
    Ok(row.map(into_row))
}

/// Count executions matching a compiled query
pub async fn count_executions(
    pool: &SqlitePool,
    query: &CompiledQuery,
) -> Result<u64, SqliteError> {
    let (where_sql, params) = render(query);
    let sql = format!("SELECT COUNT(*) FROM {}{}", EXECUTION_FROM, where_sql);

    let (count,): (i64,) = bind_params(sqlx::query_as(&sql), &params)
        .fetch_one(pool)
        .await?;
    Ok(count.max(0) as u64)
}

/// List one page of executions matching a compiled query
pub async fn list_executions(
    pool: &SqlitePool,
    query: &CompiledQuery,
    order: SortOrder,
    offset: u64,
    limit: u32,
) -> Result<Vec<ExecutionRow>, SqliteError> {
    let (where_sql, params) = render(query);
    let sql = format!(
        "SELECT {} FROM {}{}{} LIMIT ? OFFSET ?",
        EXECUTION_COLUMNS,
        EXECUTION_FROM,
        where_sql,
        order_by_sql(order)
    );
    tracing::trace!(sql = %sql, params = params.len(), "Listing executions");

    let rows: Vec<ExecutionTuple> = bind_params(sqlx::query_as(&sql), &params)
        .bind(i64::from(limit))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .fetch_all(pool)
        .await?;

    Ok(rows.into_iter().map(into_row).collect())
}
