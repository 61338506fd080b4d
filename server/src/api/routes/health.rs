//! Health check endpoint

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::SqliteService;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Schema version of the execution store; absent when it cannot be reached
    pub schema_version: Option<i32>,
}

/// Health check endpoint
///
/// Pings the execution store by reading its schema version.
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Execution store unavailable", body = HealthResponse)
    )
)]
pub async fn health(
    State(database): State<Arc<SqliteService>>,
) -> (StatusCode, Json<HealthResponse>) {
    let (code, status, schema_version) = match database.schema_version().await {
        Ok(version) => (StatusCode::OK, "ok", Some(version)),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable", None)
        }
    };

    (
        code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            schema_version,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::schema::SCHEMA_VERSION;
    use crate::data::sqlite::test_support::test_pool;

    #[tokio::test]
    async fn test_reports_schema_version() {
        let database = Arc::new(SqliteService::from_pool(test_pool().await));

        let (code, Json(body)) = health(State(database)).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.schema_version, Some(SCHEMA_VERSION));
    }

    #[tokio::test]
    async fn test_closed_database_is_unavailable() {
        let database = Arc::new(SqliteService::from_pool(test_pool().await));
        database.close().await;

        let (code, Json(body)) = health(State(database)).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "unavailable");
        assert_eq!(body.schema_version, None);
    }
}
