//! Shared API types
//!
//! Error responses and paging defaults used across all API endpoints.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::domain::executions::QueryError;
use crate::domain::executions::sort::SORT_PROCESS_INSTANCE_ID;

/// Start offset used when the client does not send one
pub const DEFAULT_START: u64 = 0;

/// Maximum length for path IDs
pub const MAX_ID_LENGTH: usize = 256;

pub fn default_start() -> u64 {
    DEFAULT_START
}

pub fn default_sort() -> String {
    SORT_PROCESS_INSTANCE_ID.to_string()
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    NotFound { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn from_data(e: crate::data::DataError) -> Self {
        tracing::error!(error = %e, "Data error");
        Self::internal("Database operation failed")
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        if e.is_client_error() {
            tracing::debug!(error = %e, "Rejected execution request");
        }
        match e {
            QueryError::InvalidFilter(message) => Self::bad_request("INVALID_FILTER", message),
            QueryError::InvalidSort(message) => Self::bad_request("INVALID_SORT", message),
            QueryError::NotFound(message) => Self::not_found("EXECUTION_NOT_FOUND", message),
            QueryError::Data(e) => Self::from_data(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code, message) = match self {
            Self::BadRequest { code, message } => {
                (StatusCode::BAD_REQUEST, "bad_request", code, message)
            }
            Self::NotFound { code, message } => (StatusCode::NOT_FOUND, "not_found", code, message),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": message
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::data::DataError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_invalid_filter_maps_to_bad_request() {
        let err: ApiError = QueryError::invalid_filter("Variable operation is missing").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "bad_request");
        assert_eq!(body["code"], "INVALID_FILTER");
        assert_eq!(body["message"], "Variable operation is missing");
    }

    #[tokio::test]
    async fn test_invalid_sort_code() {
        let err: ApiError = QueryError::invalid_sort("Cannot sort by: x").into();
        let body = body_json(err.into_response()).await;
        assert_eq!(body["code"], "INVALID_SORT");
    }

    #[tokio::test]
    async fn test_not_found_maps_to_404() {
        let err: ApiError = QueryError::not_found("gone").into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], "EXECUTION_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_data_error_hides_details() {
        let err: ApiError = QueryError::Data(DataError::Config("secret path".into())).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Database operation failed");
    }
}
