//! Execution query errors

use thiserror::Error;

use crate::data::DataError;

/// Errors raised while compiling, paginating or looking up executions.
///
/// `InvalidFilter`, `InvalidSort` and `NotFound` are deterministic functions of
/// the client input and are never retried. `Data` carries storage failures
/// unchanged.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("{0}")]
    InvalidFilter(String),

    #[error("{0}")]
    InvalidSort(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Data error: {0}")]
    Data(#[from] DataError),
}

impl QueryError {
    pub fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter(message.into())
    }

    pub fn invalid_sort(message: impl Into<String>) -> Self {
        Self::InvalidSort(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// True for errors caused by the request rather than the backend
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Data(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_bare_message() {
        let err = QueryError::invalid_filter("Variable value is missing for variable: amount");
        assert_eq!(
            err.to_string(),
            "Variable value is missing for variable: amount"
        );
    }

    #[test]
    fn test_client_errors() {
        assert!(QueryError::invalid_filter("x").is_client_error());
        assert!(QueryError::invalid_sort("x").is_client_error());
        assert!(QueryError::not_found("x").is_client_error());
        assert!(!QueryError::Data(DataError::Config("bad".into())).is_client_error());
    }
}
