//! Execution API types

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::types::{default_sort, default_start};
use crate::domain::executions::SortDirection;

/// Paging and sorting parameters of the execution query endpoint
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ExecutionPageQuery {
    /// Zero-based offset of the first item
    #[serde(default = "default_start")]
    pub start: u64,

    /// Page size; falls back to the configured default
    #[validate(range(min = 1, message = "Page size must be greater than 0"))]
    pub size: Option<u32>,

    /// Sort field name
    #[serde(default = "default_sort")]
    #[validate(length(min = 1, max = 64, message = "Sort must be 1-64 characters"))]
    pub sort: String,

    #[serde(default)]
    pub order: SortDirection,
}
