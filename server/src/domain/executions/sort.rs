//! Sorting and pagination bounds for execution queries

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::QueryError;

pub const SORT_PROCESS_DEFINITION_ID: &str = "processDefinitionId";
pub const SORT_PROCESS_DEFINITION_KEY: &str = "processDefinitionKey";
pub const SORT_PROCESS_INSTANCE_ID: &str = "processInstanceId";

/// Orderable execution property. Backends map each to a fixed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutionSortProperty {
    ProcessDefinitionId,
    ProcessDefinitionKey,
    ProcessInstanceId,
}

impl ExecutionSortProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProcessDefinitionId => SORT_PROCESS_DEFINITION_ID,
            Self::ProcessDefinitionKey => SORT_PROCESS_DEFINITION_KEY,
            Self::ProcessInstanceId => SORT_PROCESS_INSTANCE_ID,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping of client-facing sort names to orderable properties.
///
/// Built once at startup and shared read-only by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortWhitelist {
    allowed: BTreeMap<String, ExecutionSortProperty>,
}

impl Default for SortWhitelist {
    fn default() -> Self {
        Self::executions()
    }
}

impl SortWhitelist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, ExecutionSortProperty)>,
        S: Into<String>,
    {
        Self {
            allowed: entries
                .into_iter()
                .map(|(name, prop)| (name.into(), prop))
                .collect(),
        }
    }

    /// Whitelist used by the execution collection endpoints
    pub fn executions() -> Self {
        Self::new([
            (
                SORT_PROCESS_DEFINITION_ID,
                ExecutionSortProperty::ProcessDefinitionId,
            ),
            (
                SORT_PROCESS_DEFINITION_KEY,
                ExecutionSortProperty::ProcessDefinitionKey,
            ),
            (
                SORT_PROCESS_INSTANCE_ID,
                ExecutionSortProperty::ProcessInstanceId,
            ),
        ])
    }

    pub fn resolve(&self, field: &str) -> Result<ExecutionSortProperty, QueryError> {
        self.allowed.get(field).copied().ok_or_else(|| {
            QueryError::invalid_sort(format!(
                "Cannot sort by: {}. Allowed values: {}",
                field,
                self.fields().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.allowed.keys().map(String::as_str)
    }
}

/// Client-requested ordering and page bounds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortRequest {
    pub field: String,
    pub direction: SortDirection,
    pub offset: u64,
    pub limit: u32,
}

impl SortRequest {
    pub fn new(field: impl Into<String>, direction: SortDirection, offset: u64, limit: u32) -> Self {
        Self {
            field: field.into(),
            direction,
            offset,
            limit,
        }
    }
}

/// Resolved ordering handed to storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOrder {
    pub property: ExecutionSortProperty,
    pub direction: SortDirection,
}
