//! Repository traits for database backends
//!
//! Handlers and the domain layer talk to storage only through these traits.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::types::ExecutionRow;
use crate::domain::executions::{CompiledQuery, SortOrder, VariableValue};

/// Repository trait for runtime executions
#[async_trait]
pub trait ExecutionRepository: Send + Sync {
    /// Count executions matching `query`, ignoring pagination
    async fn count_executions(&self, query: &CompiledQuery) -> Result<u64, DataError>;

    /// List one page of executions matching `query`
    async fn list_executions(
        &self,
        query: &CompiledQuery,
        order: SortOrder,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<ExecutionRow>, DataError>;

    /// Get a single execution by ID
    async fn get_execution(&self, id: &str) -> Result<Option<ExecutionRow>, DataError>;

    /// Create or overwrite local variables of an execution
    async fn set_variables(
        &self,
        execution_id: &str,
        variables: &BTreeMap<String, VariableValue>,
    ) -> Result<(), DataError>;

    /// All local variables of an execution, by name
    async fn get_variables(
        &self,
        execution_id: &str,
    ) -> Result<BTreeMap<String, VariableValue>, DataError>;
}
