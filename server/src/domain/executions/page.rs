//! Page assembly for execution queries

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::QueryError;
use super::query::CompiledQuery;
use super::sort::{SortDirection, SortOrder, SortRequest, SortWhitelist};
use crate::data::{ExecutionRepository, ExecutionRow};

/// Client-facing projection of an execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionView {
    pub id: String,
    pub process_instance_id: String,
    pub process_definition_id: String,
    pub process_definition_key: String,
    /// Business key of the owning process instance
    pub business_key: Option<String>,
    pub parent_id: Option<String>,
    pub activity_id: Option<String>,
    pub suspended: bool,
}

impl From<ExecutionRow> for ExecutionView {
    fn from(row: ExecutionRow) -> Self {
        Self {
            id: row.id,
            process_instance_id: row.process_instance_id,
            process_definition_id: row.process_definition_id,
            process_definition_key: row.process_definition_key,
            business_key: row.business_key,
            parent_id: row.parent_id,
            activity_id: row.activity_id,
            suspended: row.suspended,
        }
    }
}

/// One page of results plus the total match count
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub data: Vec<T>,
    /// Matches ignoring pagination
    pub total: u64,
    pub start: u64,
    pub sort: String,
    pub order: SortDirection,
    /// Requested page size
    pub size: u32,
}

/// Validates sorting and runs a compiled query against a repository
#[derive(Debug, Clone, Default)]
pub struct PageAssembler {
    whitelist: SortWhitelist,
}

impl PageAssembler {
    pub fn new(whitelist: SortWhitelist) -> Self {
        Self { whitelist }
    }

    /// Resolve `sort` and fetch one page.
    ///
    /// Sort validation happens before the repository is touched.
    pub async fn assemble(
        &self,
        repo: &dyn ExecutionRepository,
        query: &CompiledQuery,
        sort: &SortRequest,
    ) -> Result<Page<ExecutionView>, QueryError> {
        let property = self.whitelist.resolve(&sort.field).inspect_err(|e| {
            tracing::debug!(field = %sort.field, error = %e, "Rejected sort field");
        })?;
        if sort.limit == 0 {
            return Err(QueryError::invalid_sort("Page size must be greater than 0"));
        }
        let order = SortOrder {
            property,
            direction: sort.direction,
        };

        let total = repo.count_executions(query).await?;
        let rows = if sort.offset >= total {
            Vec::new()
        } else {
            repo.list_executions(query, order, sort.offset, sort.limit)
                .await?
        };

        tracing::debug!(
            sort = %sort.field,
            order = %sort.direction,
            offset = sort.offset,
            limit = sort.limit,
            total,
            returned = rows.len(),
            "Assembled execution page"
        );

        Ok(Page {
            data: rows.into_iter().map(ExecutionView::from).collect(),
            total,
            start: sort.offset,
            sort: sort.field.clone(),
            order: sort.direction,
            size: sort.limit,
        })
    }
}
