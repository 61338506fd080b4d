//! ExecutionRepository trait implementation for SQLite

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::data::error::DataError;
use crate::data::traits::ExecutionRepository;
use crate::data::types::ExecutionRow;
use crate::domain::executions::{CompiledQuery, SortOrder, VariableValue};

use super::SqliteService;
use super::repositories::{execution, variable};

#[async_trait]
impl ExecutionRepository for Arc<SqliteService> {
    async fn count_executions(&self, query: &CompiledQuery) -> Result<u64, DataError> {
        execution::count_executions(self.pool(), query)
            .await
            .map_err(Into::into)
    }

    async fn list_executions(
        &self,
        query: &CompiledQuery,
        order: SortOrder,
        offset: u64,
        limit: u32,
    ) -> Result<Vec<ExecutionRow>, DataError> {
        execution::list_executions(self.pool(), query, order, offset, limit)
            .await
            .map_err(Into::into)
    }

    async fn get_execution(&self, id: &str) -> Result<Option<ExecutionRow>, DataError> {
        execution::get_execution(self.pool(), id)
            .await
            .map_err(Into::into)
    }

    async fn set_variables(
        &self,
        execution_id: &str,
        variables: &BTreeMap<String, VariableValue>,
    ) -> Result<(), DataError> {
        variable::set_variables(self.pool(), execution_id, variables)
            .await
            .map_err(Into::into)
    }

    async fn get_variables(
        &self,
        execution_id: &str,
    ) -> Result<BTreeMap<String, VariableValue>, DataError> {
        variable::get_variables(self.pool(), execution_id)
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::sqlite::test_support::{seed_invoices, test_pool};
    use crate::domain::executions::{ExecutionSortProperty, SortDirection};

    #[tokio::test]
    async fn test_repository_through_trait_object() {
        let pool = test_pool().await;
        seed_invoices(&pool).await;
        let repo: Arc<dyn ExecutionRepository> = Arc::new(Arc::new(SqliteService::from_pool(pool)));

        let all = CompiledQuery::default();
        assert_eq!(repo.count_executions(&all).await.unwrap(), 5);

        let order = SortOrder {
            property: ExecutionSortProperty::ProcessDefinitionKey,
            direction: SortDirection::Desc,
        };
        let rows = repo.list_executions(&all, order, 0, 1).await.unwrap();
        assert_eq!(rows[0].process_definition_key, "order-fulfillment");

        let found = repo.get_execution("ex-2a").await.unwrap().unwrap();
        assert_eq!(found.activity_id.as_deref(), Some("approve"));

        let vars = repo.get_variables("pi-2").await.unwrap();
        assert_eq!(vars["customer"], VariableValue::String("Globex".into()));
    }
}
