//! Single-execution lookup and variable updates

use super::error::QueryError;
use super::variables::{RestVariable, VariableResolver, variables_to_set};
use crate::data::{ExecutionRepository, ExecutionRow};

/// Look up one execution by id.
///
/// A missing or empty id is rejected before the repository is consulted.
pub async fn get_execution(
    repo: &dyn ExecutionRepository,
    execution_id: Option<&str>,
) -> Result<ExecutionRow, QueryError> {
    let id = execution_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| QueryError::invalid_filter("The executionId cannot be null"))?;

    repo.get_execution(id).await?.ok_or_else(|| {
        QueryError::not_found(format!("Could not find an execution with id '{}'.", id))
    })
}

/// Store `variables` as local variables of an existing execution.
///
/// Returns the stored values of the variables that were set.
pub async fn set_execution_variables(
    repo: &dyn ExecutionRepository,
    resolver: &dyn VariableResolver,
    execution_id: Option<&str>,
    variables: &[RestVariable],
) -> Result<Vec<RestVariable>, QueryError> {
    let execution = get_execution(repo, execution_id).await?;

    let to_set = variables_to_set(variables, resolver)?;
    if to_set.is_empty() {
        return Err(QueryError::invalid_filter(
            "Request did not contain any variables to set",
        ));
    }

    repo.set_variables(&execution.id, &to_set).await?;
    tracing::debug!(execution_id = %execution.id, count = to_set.len(), "Execution variables set");

    let stored = repo.get_variables(&execution.id).await?;
    Ok(stored
        .iter()
        .filter(|(name, _)| to_set.contains_key(*name))
        .map(|(name, value)| RestVariable::from_value(name, value))
        .collect())
}
