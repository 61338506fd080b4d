//! Filter compiler
//!
//! Translates an [`ExecutionQueryRequest`] into a [`CompiledQuery`]. Every
//! criterion is validated before any constraint is returned, so a malformed
//! criterion anywhere in the request rejects the whole request.

use std::sync::Arc;

use super::error::QueryError;
use super::query::{CompiledQuery, Constraint, VariableCondition, VariableScope};
use super::request::{ExecutionQueryRequest, QueryVariable, QueryVariableOperation};
use super::variables::{JsonVariableResolver, VariableResolver, VariableValue};

/// Stateless translator from filter requests to compiled queries
#[derive(Clone)]
pub struct FilterCompiler {
    resolver: Arc<dyn VariableResolver>,
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self::new(Arc::new(JsonVariableResolver))
    }
}

impl FilterCompiler {
    pub fn new(resolver: Arc<dyn VariableResolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &dyn VariableResolver {
        self.resolver.as_ref()
    }

    pub fn compile(&self, request: &ExecutionQueryRequest) -> Result<CompiledQuery, QueryError> {
        let mut constraints = Vec::new();

        let scalars: [(&str, &Option<String>, fn(String) -> Constraint); 9] = [
            ("id", &request.id, Constraint::ExecutionId),
            (
                "processInstanceId",
                &request.process_instance_id,
                Constraint::ProcessInstanceId,
            ),
            (
                "processDefinitionKey",
                &request.process_definition_key,
                Constraint::ProcessDefinitionKey,
            ),
            (
                "processDefinitionId",
                &request.process_definition_id,
                Constraint::ProcessDefinitionId,
            ),
            (
                "processBusinessKey",
                &request.process_business_key,
                Constraint::ProcessInstanceBusinessKey,
            ),
            ("activityId", &request.activity_id, Constraint::ActivityId),
            ("parentId", &request.parent_id, Constraint::ParentId),
            (
                "messageEventSubscriptionName",
                &request.message_event_subscription_name,
                Constraint::MessageEventSubscriptionName,
            ),
            (
                "signalEventSubscriptionName",
                &request.signal_event_subscription_name,
                Constraint::SignalEventSubscriptionName,
            ),
        ];

        for (field, value, make) in scalars {
            if let Some(value) = value {
                if value.is_empty() {
                    return Err(QueryError::invalid_filter(format!(
                        "Filter '{}' must not be empty",
                        field
                    )));
                }
                constraints.push(make(value.clone()));
            }
        }

        self.compile_variables(&request.variables, VariableScope::Execution, &mut constraints)?;
        self.compile_variables(
            &request.process_instance_variables,
            VariableScope::ProcessInstance,
            &mut constraints,
        )?;

        tracing::debug!(
            constraints = constraints.len(),
            variables = request.variables.len(),
            process_instance_variables = request.process_instance_variables.len(),
            "Compiled execution query"
        );

        Ok(CompiledQuery::from_constraints(constraints))
    }

    fn compile_variables(
        &self,
        variables: &[QueryVariable],
        scope: VariableScope,
        constraints: &mut Vec<Constraint>,
    ) -> Result<(), QueryError> {
        for variable in variables {
            let condition = self.compile_variable(variable)?;
            tracing::trace!(scope = ?scope, condition = ?condition, "Variable criterion");
            constraints.push(Constraint::Variable { scope, condition });
        }
        Ok(())
    }

    fn compile_variable(&self, variable: &QueryVariable) -> Result<VariableCondition, QueryError> {
        let operation = variable.operation.ok_or_else(|| {
            QueryError::invalid_filter(format!(
                "Variable operation is missing for variable: {}",
                variable.display_name()
            ))
        })?;

        let raw = variable.value.as_ref().ok_or_else(|| value_missing(variable))?;
        let value = self.resolver.resolve(variable.var_type.as_deref(), raw)?;
        if value.is_null() {
            return Err(value_missing(variable));
        }

        // Value-only search is an equality across all variable names
        let Some(name) = variable.name.clone() else {
            return match operation {
                QueryVariableOperation::Equals => Ok(VariableCondition::AnyEquals { value }),
                _ => Err(QueryError::invalid_filter(
                    "Value-only query (without a variable-name) is only supported when using 'equals' operation.",
                )),
            };
        };

        match operation {
            QueryVariableOperation::Equals => Ok(VariableCondition::Equals { name, value }),
            QueryVariableOperation::EqualsIgnoreCase => Ok(VariableCondition::EqualsIgnoreCase {
                name,
                value: require_text(value)?,
            }),
            QueryVariableOperation::NotEquals => Ok(VariableCondition::NotEquals { name, value }),
            QueryVariableOperation::NotEqualsIgnoreCase => {
                Ok(VariableCondition::NotEqualsIgnoreCase {
                    name,
                    value: require_text(value)?,
                })
            }
            QueryVariableOperation::GreaterThan
            | QueryVariableOperation::GreaterThanEquals
            | QueryVariableOperation::LessThan
            | QueryVariableOperation::LessThanEquals
            | QueryVariableOperation::Like => Err(QueryError::invalid_filter(format!(
                "Unsupported variable query operation: {}",
                operation.as_str()
            ))),
        }
    }
}

fn value_missing(variable: &QueryVariable) -> QueryError {
    QueryError::invalid_filter(format!(
        "Variable value is missing for variable: {}",
        variable.display_name()
    ))
}

fn require_text(value: VariableValue) -> Result<String, QueryError> {
    match value {
        VariableValue::String(s) => Ok(s),
        other => Err(QueryError::invalid_filter(format!(
            "Only string variable values are supported when ignoring casing, but was: {}",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::executions::query::recording::RecordingBuilder;

    fn compile(request: &ExecutionQueryRequest) -> Result<CompiledQuery, QueryError> {
        FilterCompiler::default().compile(request)
    }

    fn var(name: Option<&str>, op: QueryVariableOperation, value: serde_json::Value) -> QueryVariable {
        QueryVariable::new(name, op, value)
    }

    fn assert_invalid(result: Result<CompiledQuery, QueryError>, expected: &str) {
        match result {
            Err(QueryError::InvalidFilter(msg)) => assert_eq!(msg, expected),
            other => panic!("expected InvalidFilter, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_request_matches_everything() {
        let query = compile(&ExecutionQueryRequest::default()).unwrap();
        assert!(query.is_empty());
    }

    #[test]
    fn test_scalar_fields_in_declared_order() {
        let request = ExecutionQueryRequest {
            id: Some("e1".into()),
            process_definition_key: Some("invoice-approval".into()),
            process_business_key: Some("INV-7".into()),
            signal_event_subscription_name: Some("cancel".into()),
            ..Default::default()
        };
        let query = compile(&request).unwrap();

        let mut builder = RecordingBuilder::default();
        query.apply(&mut builder);
        assert_eq!(
            builder.fields,
            vec![
                "id=e1",
                "processDefinitionKey=invoice-approval",
                "businessKey=INV-7",
                "signal=cancel",
            ]
        );
    }

    #[test]
    fn test_single_definition_key() {
        let request = ExecutionQueryRequest {
            process_definition_key: Some("invoice-approval".into()),
            ..Default::default()
        };
        let query = compile(&request).unwrap();
        assert_eq!(
            query.constraints(),
            &[Constraint::ProcessDefinitionKey("invoice-approval".into())]
        );
    }

    #[test]
    fn test_empty_scalar_rejected() {
        let request = ExecutionQueryRequest {
            activity_id: Some(String::new()),
            ..Default::default()
        };
        assert_invalid(compile(&request), "Filter 'activityId' must not be empty");
    }

    #[test]
    fn test_nameless_equals_is_value_only() {
        let request = ExecutionQueryRequest {
            variables: vec![var(None, QueryVariableOperation::Equals, json!("urgent"))],
            ..Default::default()
        };
        let query = compile(&request).unwrap();
        assert_eq!(
            query.constraints(),
            &[Constraint::Variable {
                scope: VariableScope::Execution,
                condition: VariableCondition::AnyEquals {
                    value: VariableValue::String("urgent".into()),
                },
            }]
        );
    }

    #[test]
    fn test_nameless_other_operations_rejected() {
        for op in [
            QueryVariableOperation::NotEquals,
            QueryVariableOperation::EqualsIgnoreCase,
            QueryVariableOperation::NotEqualsIgnoreCase,
            QueryVariableOperation::Like,
        ] {
            let request = ExecutionQueryRequest {
                variables: vec![var(None, op, json!("x"))],
                ..Default::default()
            };
            assert_invalid(
                compile(&request),
                "Value-only query (without a variable-name) is only supported when using 'equals' operation.",
            );
        }
    }

    #[test]
    fn test_missing_operation_rejected() {
        let request = ExecutionQueryRequest {
            process_instance_variables: vec![QueryVariable {
                name: Some("amount".into()),
                operation: None,
                value: Some(json!(1)),
                var_type: None,
            }],
            ..Default::default()
        };
        assert_invalid(
            compile(&request),
            "Variable operation is missing for variable: amount",
        );
    }

    #[test]
    fn test_missing_operation_wins_over_missing_value() {
        let request = ExecutionQueryRequest {
            variables: vec![QueryVariable::default()],
            ..Default::default()
        };
        assert_invalid(
            compile(&request),
            "Variable operation is missing for variable: (unnamed)",
        );
    }

    #[test]
    fn test_missing_value_rejected() {
        let request = ExecutionQueryRequest {
            variables: vec![QueryVariable {
                name: Some("amount".into()),
                operation: Some(QueryVariableOperation::Equals),
                value: None,
                var_type: None,
            }],
            ..Default::default()
        };
        assert_invalid(
            compile(&request),
            "Variable value is missing for variable: amount",
        );
    }

    #[test]
    fn test_ignore_case_requires_string() {
        for op in [
            QueryVariableOperation::EqualsIgnoreCase,
            QueryVariableOperation::NotEqualsIgnoreCase,
        ] {
            let request = ExecutionQueryRequest {
                variables: vec![var(Some("amount"), op, json!(100))],
                ..Default::default()
            };
            assert_invalid(
                compile(&request),
                "Only string variable values are supported when ignoring casing, but was: long",
            );

            let request = ExecutionQueryRequest {
                variables: vec![var(Some("customer"), op, json!("ACME"))],
                ..Default::default()
            };
            assert!(compile(&request).is_ok());
        }
    }

    #[test]
    fn test_ignore_case_conditions() {
        let request = ExecutionQueryRequest {
            variables: vec![
                var(
                    Some("customer"),
                    QueryVariableOperation::EqualsIgnoreCase,
                    json!("ACME"),
                ),
                var(
                    Some("region"),
                    QueryVariableOperation::NotEqualsIgnoreCase,
                    json!("Emea"),
                ),
            ],
            ..Default::default()
        };
        let mut builder = RecordingBuilder::default();
        compile(&request).unwrap().apply(&mut builder);
        assert_eq!(
            builder.execution.calls,
            vec!["customer ~= ACME", "region !~= Emea"]
        );
    }

    #[test]
    fn test_unsupported_operation() {
        let request = ExecutionQueryRequest {
            variables: vec![var(
                Some("amount"),
                QueryVariableOperation::GreaterThan,
                json!(5),
            )],
            ..Default::default()
        };
        assert_invalid(
            compile(&request),
            "Unsupported variable query operation: greaterThan",
        );
    }

    #[test]
    fn test_same_criterion_in_both_scopes() {
        let criterion = var(Some("amount"), QueryVariableOperation::NotEquals, json!(100));
        let request = ExecutionQueryRequest {
            variables: vec![criterion.clone()],
            process_instance_variables: vec![criterion],
            ..Default::default()
        };
        let mut builder = RecordingBuilder::default();
        compile(&request).unwrap().apply(&mut builder);

        assert_eq!(builder.execution.calls, vec!["amount != 100"]);
        assert_eq!(builder.process.calls, vec!["amount != 100"]);
    }

    #[test]
    fn test_one_bad_criterion_rejects_whole_request() {
        let request = ExecutionQueryRequest {
            process_definition_key: Some("invoice-approval".into()),
            variables: vec![
                var(Some("a"), QueryVariableOperation::Equals, json!(1)),
                var(None, QueryVariableOperation::NotEquals, json!(2)),
            ],
            ..Default::default()
        };
        assert!(compile(&request).is_err());
    }

    #[test]
    fn test_explicit_type_hint_used() {
        let request = ExecutionQueryRequest {
            variables: vec![QueryVariable {
                name: Some("count".into()),
                operation: Some(QueryVariableOperation::Equals),
                value: Some(json!(3)),
                var_type: Some("integer".into()),
            }],
            ..Default::default()
        };
        let query = compile(&request).unwrap();
        assert_eq!(
            query.constraints(),
            &[Constraint::Variable {
                scope: VariableScope::Execution,
                condition: VariableCondition::Equals {
                    name: "count".into(),
                    value: VariableValue::Integer(3),
                },
            }]
        );
    }

    #[test]
    fn test_resolver_errors_propagate() {
        let request = ExecutionQueryRequest {
            variables: vec![QueryVariable {
                name: Some("due".into()),
                operation: Some(QueryVariableOperation::Equals),
                value: Some(json!("not a date")),
                var_type: Some("date".into()),
            }],
            ..Default::default()
        };
        assert!(matches!(
            compile(&request),
            Err(QueryError::InvalidFilter(_))
        ));
    }
}
