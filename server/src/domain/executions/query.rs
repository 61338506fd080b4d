//! Query-builder interface and compiled queries
//!
//! A [`CompiledQuery`] is the fully validated list of constraints for one
//! request. Storage backends receive it through [`CompiledQuery::apply`], which
//! replays every constraint onto an [`ExecutionQueryBuilder`]. Nothing reaches
//! the builder until compilation has succeeded as a whole.

use super::variables::VariableValue;

/// Which variables a variable constraint targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableScope {
    /// Variables local to the execution itself
    Execution,
    /// Variables of the execution's owning process instance
    ProcessInstance,
}

/// A validated constraint on one variable
#[derive(Debug, Clone, PartialEq)]
pub enum VariableCondition {
    Equals { name: String, value: VariableValue },
    /// Matches any variable, whatever its name, holding `value`
    AnyEquals { value: VariableValue },
    EqualsIgnoreCase { name: String, value: String },
    NotEquals { name: String, value: VariableValue },
    NotEqualsIgnoreCase { name: String, value: String },
}

impl VariableCondition {
    pub fn apply(&self, target: &mut dyn VariableConstraints) {
        match self {
            Self::Equals { name, value } => target.value_equals(name, value),
            Self::AnyEquals { value } => target.any_value_equals(value),
            Self::EqualsIgnoreCase { name, value } => target.value_equals_ignore_case(name, value),
            Self::NotEquals { name, value } => target.value_not_equals(name, value),
            Self::NotEqualsIgnoreCase { name, value } => {
                target.value_not_equals_ignore_case(name, value)
            }
        }
    }
}

/// One conjunctive constraint of an execution query
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    ExecutionId(String),
    ProcessInstanceId(String),
    ProcessDefinitionKey(String),
    ProcessDefinitionId(String),
    ProcessInstanceBusinessKey(String),
    ActivityId(String),
    ParentId(String),
    MessageEventSubscriptionName(String),
    SignalEventSubscriptionName(String),
    Variable {
        scope: VariableScope,
        condition: VariableCondition,
    },
}

/// Variable constraints for a single scope.
///
/// Builders expose one implementation per [`VariableScope`].
pub trait VariableConstraints {
    fn value_equals(&mut self, name: &str, value: &VariableValue);
    fn any_value_equals(&mut self, value: &VariableValue);
    fn value_equals_ignore_case(&mut self, name: &str, value: &str);
    fn value_not_equals(&mut self, name: &str, value: &VariableValue);
    fn value_not_equals_ignore_case(&mut self, name: &str, value: &str);
}

/// Strongly-typed execution query builder implemented by storage backends
pub trait ExecutionQueryBuilder {
    fn execution_id(&mut self, id: &str);
    fn process_instance_id(&mut self, id: &str);
    fn process_definition_key(&mut self, key: &str);
    fn process_definition_id(&mut self, id: &str);
    fn process_instance_business_key(&mut self, business_key: &str);
    fn activity_id(&mut self, activity_id: &str);
    fn parent_id(&mut self, parent_id: &str);
    fn message_event_subscription_name(&mut self, name: &str);
    fn signal_event_subscription_name(&mut self, name: &str);
    fn variables(&mut self, scope: VariableScope) -> &mut dyn VariableConstraints;
}

/// Validated execution query, ready to be applied to a builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledQuery {
    constraints: Vec<Constraint>,
}

impl CompiledQuery {
    pub(crate) fn from_constraints(constraints: Vec<Constraint>) -> Self {
        Self { constraints }
    }

    /// Query matching a single execution by id
    pub fn by_id(execution_id: &str) -> Self {
        Self::from_constraints(vec![Constraint::ExecutionId(execution_id.to_string())])
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    /// An empty query matches every execution
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    /// Replay all constraints, in order, onto `builder`
    pub fn apply<B: ExecutionQueryBuilder + ?Sized>(&self, builder: &mut B) {
        for constraint in &self.constraints {
            match constraint {
                Constraint::ExecutionId(v) => builder.execution_id(v),
                Constraint::ProcessInstanceId(v) => builder.process_instance_id(v),
                Constraint::ProcessDefinitionKey(v) => builder.process_definition_key(v),
                Constraint::ProcessDefinitionId(v) => builder.process_definition_id(v),
                Constraint::ProcessInstanceBusinessKey(v) => {
                    builder.process_instance_business_key(v)
                }
                Constraint::ActivityId(v) => builder.activity_id(v),
                Constraint::ParentId(v) => builder.parent_id(v),
                Constraint::MessageEventSubscriptionName(v) => {
                    builder.message_event_subscription_name(v)
                }
                Constraint::SignalEventSubscriptionName(v) => {
                    builder.signal_event_subscription_name(v)
                }
                Constraint::Variable { scope, condition } => {
                    condition.apply(builder.variables(*scope))
                }
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::recording::RecordingBuilder;
    use super::*;

    #[test]
    fn test_empty_query_applies_nothing() {
        let query = CompiledQuery::default();
        let mut builder = RecordingBuilder::default();
        query.apply(&mut builder);

        assert!(query.is_empty());
        assert!(builder.fields.is_empty());
        assert!(builder.execution.calls.is_empty());
        assert!(builder.process.calls.is_empty());
    }

    #[test]
    fn test_by_id() {
        let query = CompiledQuery::by_id("exec-1");
        let mut builder = RecordingBuilder::default();
        query.apply(&mut builder);

        assert_eq!(query.len(), 1);
        assert_eq!(builder.fields, vec!["id=exec-1"]);
    }

    #[test]
    fn test_variable_conditions_routed_by_scope() {
        let query = CompiledQuery::from_constraints(vec![
            Constraint::Variable {
                scope: VariableScope::ProcessInstance,
                condition: VariableCondition::NotEquals {
                    name: "amount".into(),
                    value: VariableValue::Long(100),
                },
            },
            Constraint::Variable {
                scope: VariableScope::Execution,
                condition: VariableCondition::NotEquals {
                    name: "amount".into(),
                    value: VariableValue::Long(100),
                },
            },
            Constraint::Variable {
                scope: VariableScope::Execution,
                condition: VariableCondition::AnyEquals {
                    value: VariableValue::String("x".into()),
                },
            },
        ]);
        let mut builder = RecordingBuilder::default();
        query.apply(&mut builder);

        assert_eq!(builder.process.calls, vec!["amount != 100"]);
        assert_eq!(builder.execution.calls, vec!["amount != 100", "* == x"]);
    }
}
