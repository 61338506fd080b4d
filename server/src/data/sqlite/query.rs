//! SQL rendering of execution queries
//!
//! [`SqlExecutionQuery`] implements the domain query builder by collecting
//! WHERE conditions with positional `?` placeholders. Every condition keeps
//! its own parameters so conditions from different scopes can be rendered in
//! any order without parameter misalignment.

use sqlx::Sqlite;
use sqlx::query::QueryAs;
use sqlx::sqlite::SqliteArguments;

use crate::domain::executions::{
    ExecutionQueryBuilder, ExecutionSortProperty, SortDirection, SortOrder, VariableConstraints,
    VariableScope, VariableValue,
};
use crate::domain::executions::variables::{
    TYPE_BOOLEAN, TYPE_DATE, TYPE_DOUBLE, TYPE_INTEGER, TYPE_LONG, TYPE_SHORT, TYPE_STRING,
};

/// Columns selected for an execution, joined with its process instance
pub const EXECUTION_COLUMNS: &str = "e.id, e.process_instance_id, e.parent_id, \
     e.process_definition_id, e.process_definition_key, pi.business_key, e.activity_id, \
     e.is_active, e.suspended";

/// Execution table joined with its owning process instance
pub const EXECUTION_FROM: &str =
    "executions e LEFT JOIN executions pi ON pi.id = e.process_instance_id";

/// A bound SQL parameter
#[derive(Debug, Clone, PartialEq)]
pub enum SqlParam {
    Text(String),
    Integer(i64),
    Real(f64),
}

#[derive(Debug, Clone, PartialEq)]
struct SqlCondition {
    sql: String,
    params: Vec<SqlParam>,
}

impl SqlCondition {
    fn new(sql: impl Into<String>, params: Vec<SqlParam>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Variable conditions for one scope, correlated through `owner`
#[derive(Debug, Clone)]
struct ScopeConditions {
    owner: &'static str,
    conditions: Vec<SqlCondition>,
}

impl ScopeConditions {
    fn new(owner: &'static str) -> Self {
        Self {
            owner,
            conditions: Vec::new(),
        }
    }

    fn exists(&mut self, predicate: &str, params: Vec<SqlParam>) {
        self.conditions.push(SqlCondition::new(
            format!(
                "EXISTS (SELECT 1 FROM variables v WHERE v.execution_id = {} AND {})",
                self.owner, predicate
            ),
            params,
        ));
    }
}

/// Column holding `value`, the stored types it may match and its parameter
struct TypedColumn {
    column: &'static str,
    types: &'static [&'static str],
    param: SqlParam,
}

/// Integral types compare with each other since they share `long_value`
const INTEGRAL_TYPES: &[&str] = &[TYPE_INTEGER, TYPE_SHORT, TYPE_LONG];
const STRING_TYPES: &[&str] = &[TYPE_STRING];
const DOUBLE_TYPES: &[&str] = &[TYPE_DOUBLE];
const BOOLEAN_TYPES: &[&str] = &[TYPE_BOOLEAN];
const DATE_TYPES: &[&str] = &[TYPE_DATE];

fn typed_column(value: &VariableValue) -> Option<TypedColumn> {
    let (column, types, param) = match value {
        VariableValue::String(s) => ("text_value", STRING_TYPES, SqlParam::Text(s.clone())),
        VariableValue::Integer(v) => (
            "long_value",
            INTEGRAL_TYPES,
            SqlParam::Integer(i64::from(*v)),
        ),
        VariableValue::Short(v) => (
            "long_value",
            INTEGRAL_TYPES,
            SqlParam::Integer(i64::from(*v)),
        ),
        VariableValue::Long(v) => ("long_value", INTEGRAL_TYPES, SqlParam::Integer(*v)),
        VariableValue::Double(v) => ("double_value", DOUBLE_TYPES, SqlParam::Real(*v)),
        VariableValue::Boolean(v) => (
            "long_value",
            BOOLEAN_TYPES,
            SqlParam::Integer(i64::from(*v)),
        ),
        VariableValue::Date(d) => (
            "long_value",
            DATE_TYPES,
            SqlParam::Integer(d.timestamp_millis()),
        ),
        VariableValue::Null => return None,
    };
    Some(TypedColumn {
        column,
        types,
        param,
    })
}

fn type_predicate(types: &[&str]) -> String {
    let quoted: Vec<String> = types.iter().map(|t| format!("'{}'", t)).collect();
    if quoted.len() == 1 {
        format!("v.var_type = {}", quoted[0])
    } else {
        format!("v.var_type IN ({})", quoted.join(", "))
    }
}

impl VariableConstraints for ScopeConditions {
    fn value_equals(&mut self, name: &str, value: &VariableValue) {
        let name = SqlParam::Text(name.to_string());
        match typed_column(value) {
            Some(typed) => self.exists(
                &format!(
                    "v.name = ? AND {} AND v.{} = ?",
                    type_predicate(typed.types),
                    typed.column
                ),
                vec![name, typed.param],
            ),
            None => self.exists("v.name = ? AND v.var_type = 'null'", vec![name]),
        }
    }

    fn any_value_equals(&mut self, value: &VariableValue) {
        match typed_column(value) {
            Some(typed) => self.exists(
                &format!("{} AND v.{} = ?", type_predicate(typed.types), typed.column),
                vec![typed.param],
            ),
            None => self.exists("v.var_type = 'null'", Vec::new()),
        }
    }

    fn value_equals_ignore_case(&mut self, name: &str, value: &str) {
        self.exists(
            "v.name = ? AND v.var_type = 'string' AND v.text_value_lower = ?",
            vec![
                SqlParam::Text(name.to_string()),
                SqlParam::Text(value.to_lowercase()),
            ],
        );
    }

    fn value_not_equals(&mut self, name: &str, value: &VariableValue) {
        let name = SqlParam::Text(name.to_string());
        match typed_column(value) {
            Some(typed) => self.exists(
                &format!(
                    "v.name = ? AND {} AND (v.{col} IS NULL OR v.{col} <> ?)",
                    type_predicate(typed.types),
                    col = typed.column
                ),
                vec![name, typed.param],
            ),
            None => self.exists("v.name = ? AND v.var_type <> 'null'", vec![name]),
        }
    }

    fn value_not_equals_ignore_case(&mut self, name: &str, value: &str) {
        self.exists(
            "v.name = ? AND v.var_type = 'string' \
             AND (v.text_value_lower IS NULL OR v.text_value_lower <> ?)",
            vec![
                SqlParam::Text(name.to_string()),
                SqlParam::Text(value.to_lowercase()),
            ],
        );
    }
}

/// SQL implementation of [`ExecutionQueryBuilder`]
#[derive(Debug, Clone)]
pub struct SqlExecutionQuery {
    conditions: Vec<SqlCondition>,
    execution_variables: ScopeConditions,
    process_variables: ScopeConditions,
}

impl Default for SqlExecutionQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl SqlExecutionQuery {
    pub fn new() -> Self {
        Self {
            conditions: Vec::new(),
            execution_variables: ScopeConditions::new("e.id"),
            process_variables: ScopeConditions::new("e.process_instance_id"),
        }
    }

    fn equals(&mut self, column: &str, value: &str) {
        self.conditions.push(SqlCondition::new(
            format!("{} = ?", column),
            vec![SqlParam::Text(value.to_string())],
        ));
    }

    fn subscribed(&mut self, event_type: &str, name: &str) {
        self.conditions.push(SqlCondition::new(
            format!(
                "EXISTS (SELECT 1 FROM event_subscriptions s WHERE s.execution_id = e.id \
                 AND s.event_type = '{}' AND s.event_name = ?)",
                event_type
            ),
            vec![SqlParam::Text(name.to_string())],
        ));
    }

    fn all_conditions(&self) -> impl Iterator<Item = &SqlCondition> {
        self.conditions
            .iter()
            .chain(&self.execution_variables.conditions)
            .chain(&self.process_variables.conditions)
    }

    /// WHERE clause (with leading space) and its parameters in placeholder order
    pub fn render(&self) -> (String, Vec<SqlParam>) {
        let mut clauses = Vec::new();
        let mut params = Vec::new();
        for condition in self.all_conditions() {
            clauses.push(condition.sql.as_str());
            params.extend(condition.params.iter().cloned());
        }
        if clauses.is_empty() {
            return (String::new(), params);
        }
        (format!(" WHERE {}", clauses.join(" AND ")), params)
    }
}

impl ExecutionQueryBuilder for SqlExecutionQuery {
    fn execution_id(&mut self, id: &str) {
        self.equals("e.id", id);
    }

    fn process_instance_id(&mut self, id: &str) {
        self.equals("e.process_instance_id", id);
    }

    fn process_definition_key(&mut self, key: &str) {
        self.equals("e.process_definition_key", key);
    }

    fn process_definition_id(&mut self, id: &str) {
        self.equals("e.process_definition_id", id);
    }

    fn process_instance_business_key(&mut self, business_key: &str) {
        self.equals("pi.business_key", business_key);
    }

    fn activity_id(&mut self, activity_id: &str) {
        self.equals("e.activity_id", activity_id);
    }

    fn parent_id(&mut self, parent_id: &str) {
        self.equals("e.parent_id", parent_id);
    }

    fn message_event_subscription_name(&mut self, name: &str) {
        self.subscribed("message", name);
    }

    fn signal_event_subscription_name(&mut self, name: &str) {
        self.subscribed("signal", name);
    }

    fn variables(&mut self, scope: VariableScope) -> &mut dyn VariableConstraints {
        match scope {
            VariableScope::Execution => &mut self.execution_variables,
            VariableScope::ProcessInstance => &mut self.process_variables,
        }
    }
}

/// ORDER BY clause for a resolved sort order; ties break on execution id
pub fn order_by_sql(order: SortOrder) -> String {
    let column = match order.property {
        ExecutionSortProperty::ProcessDefinitionId => "e.process_definition_id",
        ExecutionSortProperty::ProcessDefinitionKey => "e.process_definition_key",
        ExecutionSortProperty::ProcessInstanceId => "e.process_instance_id",
    };
    let dir = match order.direction {
        SortDirection::Asc => "ASC",
        SortDirection::Desc => "DESC",
    };
    format!(" ORDER BY {} {}, e.id ASC", column, dir)
}

/// Bind rendered parameters, in order, onto a query
pub fn bind_params<'q, O>(
    mut query: QueryAs<'q, Sqlite, O, SqliteArguments<'q>>,
    params: &'q [SqlParam],
) -> QueryAs<'q, Sqlite, O, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            SqlParam::Text(v) => query.bind(v.as_str()),
            SqlParam::Integer(v) => query.bind(*v),
            SqlParam::Real(v) => query.bind(*v),
        };
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_has_no_where() {
        let (sql, params) = SqlExecutionQuery::new().render();
        assert!(sql.is_empty());
        assert!(params.is_empty());
    }

    #[test]
    fn test_scalar_conditions() {
        let mut query = SqlExecutionQuery::new();
        query.process_definition_key("invoice-approval");
        query.process_instance_business_key("INV-1");

        let (sql, params) = query.render();
        assert_eq!(
            sql,
            " WHERE e.process_definition_key = ? AND pi.business_key = ?"
        );
        assert_eq!(
            params,
            vec![
                SqlParam::Text("invoice-approval".into()),
                SqlParam::Text("INV-1".into()),
            ]
        );
    }

    #[test]
    fn test_scopes_correlate_on_different_owners() {
        let mut query = SqlExecutionQuery::new();
        query
            .variables(VariableScope::ProcessInstance)
            .value_not_equals("amount", &VariableValue::Long(100));
        query
            .variables(VariableScope::Execution)
            .value_equals("flag", &VariableValue::Boolean(true));

        let (sql, params) = query.render();
        // Execution scope renders before process scope; params follow
        let exec_pos = sql.find("v.execution_id = e.id AND").unwrap();
        let proc_pos = sql
            .find("v.execution_id = e.process_instance_id AND")
            .unwrap();
        assert!(exec_pos < proc_pos);
        assert_eq!(
            params,
            vec![
                SqlParam::Text("flag".into()),
                SqlParam::Integer(1),
                SqlParam::Text("amount".into()),
                SqlParam::Integer(100),
            ]
        );
        assert!(sql.contains("(v.long_value IS NULL OR v.long_value <> ?)"));
        assert!(sql.contains("v.var_type IN ('integer', 'short', 'long')"));
    }

    #[test]
    fn test_value_only_equality_omits_name() {
        let mut query = SqlExecutionQuery::new();
        query
            .variables(VariableScope::Execution)
            .any_value_equals(&VariableValue::String("urgent".into()));

        let (sql, params) = query.render();
        assert!(!sql.contains("v.name"));
        assert_eq!(params, vec![SqlParam::Text("urgent".into())]);
    }

    #[test]
    fn test_ignore_case_lowercases_parameter() {
        let mut query = SqlExecutionQuery::new();
        query
            .variables(VariableScope::Execution)
            .value_equals_ignore_case("school", "ÉCOLE");

        let (sql, params) = query.render();
        assert!(sql.contains("v.text_value_lower = ?"));
        assert!(!sql.contains("LOWER("));
        assert_eq!(params[1], SqlParam::Text("école".into()));
    }

    #[test]
    fn test_event_subscription_condition() {
        let mut query = SqlExecutionQuery::new();
        query.signal_event_subscription_name("cancel");

        let (sql, _) = query.render();
        assert!(sql.contains("s.event_type = 'signal' AND s.event_name = ?"));
    }

    #[test]
    fn test_order_by_uses_fixed_columns() {
        let sql = order_by_sql(SortOrder {
            property: ExecutionSortProperty::ProcessDefinitionKey,
            direction: SortDirection::Desc,
        });
        assert_eq!(sql, " ORDER BY e.process_definition_key DESC, e.id ASC");
    }
}
