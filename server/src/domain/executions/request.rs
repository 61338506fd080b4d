//! Execution query request types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

/// Comparison operator of a variable criterion.
///
/// The wire format shares this enum with other query endpoints, so it carries
/// operators that execution queries do not support. Those are rejected by the
/// compiler rather than at deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum QueryVariableOperation {
    Equals,
    NotEquals,
    EqualsIgnoreCase,
    NotEqualsIgnoreCase,
    GreaterThan,
    GreaterThanEquals,
    LessThan,
    LessThanEquals,
    Like,
}

impl QueryVariableOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "notEquals",
            Self::EqualsIgnoreCase => "equalsIgnoreCase",
            Self::NotEqualsIgnoreCase => "notEqualsIgnoreCase",
            Self::GreaterThan => "greaterThan",
            Self::GreaterThanEquals => "greaterThanEquals",
            Self::LessThan => "lessThan",
            Self::LessThanEquals => "lessThanEquals",
            Self::Like => "like",
        }
    }
}

/// A single variable criterion
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct QueryVariable {
    /// Variable name; absent means "any variable with this value"
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub operation: Option<QueryVariableOperation>,
    #[serde(default)]
    pub value: Option<Value>,
    /// Optional type hint for `value`
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,
}

impl QueryVariable {
    pub fn new(
        name: Option<&str>,
        operation: QueryVariableOperation,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            name: name.map(str::to_string),
            operation: Some(operation),
            value: Some(value.into()),
            var_type: None,
        }
    }

    /// Name used in error messages
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }
}

/// Filter request for querying executions.
///
/// All present criteria are combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionQueryRequest {
    pub id: Option<String>,
    pub process_instance_id: Option<String>,
    pub process_definition_key: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_business_key: Option<String>,
    pub activity_id: Option<String>,
    pub parent_id: Option<String>,
    pub message_event_subscription_name: Option<String>,
    pub signal_event_subscription_name: Option<String>,
    /// Criteria on variables local to the execution
    #[serde(default)]
    #[validate(length(max = 64, message = "At most 64 variable criteria are allowed"))]
    pub variables: Vec<QueryVariable>,
    /// Criteria on variables of the owning process instance
    #[serde(default)]
    #[validate(length(
        max = 64,
        message = "At most 64 process instance variable criteria are allowed"
    ))]
    pub process_instance_variables: Vec<QueryVariable>,
}
