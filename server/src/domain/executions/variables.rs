//! Runtime variable values and wire conversion
//!
//! Clients submit variables as `{name, type, value}` where `value` is an opaque
//! JSON value and `type` is an optional hint. A [`VariableResolver`] turns that
//! pair into a typed [`VariableValue`] before any constraint is built from it.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::error::QueryError;

pub const TYPE_STRING: &str = "string";
pub const TYPE_INTEGER: &str = "integer";
pub const TYPE_SHORT: &str = "short";
pub const TYPE_LONG: &str = "long";
pub const TYPE_DOUBLE: &str = "double";
pub const TYPE_BOOLEAN: &str = "boolean";
pub const TYPE_DATE: &str = "date";
pub const TYPE_NULL: &str = "null";

/// Engine-native typed variable value
#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue {
    String(String),
    Integer(i32),
    Short(i16),
    Long(i64),
    Double(f64),
    Boolean(bool),
    Date(DateTime<Utc>),
    Null,
}

impl VariableValue {
    /// Stored type name, also used as the wire `type`
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => TYPE_STRING,
            Self::Integer(_) => TYPE_INTEGER,
            Self::Short(_) => TYPE_SHORT,
            Self::Long(_) => TYPE_LONG,
            Self::Double(_) => TYPE_DOUBLE,
            Self::Boolean(_) => TYPE_BOOLEAN,
            Self::Date(_) => TYPE_DATE,
            Self::Null => TYPE_NULL,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn to_json(&self) -> Value {
        match self {
            Self::String(s) => Value::String(s.clone()),
            Self::Integer(v) => Value::from(*v),
            Self::Short(v) => Value::from(*v),
            Self::Long(v) => Value::from(*v),
            Self::Double(v) => Value::from(*v),
            Self::Boolean(v) => Value::Bool(*v),
            Self::Date(d) => Value::String(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Self::Null => Value::Null,
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

/// Variable as submitted by clients when setting values
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct RestVariable {
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub var_type: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

impl RestVariable {
    pub fn from_value(name: &str, value: &VariableValue) -> Self {
        Self {
            name: Some(name.to_string()),
            var_type: Some(value.type_name().to_string()),
            value: Some(value.to_json()),
        }
    }
}

/// Converts client-submitted wire values into typed values
pub trait VariableResolver: Send + Sync {
    /// Resolve `value` using the optional `type` hint.
    fn resolve(&self, var_type: Option<&str>, value: &Value) -> Result<VariableValue, QueryError>;
}

/// Default resolver for JSON request bodies.
///
/// With an explicit type the value must be convertible to it. Without one the
/// JSON kind decides: strings stay strings, integral numbers become `long`,
/// other numbers `double`, booleans `boolean`. Arrays and objects are rejected.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonVariableResolver;

impl JsonVariableResolver {
    fn convert(var_type: &str, value: &Value) -> Option<VariableValue> {
        match var_type {
            TYPE_STRING => match value {
                Value::String(s) => Some(VariableValue::String(s.clone())),
                Value::Number(n) => Some(VariableValue::String(n.to_string())),
                Value::Bool(b) => Some(VariableValue::String(b.to_string())),
                _ => None,
            },
            TYPE_INTEGER => value
                .as_i64()
                .and_then(|v| i32::try_from(v).ok())
                .map(VariableValue::Integer),
            TYPE_SHORT => value
                .as_i64()
                .and_then(|v| i16::try_from(v).ok())
                .map(VariableValue::Short),
            TYPE_LONG => value.as_i64().map(VariableValue::Long),
            TYPE_DOUBLE => value.as_f64().map(VariableValue::Double),
            TYPE_BOOLEAN => value.as_bool().map(VariableValue::Boolean),
            TYPE_DATE => value
                .as_str()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|d| VariableValue::Date(d.with_timezone(&Utc))),
            _ => None,
        }
    }

    fn infer(value: &Value) -> Option<VariableValue> {
        match value {
            Value::Null => Some(VariableValue::Null),
            Value::String(s) => Some(VariableValue::String(s.clone())),
            Value::Bool(b) => Some(VariableValue::Boolean(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(VariableValue::Long)
                .or_else(|| n.as_f64().map(VariableValue::Double)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl VariableResolver for JsonVariableResolver {
    fn resolve(&self, var_type: Option<&str>, value: &Value) -> Result<VariableValue, QueryError> {
        match var_type {
            None => Self::infer(value).ok_or_else(|| {
                QueryError::invalid_filter(format!(
                    "Unsupported variable value without a type: {}",
                    value
                ))
            }),
            Some(_) if value.is_null() => Ok(VariableValue::Null),
            Some(t) => {
                let known = matches!(
                    t,
                    TYPE_STRING
                        | TYPE_INTEGER
                        | TYPE_SHORT
                        | TYPE_LONG
                        | TYPE_DOUBLE
                        | TYPE_BOOLEAN
                        | TYPE_DATE
                );
                if !known {
                    return Err(QueryError::invalid_filter(format!(
                        "Unknown variable type: '{}'",
                        t
                    )));
                }
                Self::convert(t, value).ok_or_else(|| {
                    QueryError::invalid_filter(format!(
                        "Converting value '{}' to type '{}' failed",
                        value, t
                    ))
                })
            }
        }
    }
}

/// Collect variables to store on an execution.
///
/// Every variable must carry a name. A missing value is stored as `null`.
pub fn variables_to_set(
    variables: &[RestVariable],
    resolver: &dyn VariableResolver,
) -> Result<BTreeMap<String, VariableValue>, QueryError> {
    let mut to_set = BTreeMap::new();
    for variable in variables {
        let name = variable
            .name
            .as_deref()
            .ok_or_else(|| QueryError::invalid_filter("Variable name is required"))?;
        let value = match &variable.value {
            Some(raw) => resolver.resolve(variable.var_type.as_deref(), raw)?,
            None => VariableValue::Null,
        };
        to_set.insert(name.to_string(), value);
    }
    Ok(to_set)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn resolve(var_type: Option<&str>, value: Value) -> Result<VariableValue, QueryError> {
        JsonVariableResolver.resolve(var_type, &value)
    }

    #[test]
    fn test_infer_from_json_kind() {
        assert_eq!(
            resolve(None, json!("abc")).unwrap(),
            VariableValue::String("abc".into())
        );
        assert_eq!(resolve(None, json!(100)).unwrap(), VariableValue::Long(100));
        assert_eq!(resolve(None, json!(1.5)).unwrap(), VariableValue::Double(1.5));
        assert_eq!(
            resolve(None, json!(true)).unwrap(),
            VariableValue::Boolean(true)
        );
        assert_eq!(resolve(None, Value::Null).unwrap(), VariableValue::Null);
    }

    #[test]
    fn test_infer_rejects_composites() {
        assert!(matches!(
            resolve(None, json!([1, 2])),
            Err(QueryError::InvalidFilter(_))
        ));
        assert!(matches!(
            resolve(None, json!({"a": 1})),
            Err(QueryError::InvalidFilter(_))
        ));
    }

    #[test]
    fn test_explicit_types() {
        assert_eq!(
            resolve(Some("integer"), json!(7)).unwrap(),
            VariableValue::Integer(7)
        );
        assert_eq!(
            resolve(Some("short"), json!(-3)).unwrap(),
            VariableValue::Short(-3)
        );
        assert_eq!(
            resolve(Some("double"), json!(2)).unwrap(),
            VariableValue::Double(2.0)
        );
        assert_eq!(
            resolve(Some("string"), json!(42)).unwrap(),
            VariableValue::String("42".into())
        );

        let date = resolve(Some("date"), json!("2024-03-01T10:00:00Z")).unwrap();
        assert_eq!(date.type_name(), TYPE_DATE);
        assert_eq!(date.to_json(), json!("2024-03-01T10:00:00.000Z"));
    }

    #[test]
    fn test_explicit_type_out_of_range() {
        let err = resolve(Some("short"), json!(100_000)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Converting value '100000' to type 'short' failed"
        );
    }

    #[test]
    fn test_unknown_type() {
        let err = resolve(Some("serializable"), json!("x")).unwrap_err();
        assert_eq!(err.to_string(), "Unknown variable type: 'serializable'");
    }

    #[test]
    fn test_bad_date() {
        assert!(resolve(Some("date"), json!("yesterday")).is_err());
    }

    #[test]
    fn test_variables_to_set() {
        let variables = vec![
            RestVariable {
                name: Some("amount".into()),
                var_type: Some("long".into()),
                value: Some(json!(250)),
            },
            RestVariable {
                name: Some("approved".into()),
                var_type: None,
                value: None,
            },
        ];
        let map = variables_to_set(&variables, &JsonVariableResolver).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["amount"], VariableValue::Long(250));
        assert_eq!(map["approved"], VariableValue::Null);
    }

    #[test]
    fn test_variables_to_set_requires_name() {
        let variables = vec![RestVariable {
            name: None,
            var_type: None,
            value: Some(json!("x")),
        }];
        let err = variables_to_set(&variables, &JsonVariableResolver).unwrap_err();
        assert_eq!(err.to_string(), "Variable name is required");
    }

    #[test]
    fn test_rest_variable_round_trip_shape() {
        let var = RestVariable::from_value("flag", &VariableValue::Boolean(false));
        let json = serde_json::to_value(&var).unwrap();
        assert_eq!(json, json!({"name": "flag", "type": "boolean", "value": false}));
    }
}
