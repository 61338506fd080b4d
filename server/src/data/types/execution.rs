//! Execution row types

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Execution types
// ============================================================================

/// Execution row from database
///
/// `business_key` is the business key of the owning process instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionRow {
    pub id: String,
    pub process_instance_id: String,
    pub parent_id: Option<String>,
    pub process_definition_id: String,
    pub process_definition_key: String,
    pub business_key: Option<String>,
    pub activity_id: Option<String>,
    pub is_active: bool,
    pub suspended: bool,
}

/// Input for inserting an execution
///
/// A `None` process instance id makes the execution the root of its own
/// process instance.
#[derive(Debug, Clone, Default)]
pub struct NewExecution {
    pub id: String,
    pub process_instance_id: Option<String>,
    pub parent_id: Option<String>,
    pub process_definition_id: String,
    pub process_definition_key: String,
    pub business_key: Option<String>,
    pub activity_id: Option<String>,
    pub suspended: bool,
}

impl NewExecution {
    /// Root execution of a new process instance
    pub fn process_instance(id: &str, definition_key: &str, definition_version: u32) -> Self {
        Self {
            id: id.to_string(),
            process_definition_id: format!("{}:{}", definition_key, definition_version),
            process_definition_key: definition_key.to_string(),
            ..Default::default()
        }
    }

    /// Child execution of `parent`, belonging to the same process instance
    pub fn child_of(parent: &NewExecution, id: &str, activity_id: &str) -> Self {
        Self {
            id: id.to_string(),
            process_instance_id: Some(parent.instance_id().to_string()),
            parent_id: Some(parent.id.clone()),
            process_definition_id: parent.process_definition_id.clone(),
            process_definition_key: parent.process_definition_key.clone(),
            business_key: None,
            activity_id: Some(activity_id.to_string()),
            suspended: false,
        }
    }

    pub fn with_business_key(mut self, business_key: &str) -> Self {
        self.business_key = Some(business_key.to_string());
        self
    }

    pub fn with_activity(mut self, activity_id: &str) -> Self {
        self.activity_id = Some(activity_id.to_string());
        self
    }

    pub fn instance_id(&self) -> &str {
        self.process_instance_id.as_deref().unwrap_or(&self.id)
    }
}

// ============================================================================
// Event subscription types
// ============================================================================

/// Kind of event an execution is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    Message,
    Signal,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Signal => "signal",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_instance_is_own_root() {
        let pi = NewExecution::process_instance("pi-1", "invoice-approval", 2);
        assert_eq!(pi.instance_id(), "pi-1");
        assert_eq!(pi.process_definition_id, "invoice-approval:2");
        assert!(pi.parent_id.is_none());
    }

    #[test]
    fn test_child_inherits_instance_and_definition() {
        let pi = NewExecution::process_instance("pi-1", "invoice-approval", 1)
            .with_business_key("INV-1");
        let child = NewExecution::child_of(&pi, "ex-2", "reviewTask");

        assert_eq!(child.instance_id(), "pi-1");
        assert_eq!(child.parent_id.as_deref(), Some("pi-1"));
        assert_eq!(child.process_definition_key, "invoice-approval");
        assert_eq!(child.activity_id.as_deref(), Some("reviewTask"));
        assert!(child.business_key.is_none());
    }

    #[test]
    fn test_event_type_names() {
        assert_eq!(EventType::Message.to_string(), "message");
        assert_eq!(EventType::Signal.as_str(), "signal");
    }
}
