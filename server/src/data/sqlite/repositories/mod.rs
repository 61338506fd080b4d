//! SQLite repositories
//!
//! Row types (ExecutionRow, NewExecution, ...) live in `crate::data::types`.

pub mod event_subscription;
pub mod execution;
pub mod variable;

pub use event_subscription::{add_event_subscription, list_event_names};
pub use execution::{count_executions, get_execution, insert_execution, list_executions};
pub use variable::{get_variables, set_variables};
