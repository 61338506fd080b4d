//! Domain logic for workflow executions
//!
//! - `executions` - Filter compilation, page assembly and execution lookup

pub mod executions;
