//! Shared data types for storage backends

mod execution;

pub use execution::{EventType, ExecutionRow, NewExecution};
