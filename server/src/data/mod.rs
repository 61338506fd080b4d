//! Data storage layer
//!
//! - `sqlite` - Embedded store for executions, variables and subscriptions
//! - `types` - Row types shared by storage backends
//! - `traits` - Repository traits consumed by the domain and API layers
//! - `error` - Unified error type for all backends

pub mod error;
pub mod sqlite;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use sqlite::SqliteService;
pub use traits::ExecutionRepository;
pub use types::{EventType, ExecutionRow, NewExecution};
