//! Execution queries
//!
//! Turns client filter requests into validated queries and runs them a page
//! at a time:
//! - `compiler` - `FilterCompiler`, request → `CompiledQuery`
//! - `page` - `PageAssembler`, sort validation and page retrieval
//! - `lookup` - single-execution lookup and variable updates

pub mod compiler;
pub mod error;
pub mod lookup;
pub mod page;
pub mod query;
pub mod request;
pub mod sort;
pub mod variables;

pub use compiler::FilterCompiler;
pub use error::QueryError;
pub use lookup::{get_execution, set_execution_variables};
pub use page::{ExecutionView, Page, PageAssembler};
pub use query::{
    CompiledQuery, Constraint, ExecutionQueryBuilder, VariableCondition, VariableConstraints,
    VariableScope,
};
pub use request::{ExecutionQueryRequest, QueryVariable, QueryVariableOperation};
pub use sort::{ExecutionSortProperty, SortDirection, SortOrder, SortRequest, SortWhitelist};
pub use variables::{JsonVariableResolver, RestVariable, VariableResolver, VariableValue};
