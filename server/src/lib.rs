//! Workflow execution query service
//!
//! - `core` - CLI, configuration and application lifecycle
//! - `domain` - Filter compilation and page assembly for executions
//! - `data` - SQLite storage behind the `ExecutionRepository` trait
//! - `api` - HTTP transport

mod app;

pub mod api;
pub mod core;
pub mod data;
pub mod domain;
pub mod utils;
