//! API route handlers

pub mod executions;
pub mod health;
