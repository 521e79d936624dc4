//! reducebench workspace-level test utilities.
//!
//! This crate exists solely to support workspace-level integration tests,
//! particularly the BDD/cucumber tests in `tests/cucumber.rs`.
//!
//! The actual reducebench functionality is in the workspace member crates:
//! - `reducebench-types`: Shared row types and the config file schema
//! - `reducebench-domain`: Pure summary and verification logic
//! - `reducebench-adapters`: Process and filesystem adapters
//! - `reducebench-app`: Driver, aggregator and batch use cases
//! - `reducebench` (reducebench-cli): CLI interface
