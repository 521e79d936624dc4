//! Application layer for reducebench.
//!
//! The app layer coordinates adapters and domain logic: it stages and runs
//! the reducer for each case, reads the resulting workfolders and writes
//! the comparison table. It does not parse CLI flags.

pub mod aggregate;
pub mod batch;
pub mod driver;
pub mod output;

pub use aggregate::read_benchmark;
pub use batch::{BatchSummary, BatchUseCase};
pub use driver::{CaseLayout, ReducerDriver};
pub use output::ResultTable;
