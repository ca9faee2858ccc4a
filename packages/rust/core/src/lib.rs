//! Pipeline orchestration for Draftmill.
//!
//! [`pipeline::run`] composes the catalog loader, selection state store,
//! topic selector, and draft assembler into one scheduled run.

pub mod pipeline;

pub use pipeline::{ProgressReporter, RunConfig, RunOutcome, SilentProgress, run};
