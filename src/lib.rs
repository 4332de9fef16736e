//! Portal GraphQL integration-test harness
//!
//! The core is the [`suite`] module: ordered, stateful execution of
//! multi-step scenarios with output-to-input data threading and
//! structural response verification. Authentication, transport, and the
//! CLI are thin collaborators around it.

pub mod auth;
pub mod cli;
pub mod commands;
pub mod common;
pub mod suite;
pub mod transport;

// Re-export commonly used types for tests
pub use common::{CapturedError, Error, FailureKind, Result, StepFailure};
pub use suite::{Scenario, ScenarioOutcome, SuiteReport, SuiteSummary};
