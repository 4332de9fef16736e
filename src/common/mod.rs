//! Common utilities shared across the harness

pub mod config;
pub mod error;
pub mod logging;

pub use error::{CapturedError, Error, FailureKind, Result, StepFailure};
