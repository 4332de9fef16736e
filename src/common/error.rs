//! Error types for the portal test harness
//!
//! Two tiers: `Error` covers harness-level problems that stop the run
//! before or outside the suite (configuration, sign-in, suite parsing),
//! while `StepFailure`/`CapturedError` record a single failed step.
//! Step failures are data carried up through the runner, never control
//! flow out of a scenario.

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Harness-level error type
#[derive(Error, Debug)]
pub enum Error {
    // === Auth Errors ===
    #[error("Cognito rejected the sign-in: {0}")]
    AuthRejected(String),

    #[error("Cognito call failed: {0}")]
    AuthTransport(#[source] reqwest::Error),

    #[error("Failed to decode identity token: {0}")]
    TokenDecode(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse suite file '{path}': {message}")]
    SuiteParse { path: String, message: String },

    // === Transport Errors ===
    #[error("GraphQL request failed: {0}")]
    Transport(#[from] reqwest::Error),

    // === IO / Serialization ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Kind of step-local failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Non-200 status, a GraphQL `errors` array, or a failed round trip.
    Transport,
    /// Response data did not match the expectation record.
    ShapeMismatch,
    /// A required context value was never captured by an earlier step.
    ContextMissing,
}

/// A step-local failure, before it is attributed to a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepFailure {
    pub kind: FailureKind,
    pub message: String,
    /// Raw response body, when the failure came off the wire.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl StepFailure {
    pub fn transport(message: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            kind: FailureKind::Transport,
            message: message.into(),
            body,
        }
    }

    pub fn shape(message: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            kind: FailureKind::ShapeMismatch,
            message: message.into(),
            body,
        }
    }

    pub fn context_missing(key: &str) -> Self {
        Self {
            kind: FailureKind::ContextMissing,
            message: format!("no value captured under '{key}'"),
            body: None,
        }
    }
}

/// A step failure attributed to its scenario, as persisted in the error dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapturedError {
    pub scenario: String,
    pub step: String,
    pub kind: FailureKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl CapturedError {
    /// Attribute a step-local failure to its scenario and step.
    pub fn attribute(scenario: &str, step: &str, failure: StepFailure) -> Self {
        Self {
            scenario: scenario.to_string(),
            step: step.to_string(),
            kind: failure.kind,
            message: failure.message,
            body: failure.body,
        }
    }
}
