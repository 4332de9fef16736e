//! Scenario runner
//!
//! Walks a scenario's steps strictly in order, threading captured values
//! through the context. Failures are accumulated, never fatal: a scenario
//! always runs to completion, and there is no terminal-failure state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::CapturedError;
use crate::transport::Transport;

use super::context::ScenarioContext;
use super::report::Reporter;
use super::step::{execute_step, StepSpec};

/// Context key the authenticated subject id is seeded under.
pub const SUBJECT_ID_KEY: &str = "subject_id";

/// One end-to-end ordered test case. Static once built; immutable during
/// a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<StepSpec>,
}

/// The result of one scenario run; an empty error list is a full pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub scenario: String,
    pub steps_total: usize,
    pub errors: Vec<CapturedError>,
}

impl ScenarioOutcome {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Run one scenario to completion.
///
/// The context starts seeded with the authenticated subject id; each step
/// may add captures for the steps after it. A failed step is recorded and
/// the walk continues, so later steps get their chance (and fail locally
/// on a missing capture rather than crashing the run).
pub async fn run_scenario(
    transport: &dyn Transport,
    scenario: &Scenario,
    subject_id: &str,
    reporter: &dyn Reporter,
) -> ScenarioOutcome {
    tracing::debug!(scenario = %scenario.name, steps = scenario.steps.len(), "scenario start");

    let mut ctx = ScenarioContext::new();
    ctx.insert(SUBJECT_ID_KEY, Value::String(subject_id.to_string()));

    let mut errors = Vec::new();
    for step in &scenario.steps {
        if let Err(failure) = execute_step(transport, step, &mut ctx, reporter).await {
            errors.push(CapturedError::attribute(&scenario.name, &step.label, failure));
        }
    }

    ScenarioOutcome {
        scenario: scenario.name.clone(),
        steps_total: scenario.steps.len(),
        errors,
    }
}
