//! Suite driver
//!
//! Runs every scenario in sequence and aggregates the outcomes. Scenarios
//! never share context, so the driver's only job is ordering and
//! bookkeeping.

use serde::{Deserialize, Serialize};

use crate::common::CapturedError;
use crate::transport::Transport;

use super::report::Reporter;
use super::runner::{run_scenario, Scenario, ScenarioOutcome};

/// Aggregate counts over one full run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub total_scenarios: usize,
    pub failed_scenarios: usize,
    pub total_steps: usize,
    pub failed_steps: usize,
}

impl SuiteSummary {
    pub fn all_passed(&self) -> bool {
        self.failed_scenarios == 0
    }
}

/// The outcome of a full suite run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub outcomes: Vec<ScenarioOutcome>,
    pub summary: SuiteSummary,
}

impl SuiteReport {
    /// All captured errors across scenarios, for external persistence.
    pub fn error_dump(&self) -> Vec<&CapturedError> {
        self.outcomes.iter().flat_map(|o| o.errors.iter()).collect()
    }
}

/// Run all scenarios sequentially against one transport.
pub async fn run_all(
    transport: &dyn Transport,
    scenarios: &[Scenario],
    subject_id: &str,
    reporter: &dyn Reporter,
) -> SuiteReport {
    let mut outcomes = Vec::with_capacity(scenarios.len());
    for (index, scenario) in scenarios.iter().enumerate() {
        reporter.scenario_started(index, scenarios.len(), &scenario.name);
        outcomes.push(run_scenario(transport, scenario, subject_id, reporter).await);
    }

    let summary = SuiteSummary {
        total_scenarios: outcomes.len(),
        failed_scenarios: outcomes.iter().filter(|o| !o.passed()).count(),
        total_steps: outcomes.iter().map(|o| o.steps_total).sum(),
        failed_steps: outcomes.iter().map(|o| o.errors.len()).sum(),
    };

    SuiteReport { outcomes, summary }
}
