//! Test-sequencing and assertion core
//!
//! Ordered, stateful execution of multi-step scenarios: each step's input
//! may depend on a prior step's captured output, one step's failure never
//! aborts its scenario, and every response is structurally compared
//! against an expectation derived from the request.

pub mod context;
pub mod driver;
pub mod expectation;
pub mod report;
pub mod runner;
pub mod scenarios;
pub mod step;

use std::path::Path;

use crate::common::{Error, Result};

pub use context::ScenarioContext;
pub use driver::{run_all, SuiteReport, SuiteSummary};
pub use expectation::{Expectation, FieldMismatch, FieldRule};
pub use report::{ConsoleReporter, Reporter, SilentReporter};
pub use runner::{run_scenario, Scenario, ScenarioOutcome, SUBJECT_ID_KEY};
pub use step::{CaptureSpec, StepSpec, VerifySpec};

/// Load a scenario suite from a YAML file.
pub fn load_suite(path: &Path) -> Result<Vec<Scenario>> {
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| Error::SuiteParse {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn loads_a_suite_from_yaml() {
        let yaml = serde_yaml::to_string(&scenarios::default_suite()).unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let suite = load_suite(file.path()).unwrap();
        assert_eq!(suite.len(), 2);
    }

    #[test]
    fn rejects_malformed_suite_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"- name: broken\n  steps: 12\n").unwrap();

        assert!(matches!(
            load_suite(file.path()),
            Err(Error::SuiteParse { .. })
        ));
    }
}
