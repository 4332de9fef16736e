//! Per-scenario key-value context
//!
//! Values produced by earlier steps (a created entity id, a server
//! timestamp) are stored here for the steps after them. The store is
//! created at scenario start, exclusively owned by one runner invocation,
//! and discarded at scenario end.

use std::collections::BTreeMap;

use serde_json::Value;

use crate::common::StepFailure;

#[derive(Debug, Default, Clone)]
pub struct ScenarioContext {
    values: BTreeMap<String, Value>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.values.insert(key.into(), value);
    }

    /// Look up a value captured by an earlier step.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Look up a value, converting absence into a step-local failure.
    ///
    /// This is the `ContextMissing` path: when an earlier step failed and
    /// never captured the value, the dereference fails here, inside the
    /// step, instead of crashing the run.
    pub fn require(&self, key: &str) -> Result<&Value, StepFailure> {
        self.get(key)
            .ok_or_else(|| StepFailure::context_missing(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::FailureKind;
    use serde_json::json;

    #[test]
    fn require_reports_context_missing() {
        let ctx = ScenarioContext::new();
        let err = ctx.require("work_id").unwrap_err();
        assert_eq!(err.kind, FailureKind::ContextMissing);
    }

    #[test]
    fn later_inserts_overwrite() {
        let mut ctx = ScenarioContext::new();
        ctx.insert("id", json!("a"));
        ctx.insert("id", json!("b"));
        assert_eq!(ctx.get("id"), Some(&json!("b")));
    }
}
