//! Expectation records and structural diffing
//!
//! An expectation is derived from the variables a step sent plus values
//! captured earlier in the scenario. Server-assigned fields are never
//! predicted: they compare against a captured value when one exists and
//! are otherwise left unchecked. Comparison produces a list of
//! field-level mismatches rather than a single boolean, so a failure
//! names every field that diverged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::context::ScenarioContext;

/// How a single selected field is expected to come back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum FieldRule {
    /// The input field must be echoed unchanged.
    Echo,
    /// Echoed, except a blank input compares against this server default.
    EchoOr { default: Value },
    /// Literal expected value.
    Equals { value: Value },
    /// Server-assigned; compared against a previously captured context
    /// value when one exists, otherwise left unchecked.
    Captured { key: String },
    /// Selected but not verifiable.
    Unchecked,
}

/// One field-level difference between expectation and response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMismatch {
    pub field: String,
    pub expected: Value,
    pub actual: Value,
}

impl std::fmt::Display for FieldMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.field, self.expected, self.actual
        )
    }
}

/// An expected record: field name to concrete expected value.
#[derive(Debug, Default, Clone)]
pub struct Expectation {
    fields: Vec<(String, Value)>,
}

impl Expectation {
    /// Build the expected record for one step from its field rules, the
    /// input payload it sent, and the scenario context.
    ///
    /// Rules that cannot resolve to a concrete value (an `Echo` of a field
    /// absent from the input, a `Captured` key with no prior capture) drop
    /// out of the record entirely; the field goes unchecked.
    pub fn build(rules: &[(String, FieldRule)], input: &Value, ctx: &ScenarioContext) -> Self {
        let mut fields = Vec::with_capacity(rules.len());
        for (name, rule) in rules {
            let expected = match rule {
                FieldRule::Echo => input.get(name.as_str()).cloned(),
                FieldRule::EchoOr { default } => match input.get(name.as_str()) {
                    Some(Value::String(s)) if s.is_empty() => Some(default.clone()),
                    other => other.cloned(),
                },
                FieldRule::Equals { value } => Some(value.clone()),
                FieldRule::Captured { key } => ctx.get(key).cloned(),
                FieldRule::Unchecked => None,
            };
            if let Some(expected) = expected {
                fields.push((name.clone(), expected));
            }
        }
        Self { fields }
    }

    /// Structurally diff the response record against this expectation.
    ///
    /// Returns one entry per mismatching field; empty means the shapes
    /// agree. A field missing from the response diffs as `null`.
    pub fn diff(&self, actual: &Value) -> Vec<FieldMismatch> {
        let record = actual.as_object();
        let mut mismatches = Vec::new();
        for (field, expected) in &self.fields {
            let got = record
                .and_then(|r| r.get(field))
                .cloned()
                .unwrap_or(Value::Null);
            if !values_match(expected, &got) {
                mismatches.push(FieldMismatch {
                    field: field.clone(),
                    expected: expected.clone(),
                    actual: got,
                });
            }
        }
        mismatches
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Value comparison; arrays compare by membership, not position.
fn values_match(expected: &Value, actual: &Value) -> bool {
    match (expected, actual) {
        (Value::Array(exp), Value::Array(act)) => {
            exp.len() == act.len() && exp.iter().all(|e| act.iter().any(|a| values_match(e, a)))
        }
        (Value::Object(exp), Value::Object(act)) => exp
            .iter()
            .all(|(k, e)| act.get(k).is_some_and(|a| values_match(e, a))),
        _ => expected == actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rules(list: &[(&str, FieldRule)]) -> Vec<(String, FieldRule)> {
        list.iter()
            .map(|(n, r)| (n.to_string(), r.clone()))
            .collect()
    }

    #[test]
    fn echo_copies_input_fields() {
        let input = json!({ "displayName": "X", "email": "a@b.co" });
        let expectation = Expectation::build(
            &rules(&[("displayName", FieldRule::Echo), ("email", FieldRule::Echo)]),
            &input,
            &ScenarioContext::new(),
        );

        let ok = json!({ "displayName": "X", "email": "a@b.co", "id": "ignored" });
        assert!(expectation.diff(&ok).is_empty());

        let bad = json!({ "displayName": "Y", "email": "a@b.co" });
        let mismatches = expectation.diff(&bad);
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].field, "displayName");
    }

    #[test]
    fn blank_input_compares_against_server_default() {
        let input = json!({ "message": "" });
        let expectation = Expectation::build(
            &rules(&[(
                "message",
                FieldRule::EchoOr {
                    default: json!(" "),
                },
            )]),
            &input,
            &ScenarioContext::new(),
        );

        assert!(expectation.diff(&json!({ "message": " " })).is_empty());
        assert_eq!(expectation.diff(&json!({ "message": "" })).len(), 1);
    }

    #[test]
    fn captured_field_is_unchecked_without_prior_capture() {
        let expectation = Expectation::build(
            &rules(&[(
                "id",
                FieldRule::Captured {
                    key: "work_id".to_string(),
                },
            )]),
            &json!({}),
            &ScenarioContext::new(),
        );
        assert!(expectation.is_empty());
        assert!(expectation.diff(&json!({ "id": "anything" })).is_empty());
    }

    #[test]
    fn captured_field_compares_once_a_value_exists() {
        let mut ctx = ScenarioContext::new();
        ctx.insert("work_id", json!("work-1"));
        let expectation = Expectation::build(
            &rules(&[(
                "id",
                FieldRule::Captured {
                    key: "work_id".to_string(),
                },
            )]),
            &json!({}),
            &ctx,
        );

        assert!(expectation.diff(&json!({ "id": "work-1" })).is_empty());
        assert_eq!(expectation.diff(&json!({ "id": "work-2" })).len(), 1);
    }

    #[test]
    fn missing_response_field_diffs_as_null() {
        let expectation = Expectation::build(
            &rules(&[(
                "career",
                FieldRule::Equals {
                    value: json!("c"),
                },
            )]),
            &json!({}),
            &ScenarioContext::new(),
        );
        let mismatches = expectation.diff(&json!({}));
        assert_eq!(mismatches.len(), 1);
        assert_eq!(mismatches[0].actual, Value::Null);
    }

    #[test]
    fn list_fields_compare_by_membership() {
        assert!(values_match(
            &json!(["a", "b", "c"]),
            &json!(["c", "a", "b"])
        ));
        assert!(!values_match(&json!(["a", "b"]), &json!(["a", "a"])));
        assert!(!values_match(&json!(["a", "b"]), &json!(["a"])));
    }
}
