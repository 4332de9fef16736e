//! Step definitions and the step executor
//!
//! A step is one GraphQL operation plus its expectation check, declared
//! as plain data: a variables template with context placeholders, a list
//! of captures, and a verify spec. No closures, so a suite is
//! serializable, enumerable, and free of hidden shared state.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::StepFailure;
use crate::transport::Transport;

use super::context::ScenarioContext;
use super::expectation::{Expectation, FieldRule};
use super::report::Reporter;

/// Where a response value gets captured into the scenario context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSpec {
    /// Path below `data`, e.g. `["createWork", "id"]`.
    pub path: Vec<String>,
    /// Context key the value is stored under.
    pub key: String,
}

/// The check applied to a step's response after the success gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum VerifySpec {
    /// Compare `data.<field>` against an expectation record.
    Record {
        field: String,
        /// Path into the resolved variables holding the echo source.
        #[serde(default)]
        input: Vec<String>,
        rules: Vec<(String, FieldRule)>,
    },
    /// `data.<field>` must be null (deleted, or never existed).
    Absent { field: String },
    /// The list at `data.<field>.<path>` must contain an item whose `id`
    /// equals the context value under `id_key`.
    ListContains {
        field: String,
        #[serde(default)]
        path: Vec<String>,
        id_key: String,
    },
    /// Same lookup, but the item must be gone.
    ListExcludes {
        field: String,
        #[serde(default)]
        path: Vec<String>,
        id_key: String,
    },
    /// Best-effort step: transport errors and shapes are ignored.
    Ignore,
}

/// One scripted GraphQL operation plus its expectation check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepSpec {
    pub label: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
    /// Variables template; `{"$ctx": "key"}` objects resolve against the
    /// scenario context at execution time.
    pub variables: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub captures: Vec<CaptureSpec>,
    pub verify: VerifySpec,
    /// Path below `data` to the identifier shown on the success line.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Vec<String>>,
}

/// Run one step end to end: resolve variables, send, gate, capture,
/// verify, report. Every failure mode ends up as a `StepFailure`;
/// nothing escapes the step boundary.
pub async fn execute_step(
    transport: &dyn Transport,
    step: &StepSpec,
    ctx: &mut ScenarioContext,
    reporter: &dyn Reporter,
) -> Result<(), StepFailure> {
    reporter.step_started(&step.label);

    let result = run_step(transport, step, ctx).await;
    match &result {
        Ok(detail) => reporter.step_passed(&step.label, detail.as_deref()),
        Err(failure) => reporter.step_failed(&step.label, failure),
    }
    result.map(|_| ())
}

async fn run_step(
    transport: &dyn Transport,
    step: &StepSpec,
    ctx: &mut ScenarioContext,
) -> Result<Option<String>, StepFailure> {
    let variables = resolve_template(&step.variables, ctx)?;

    let envelope = match transport
        .send(&step.query, &variables, step.operation_name.as_deref())
        .await
    {
        Ok(envelope) => envelope,
        Err(e) => {
            if matches!(step.verify, VerifySpec::Ignore) {
                return Ok(None);
            }
            return Err(StepFailure::transport(e.to_string(), None));
        }
    };

    if !envelope.is_success() {
        if matches!(step.verify, VerifySpec::Ignore) {
            return Ok(None);
        }
        return Err(StepFailure::transport(
            format!("request failed (status {})", envelope.status),
            Some(envelope.raw_body()),
        ));
    }

    let data = envelope.body.data.unwrap_or(Value::Null);

    // Captures run before verification so a step may compare against the
    // values it just produced.
    for capture in &step.captures {
        if let Some(value) = walk(&data, &capture.path) {
            if !value.is_null() {
                ctx.insert(capture.key.clone(), value.clone());
            }
        }
    }

    verify(&step.verify, &variables, &data, ctx)?;

    let detail = step
        .detail
        .as_ref()
        .and_then(|path| walk(&data, path))
        .map(render_scalar);

    Ok(detail)
}

fn verify(
    spec: &VerifySpec,
    variables: &Value,
    data: &Value,
    ctx: &ScenarioContext,
) -> Result<(), StepFailure> {
    match spec {
        VerifySpec::Ignore => Ok(()),

        VerifySpec::Record {
            field,
            input,
            rules,
        } => {
            let actual = data.get(field.as_str()).cloned().unwrap_or(Value::Null);
            if actual.is_null() {
                return Err(StepFailure::shape(
                    format!("{field}: expected a record, got null"),
                    None,
                ));
            }

            let echo_source = walk(variables, input).cloned().unwrap_or(Value::Null);
            let expectation = Expectation::build(rules, &echo_source, ctx);
            let mismatches = expectation.diff(&actual);
            if mismatches.is_empty() {
                Ok(())
            } else {
                let detail = mismatches
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                Err(StepFailure::shape(format!("{field}: {detail}"), Some(actual)))
            }
        }

        VerifySpec::Absent { field } => {
            let actual = data.get(field.as_str()).cloned().unwrap_or(Value::Null);
            if actual.is_null() {
                Ok(())
            } else {
                Err(StepFailure::shape(
                    format!("{field}: expected null, got {actual}"),
                    Some(actual),
                ))
            }
        }

        VerifySpec::ListContains {
            field,
            path,
            id_key,
        } => {
            let id = ctx.require(id_key)?.clone();
            let items = list_at(data, field, path)?;
            if items.iter().any(|item| item.get("id") == Some(&id)) {
                Ok(())
            } else {
                Err(StepFailure::shape(
                    format!("{field}: no item with id {id}"),
                    None,
                ))
            }
        }

        VerifySpec::ListExcludes {
            field,
            path,
            id_key,
        } => {
            let id = ctx.require(id_key)?.clone();
            // An absent parent record counts as the child being gone.
            match list_at(data, field, path) {
                Ok(items) => {
                    if items.iter().any(|item| item.get("id") == Some(&id)) {
                        Err(StepFailure::shape(
                            format!("{field}: item {id} still present"),
                            None,
                        ))
                    } else {
                        Ok(())
                    }
                }
                Err(_) => Ok(()),
            }
        }
    }
}

fn list_at<'a>(data: &'a Value, field: &str, path: &[String]) -> Result<&'a Vec<Value>, StepFailure> {
    let mut node = data
        .get(field)
        .ok_or_else(|| StepFailure::shape(format!("{field}: missing from response"), None))?;
    for key in path {
        node = node
            .get(key.as_str())
            .ok_or_else(|| StepFailure::shape(format!("{field}.{key}: missing from response"), None))?;
    }
    node.as_array()
        .ok_or_else(|| StepFailure::shape(format!("{field}: expected a list"), None))
}

/// Resolve `{"$ctx": "key"}` placeholders against the scenario context.
fn resolve_template(template: &Value, ctx: &ScenarioContext) -> Result<Value, StepFailure> {
    match template {
        Value::Object(map) => {
            if map.len() == 1 {
                if let Some(Value::String(key)) = map.get("$ctx") {
                    return ctx.require(key).map(Clone::clone);
                }
            }
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                out.insert(k.clone(), resolve_template(v, ctx)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|v| resolve_template(v, ctx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}

/// Walk a path of object keys below a JSON value.
fn walk<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    let mut node = value;
    for key in path {
        node = node.get(key.as_str())?;
    }
    Some(node)
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::FailureKind;
    use serde_json::json;

    #[test]
    fn template_substitutes_context_placeholders() {
        let mut ctx = ScenarioContext::new();
        ctx.insert("subject_id", json!("user-1"));

        let template = json!({
            "id": { "$ctx": "subject_id" },
            "work": { "userId": { "$ctx": "subject_id" }, "title": "t" },
        });
        let resolved = resolve_template(&template, &ctx).unwrap();
        assert_eq!(
            resolved,
            json!({ "id": "user-1", "work": { "userId": "user-1", "title": "t" } })
        );
    }

    #[test]
    fn template_misses_surface_as_context_missing() {
        let err =
            resolve_template(&json!({ "id": { "$ctx": "work_id" } }), &ScenarioContext::new())
                .unwrap_err();
        assert_eq!(err.kind, FailureKind::ContextMissing);
    }

    #[test]
    fn absent_verify_accepts_null_and_rejects_records() {
        let ctx = ScenarioContext::new();
        let spec = VerifySpec::Absent {
            field: "getUser".to_string(),
        };

        assert!(verify(&spec, &json!({}), &json!({ "getUser": null }), &ctx).is_ok());

        let err = verify(
            &spec,
            &json!({}),
            &json!({ "getUser": { "id": "x" } }),
            &ctx,
        )
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::ShapeMismatch);
    }

    #[test]
    fn record_verify_rejects_null_data() {
        let spec = VerifySpec::Record {
            field: "createUser".to_string(),
            input: vec!["user".to_string()],
            rules: vec![("displayName".to_string(), FieldRule::Echo)],
        };
        let err = verify(
            &spec,
            &json!({ "user": { "displayName": "X" } }),
            &json!({ "createUser": null }),
            &ScenarioContext::new(),
        )
        .unwrap_err();
        assert_eq!(err.kind, FailureKind::ShapeMismatch);
        assert!(err.message.contains("null"));
    }

    #[test]
    fn list_contains_checks_membership_by_id() {
        let mut ctx = ScenarioContext::new();
        ctx.insert("work_id", json!("work-1"));
        let data = json!({
            "getUser": { "works": { "items": [{ "id": "work-1" }, { "id": "work-2" }] } }
        });

        let contains = VerifySpec::ListContains {
            field: "getUser".to_string(),
            path: vec!["works".to_string(), "items".to_string()],
            id_key: "work_id".to_string(),
        };
        assert!(verify(&contains, &json!({}), &data, &ctx).is_ok());

        let excludes = VerifySpec::ListExcludes {
            field: "getUser".to_string(),
            path: vec!["works".to_string(), "items".to_string()],
            id_key: "work_id".to_string(),
        };
        let err = verify(&excludes, &json!({}), &data, &ctx).unwrap_err();
        assert_eq!(err.kind, FailureKind::ShapeMismatch);
    }

    #[test]
    fn list_excludes_treats_missing_parent_as_gone() {
        let mut ctx = ScenarioContext::new();
        ctx.insert("work_id", json!("work-1"));
        let excludes = VerifySpec::ListExcludes {
            field: "getUser".to_string(),
            path: vec!["works".to_string(), "items".to_string()],
            id_key: "work_id".to_string(),
        };
        assert!(verify(&excludes, &json!({}), &json!({ "getUser": null }), &ctx).is_ok());
    }
}
