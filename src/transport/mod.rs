//! GraphQL transport
//!
//! One POST per call against the AppSync endpoint with the identity token
//! in the `Authorization` header. The suite core only sees the
//! [`Transport`] trait, which keeps it runnable against a scripted
//! transport in tests.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::Result;

/// Parsed GraphQL response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlBody {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<Value>>,
}

/// One transport round trip: HTTP status plus parsed body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub body: GraphqlBody,
}

impl ResponseEnvelope {
    /// Application-level success gate: HTTP 200 and no `errors` array.
    ///
    /// Partial nulls inside `data` still pass the gate; shape
    /// verification catches those.
    pub fn is_success(&self) -> bool {
        self.status == 200 && self.body.errors.is_none()
    }

    /// The raw body as a JSON value, used as the failure payload.
    pub fn raw_body(&self) -> Value {
        serde_json::to_value(&self.body).unwrap_or(Value::Null)
    }
}

/// A collaborator that performs exactly one GraphQL request per call.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        query: &str,
        variables: &Value,
        operation_name: Option<&str>,
    ) -> Result<ResponseEnvelope>;
}

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    #[serde(rename = "operationName")]
    operation_name: Option<&'a str>,
    query: &'a str,
    variables: &'a Value,
}

/// Reqwest-backed client for the AppSync endpoint.
///
/// Endpoint and token are immutable for the duration of a run; there is
/// no token refresh mid-suite.
pub struct GraphqlClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl GraphqlClient {
    pub fn new(
        endpoint: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        })
    }
}

#[async_trait]
impl Transport for GraphqlClient {
    async fn send(
        &self,
        query: &str,
        variables: &Value,
        operation_name: Option<&str>,
    ) -> Result<ResponseEnvelope> {
        let request = GraphqlRequest {
            operation_name,
            query,
            variables,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", &self.token)
            .json(&request)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body: GraphqlBody = response.json().await?;
        tracing::debug!(status, has_errors = body.errors.is_some(), "graphql round trip");

        Ok(ResponseEnvelope { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(status: u16, body: Value) -> ResponseEnvelope {
        ResponseEnvelope {
            status,
            body: serde_json::from_value(body).unwrap(),
        }
    }

    #[test]
    fn gate_passes_on_200_without_errors() {
        assert!(envelope(200, json!({ "data": { "getUser": null } })).is_success());
    }

    #[test]
    fn gate_fails_on_errors_array() {
        let env = envelope(
            200,
            json!({ "data": null, "errors": [{ "message": "denied" }] }),
        );
        assert!(!env.is_success());
    }

    #[test]
    fn gate_fails_on_non_200_even_without_errors_field() {
        // The stricter gate: a 500 with a clean body is still a failure.
        assert!(!envelope(500, json!({ "data": null })).is_success());
    }
}
