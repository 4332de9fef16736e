//! AWS Cognito authentication
//!
//! Exchanges a username/password for an identity token through the
//! `USER_PASSWORD_AUTH` flow, then decodes the JWT payload for the subject
//! claims. Any failure here is fatal to the whole run: no scenario
//! executes without a subject id and a bearer token.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::json;

use crate::common::{Error, Result};

/// Claims pulled from the decoded identity token.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityClaims {
    /// Cognito subject id; doubles as the portal user id.
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, rename = "custom:display_name")]
    pub display_name: Option<String>,
}

/// A completed sign-in: the raw bearer token plus its decoded claims.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub bearer_token: String,
    pub claims: IdentityClaims,
}

#[derive(Debug, Deserialize)]
struct InitiateAuthResponse {
    #[serde(rename = "AuthenticationResult")]
    authentication_result: Option<AuthenticationResult>,
}

#[derive(Debug, Deserialize)]
struct AuthenticationResult {
    #[serde(rename = "IdToken")]
    id_token: String,
}

/// Client for the Cognito identity provider endpoint.
pub struct CognitoClient {
    http: reqwest::Client,
    region: String,
    client_id: String,
}

impl CognitoClient {
    pub fn new(region: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            region: region.into(),
            client_id: client_id.into(),
        }
    }

    /// Run the USER_PASSWORD_AUTH flow and decode the returned token.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<AuthSession> {
        let url = format!("https://cognito-idp.{}.amazonaws.com/", self.region);
        let body = json!({
            "AuthFlow": "USER_PASSWORD_AUTH",
            "AuthParameters": {
                "USERNAME": username,
                "PASSWORD": password,
            },
            "ClientId": self.client_id,
        });

        tracing::debug!(region = %self.region, "initiating USER_PASSWORD_AUTH");

        let response = self
            .http
            .post(&url)
            .header("Content-Type", "application/x-amz-json-1.1")
            .header("X-Amz-Target", "AWSCognitoIdentityProviderService.InitiateAuth")
            .body(body.to_string())
            .send()
            .await
            .map_err(Error::AuthTransport)?;

        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::AuthRejected(detail));
        }

        let parsed: InitiateAuthResponse = response.json().await.map_err(Error::AuthTransport)?;
        let result = parsed.authentication_result.ok_or_else(|| {
            Error::AuthRejected(
                "no AuthenticationResult in response (challenge flows are not supported)"
                    .to_string(),
            )
        })?;

        let claims = decode_claims(&result.id_token)?;
        tracing::info!(sub = %claims.sub, "signed in");

        Ok(AuthSession {
            bearer_token: result.id_token,
            claims,
        })
    }
}

/// Decode the payload segment of a JWT without verifying the signature.
/// The backend verifies the token; the harness only needs the claims.
pub fn decode_claims(token: &str) -> Result<IdentityClaims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| Error::TokenDecode("token is not a JWT".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| Error::TokenDecode(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| Error::TokenDecode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_token(payload: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","kid":"test"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string().as_bytes());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn decodes_subject_and_custom_claims() {
        let token = fake_token(json!({
            "sub": "11111111-2222-3333-4444-555555555555",
            "email": "a@b.co",
            "custom:display_name": "Sample User",
        }));

        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub, "11111111-2222-3333-4444-555555555555");
        assert_eq!(claims.email.as_deref(), Some("a@b.co"));
        assert_eq!(claims.display_name.as_deref(), Some("Sample User"));
    }

    #[test]
    fn tolerates_missing_optional_claims() {
        let token = fake_token(json!({ "sub": "abc" }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(claims.sub, "abc");
        assert!(claims.email.is_none());
        assert!(claims.display_name.is_none());
    }

    #[test]
    fn rejects_non_jwt_input() {
        assert!(matches!(
            decode_claims("not-a-token"),
            Err(Error::TokenDecode(_))
        ));
    }
}
