//! Environment configuration
//!
//! Values come from the process environment, with `.env` loading first and
//! interactive prompts as the fallback for credentials.

use dialoguer::{Input, Password};

use super::{Error, Result};

/// Resolved harness configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cognito region, e.g. `ap-northeast-1`
    pub region: String,
    /// Cognito app client id
    pub client_id: String,
    /// AppSync GraphQL endpoint URL
    pub endpoint: String,
    pub username: String,
    pub password: String,
    /// Per-request timeout for the GraphQL transport
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from `.env` and the environment, prompting for
    /// credentials when they are not supplied.
    pub fn load() -> Result<Self> {
        // A missing .env file is fine; the variables may be set directly.
        let _ = dotenvy::dotenv();

        let region = require_env("COGNITO_REGION_NAME")?;
        let client_id = require_env("COGNITO_CLIENT_KEY")?;
        let endpoint = require_env("APPSYNC_URL")?;

        let username = match optional_env("PORTAL_USERNAME") {
            Some(v) => v,
            None => Input::<String>::new()
                .with_prompt("Input cognito Username")
                .interact_text()
                .map_err(|e| Error::Config(format!("Failed to read username: {e}")))?,
        };

        let password = match optional_env("PORTAL_PASSWORD") {
            Some(v) => v,
            None => Password::new()
                .with_prompt("Input cognito Password")
                .interact()
                .map_err(|e| Error::Config(format!("Failed to read password: {e}")))?,
        };

        let request_timeout_secs = match optional_env("REQUEST_TIMEOUT_SECS") {
            Some(v) => v
                .parse()
                .map_err(|_| Error::Config(format!("Invalid REQUEST_TIMEOUT_SECS: {v}")))?,
            None => 30,
        };

        Ok(Self {
            region,
            client_id,
            endpoint,
            username,
            password,
            request_timeout_secs,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn require_env(key: &str) -> Result<String> {
    optional_env(key)
        .ok_or_else(|| Error::Config(format!("Missing required environment variable {key}")))
}
