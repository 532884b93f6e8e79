//! HTTP utilities for OpenStack REST API calls

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

/// Header carrying the Keystone token on authenticated requests
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize a response body for logging: strip non-printable characters
/// and truncate long responses.
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let mut printable = body.chars().filter(|c| c.is_ascii_graphic() || *c == ' ');
    let prefix: String = printable.by_ref().take(MAX_LOG_BODY_LENGTH).collect();

    if printable.next().is_some() {
        format!("{}... [truncated, {} bytes total]", prefix, body.len())
    } else {
        prefix
    }
}

/// HTTP client wrapper for OpenStack API calls
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("osmcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Make a token-authenticated GET request to an OpenStack API
    pub async fn get(&self, url: &str, token: &str) -> Result<Value> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(AUTH_TOKEN_HEADER, token)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(anyhow::anyhow!("API request failed: {}", status));
        }

        serde_json::from_str(&body).context("Failed to parse response JSON")
    }

    /// Make an unauthenticated POST request with a JSON body and hand the
    /// raw response back. The Keystone token exchange needs the response
    /// headers, so status handling is left to the caller.
    pub async fn post(&self, url: &str, body: &Value) -> Result<reqwest::Response> {
        tracing::debug!("POST {}", url);

        self.client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")
    }
}
