//! Keystone Authentication
//!
//! Issues project-scoped tokens using the Identity v3 password method.
//! The token itself arrives in the `X-Subject-Token` response header;
//! the body carries the expiry timestamp and the service catalog.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};

use super::catalog::ServiceCatalog;
use super::http::{sanitize_for_log, HttpClient};
use crate::config::OpenStackConfig;

/// Response header carrying the issued token
const SUBJECT_TOKEN_HEADER: &str = "X-Subject-Token";

/// Domain used when the configuration leaves one unset
const DEFAULT_DOMAIN: &str = "Default";

/// Everything needed to request a scoped token
#[derive(Debug, Clone)]
pub struct Credentials {
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub project_name: String,
    pub user_domain_name: String,
    pub project_domain_name: String,
}

impl From<&OpenStackConfig> for Credentials {
    fn from(config: &OpenStackConfig) -> Self {
        Self {
            auth_url: config.auth_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            project_name: config.project_name.clone(),
            user_domain_name: domain_or_default(&config.user_domain_name),
            project_domain_name: domain_or_default(&config.project_domain_name),
        }
    }
}

fn domain_or_default(name: &str) -> String {
    if name.is_empty() {
        DEFAULT_DOMAIN.to_string()
    } else {
        name.to_string()
    }
}

/// A freshly issued token with its metadata
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: Option<DateTime<Utc>>,
    pub catalog: ServiceCatalog,
}

fn token_url(auth_url: &str) -> String {
    format!("{}/auth/tokens", auth_url.trim_end_matches('/'))
}

/// Build the Identity v3 password authentication payload
pub(crate) fn token_request_body(credentials: &Credentials) -> Value {
    json!({
        "auth": {
            "identity": {
                "methods": ["password"],
                "password": {
                    "user": {
                        "name": credentials.username,
                        "domain": {"name": credentials.user_domain_name},
                        "password": credentials.password,
                    }
                }
            },
            "scope": {
                "project": {
                    "name": credentials.project_name,
                    "domain": {"name": credentials.project_domain_name},
                }
            }
        }
    })
}

/// Request a scoped token from Keystone
pub async fn issue_token(http: &HttpClient, credentials: &Credentials) -> Result<IssuedToken> {
    let url = token_url(&credentials.auth_url);
    let body = token_request_body(credentials);

    let response = http.post(&url, &body).await?;
    let status = response.status();

    // The header disappears once the response is consumed, so grab it first
    let token = response
        .headers()
        .get(SUBJECT_TOKEN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let text = response
        .text()
        .await
        .context("failed to read token response")?;

    if !status.is_success() {
        tracing::error!(
            %status,
            body = %sanitize_for_log(&text),
            "authentication request failed"
        );
        anyhow::bail!("authentication failed: {}", status);
    }

    let token = token.context("token response missing X-Subject-Token header")?;

    let payload: Value =
        serde_json::from_str(&text).context("failed to parse token response")?;

    let expires_at = payload
        .get("token")
        .and_then(|t| t.get("expires_at"))
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc));

    let catalog = payload
        .get("token")
        .and_then(|t| t.get("catalog"))
        .cloned()
        .map(serde_json::from_value)
        .transpose()
        .context("failed to parse service catalog")?
        .map(|services| ServiceCatalog { services })
        .unwrap_or_default();

    Ok(IssuedToken {
        token,
        expires_at,
        catalog,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials() -> Credentials {
        Credentials {
            auth_url: "http://keystone:5000/v3".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            project_name: "demo".to_string(),
            user_domain_name: "Default".to_string(),
            project_domain_name: "Default".to_string(),
        }
    }

    #[test]
    fn password_payload_has_expected_shape() {
        let body = token_request_body(&credentials());

        assert_eq!(
            body,
            json!({
                "auth": {
                    "identity": {
                        "methods": ["password"],
                        "password": {
                            "user": {
                                "name": "admin",
                                "domain": {"name": "Default"},
                                "password": "secret",
                            }
                        }
                    },
                    "scope": {
                        "project": {
                            "name": "demo",
                            "domain": {"name": "Default"},
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn token_url_trims_trailing_slash() {
        assert_eq!(
            token_url("http://keystone:5000/v3/"),
            "http://keystone:5000/v3/auth/tokens"
        );
        assert_eq!(
            token_url("http://keystone:5000/v3"),
            "http://keystone:5000/v3/auth/tokens"
        );
    }

    #[test]
    fn empty_domains_fall_back_to_default() {
        let config = OpenStackConfig {
            auth_url: "http://keystone:5000/v3".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            project_name: "demo".to_string(),
            region: "RegionOne".to_string(),
            user_domain_name: String::new(),
            project_domain_name: String::new(),
        };

        let credentials = Credentials::from(&config);
        assert_eq!(credentials.user_domain_name, "Default");
        assert_eq!(credentials.project_domain_name, "Default");
    }

    #[test]
    fn explicit_domains_are_kept() {
        let config = OpenStackConfig {
            auth_url: "http://keystone:5000/v3".to_string(),
            username: "admin".to_string(),
            password: "secret".to_string(),
            project_name: "demo".to_string(),
            region: "RegionOne".to_string(),
            user_domain_name: "users".to_string(),
            project_domain_name: "projects".to_string(),
        };

        let credentials = Credentials::from(&config);
        assert_eq!(credentials.user_domain_name, "users");
        assert_eq!(credentials.project_domain_name, "projects");
    }
}
