//! OpenStack Configuration
//!
//! Credentials and scope for the OpenStack session, validated before any
//! network call is made.

/// Field order for required-field validation. The first empty field wins,
/// so error messages are deterministic when several flags are missing.
const REQUIRED_FIELDS: &[(&str, &str)] = &[
    ("auth-url", "auth URL is required"),
    ("username", "username is required"),
    ("password", "password is required"),
    ("project", "project name is required"),
    ("region", "region is required"),
];

/// Immutable OpenStack configuration.
///
/// The five classic fields (auth URL, username, password, project, region)
/// are mandatory; the domain names default to `Default`, which is what
/// single-domain Keystone deployments expect.
#[derive(Debug, Clone)]
pub struct OpenStackConfig {
    /// Keystone endpoint, e.g. `https://keystone.example:5000/v3`
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub project_name: String,
    pub region: String,
    pub user_domain_name: String,
    pub project_domain_name: String,
}

/// Validation error naming the offending configuration field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ConfigError {
    pub field: &'static str,
    pub message: &'static str,
}

impl OpenStackConfig {
    /// Check that all required fields are non-empty.
    ///
    /// Fields are checked in a fixed order (auth-url, username, password,
    /// project, region) and the first empty one is reported. Domain names
    /// are never required; empty domains fall back to `Default` when the
    /// credentials are built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            &self.auth_url,
            &self.username,
            &self.password,
            &self.project_name,
            &self.region,
        ];

        for ((field, message), value) in REQUIRED_FIELDS.iter().copied().zip(values) {
            if value.is_empty() {
                return Err(ConfigError { field, message });
            }
        }

        Ok(())
    }
}
