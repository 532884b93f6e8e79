//! Keystone Service Catalog
//!
//! The token response carries a catalog of services and their endpoints;
//! per-service clients are derived from it by looking up the public
//! endpoint for the configured region.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;

/// Endpoint interface consumed by this service. Internal and admin
/// endpoints are never selected.
const PUBLIC_INTERFACE: &str = "public";

/// OpenStack services this server talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Compute,
    Network,
    Orchestration,
}

impl Service {
    /// Service type string as it appears in the Keystone catalog
    pub fn catalog_type(self) -> &'static str {
        match self {
            Service::Compute => "compute",
            Service::Network => "network",
            Service::Orchestration => "orchestration",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.catalog_type())
    }
}

/// One endpoint of a catalog service
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogEndpoint {
    #[serde(default)]
    pub interface: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub region_id: Option<String>,
    pub url: String,
}

impl CatalogEndpoint {
    /// Whether this endpoint serves the given region. Keystone usually
    /// sends both `region` and `region_id`; either match counts.
    fn in_region(&self, region: &str) -> bool {
        self.region.as_deref() == Some(region) || self.region_id.as_deref() == Some(region)
    }
}

/// One service entry in the catalog
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogService {
    #[serde(rename = "type")]
    pub service_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

/// Service catalog extracted from a token response
#[derive(Debug, Clone, Default)]
pub struct ServiceCatalog {
    pub services: Vec<CatalogService>,
}

impl ServiceCatalog {
    /// Resolve the public endpoint URL for a service in a region.
    ///
    /// The returned URL has no trailing slash so request paths can be
    /// appended with a single separator.
    pub fn endpoint_url(&self, service: Service, region: &str) -> Result<String> {
        let entry = self
            .services
            .iter()
            .find(|s| s.service_type == service.catalog_type())
            .with_context(|| format!("service '{}' not found in catalog", service))?;

        let endpoint = entry
            .endpoints
            .iter()
            .find(|e| e.interface == PUBLIC_INTERFACE && e.in_region(region))
            .with_context(|| {
                format!("no public '{}' endpoint in region '{}'", service, region)
            })?;

        Ok(endpoint.url.trim_end_matches('/').to_string())
    }
}
