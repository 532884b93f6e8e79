//! Resource Model
//!
//! Resource kinds exposed by this server, their published record shapes,
//! and the URI scheme used to address individual resources.

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

use crate::openstack::catalog::Service;

/// URI scheme prefix for published resources
pub const URI_SCHEME: &str = "openstack://";

/// MIME type attached to every published resource
pub const RESOURCE_MIME_TYPE: &str = "application/json";

/// Kinds of resources the server publishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Instances,
    Networks,
    Stacks,
}

impl ResourceKind {
    /// Every kind, in the order collections are aggregated
    pub const ALL: [ResourceKind; 3] = [
        ResourceKind::Instances,
        ResourceKind::Networks,
        ResourceKind::Stacks,
    ];

    /// URI path segment for this kind
    pub fn as_str(self) -> &'static str {
        match self {
            ResourceKind::Instances => "instances",
            ResourceKind::Networks => "networks",
            ResourceKind::Stacks => "stacks",
        }
    }

    /// Singular label used in published resource names
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Instances => "Instance",
            ResourceKind::Networks => "Network",
            ResourceKind::Stacks => "Stack",
        }
    }

    /// Catalog service this kind is fetched from
    pub fn service(self) -> Service {
        match self {
            ResourceKind::Instances => Service::Compute,
            ResourceKind::Networks => Service::Network,
            ResourceKind::Stacks => Service::Orchestration,
        }
    }

    /// Key under which the API returns the collection array
    pub fn collection_key(self) -> &'static str {
        match self {
            ResourceKind::Instances => "servers",
            ResourceKind::Networks => "networks",
            ResourceKind::Stacks => "stacks",
        }
    }

    /// Request path listing the full collection
    pub fn list_path(self) -> &'static str {
        match self {
            ResourceKind::Instances => "servers/detail",
            ResourceKind::Networks => "v2.0/networks",
            ResourceKind::Stacks => "stacks",
        }
    }

    /// Key under which the API returns a single item
    pub fn item_key(self) -> &'static str {
        match self {
            ResourceKind::Instances => "server",
            ResourceKind::Networks => "network",
            ResourceKind::Stacks => "stack",
        }
    }

    /// Request path for a single resource by id
    pub fn detail_path(self, id: &str) -> String {
        let id = urlencoding::encode(id);
        match self {
            ResourceKind::Instances => format!("servers/{}", id),
            ResourceKind::Networks => format!("v2.0/networks/{}", id),
            ResourceKind::Stacks => format!("stacks/{}", id),
        }
    }

    /// Parse a URI path segment back into a kind
    pub fn from_slug(slug: &str) -> Option<Self> {
        ResourceKind::ALL.into_iter().find(|kind| kind.as_str() == slug)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn string_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Compute instance record
#[derive(Debug, Clone, Serialize)]
pub struct InstanceRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    pub flavor: Option<String>,
    pub image: Option<String>,
    pub created: String,
    pub updated: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Value>,
}

impl From<&Value> for InstanceRecord {
    fn from(value: &Value) -> Self {
        Self {
            id: string_field(value, "id"),
            name: string_field(value, "name"),
            status: string_field(value, "status"),
            flavor: value
                .get("flavor")
                .and_then(|f| f.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string),
            // Boot-from-volume servers report image as an empty string
            // instead of an object, which this chain maps to None
            image: value
                .get("image")
                .and_then(|i| i.get("id"))
                .and_then(Value::as_str)
                .map(str::to_string),
            created: string_field(value, "created"),
            updated: string_field(value, "updated"),
            addresses: None,
        }
    }
}

impl InstanceRecord {
    /// Attach the network addresses carried by detail responses
    pub fn with_addresses(mut self, value: &Value) -> Self {
        self.addresses = value.get("addresses").cloned();
        self
    }
}

/// Network record
#[derive(Debug, Clone, Serialize)]
pub struct NetworkRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    pub admin_state_up: bool,
    pub shared: bool,
    pub tenant_id: String,
}

impl From<&Value> for NetworkRecord {
    fn from(value: &Value) -> Self {
        Self {
            id: string_field(value, "id"),
            name: string_field(value, "name"),
            status: string_field(value, "status"),
            admin_state_up: value
                .get("admin_state_up")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            shared: value.get("shared").and_then(Value::as_bool).unwrap_or(false),
            // Newer Neutron releases send project_id instead of tenant_id
            tenant_id: value
                .get("tenant_id")
                .and_then(Value::as_str)
                .or_else(|| value.get("project_id").and_then(Value::as_str))
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Orchestration stack record
#[derive(Debug, Clone, Serialize)]
pub struct StackRecord {
    pub id: String,
    pub name: String,
    pub status: String,
    pub description: String,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<&Value> for StackRecord {
    fn from(value: &Value) -> Self {
        Self {
            id: string_field(value, "id"),
            name: string_field(value, "stack_name"),
            status: string_field(value, "stack_status"),
            description: string_field(value, "description"),
            created_at: string_field(value, "creation_time"),
            updated_at: value
                .get("updated_time")
                .and_then(Value::as_str)
                .map(str::to_string),
        }
    }
}

/// Any resource record, for code that handles kinds uniformly
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResourceRecord {
    Instance(InstanceRecord),
    Network(NetworkRecord),
    Stack(StackRecord),
}

impl ResourceRecord {
    /// Convert a raw API item into the record for its kind
    pub fn from_item(kind: ResourceKind, item: &Value) -> Self {
        match kind {
            ResourceKind::Instances => ResourceRecord::Instance(InstanceRecord::from(item)),
            ResourceKind::Networks => ResourceRecord::Network(NetworkRecord::from(item)),
            ResourceKind::Stacks => ResourceRecord::Stack(StackRecord::from(item)),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceRecord::Instance(_) => ResourceKind::Instances,
            ResourceRecord::Network(_) => ResourceKind::Networks,
            ResourceRecord::Stack(_) => ResourceKind::Stacks,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            ResourceRecord::Instance(r) => &r.id,
            ResourceRecord::Network(r) => &r.id,
            ResourceRecord::Stack(r) => &r.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ResourceRecord::Instance(r) => &r.name,
            ResourceRecord::Network(r) => &r.name,
            ResourceRecord::Stack(r) => &r.name,
        }
    }

    /// Serialize into the published form handed to protocol clients
    pub fn published(&self) -> Result<PublishedResource> {
        let text = serde_json::to_string(self)
            .with_context(|| format!("failed to encode {} record", self.kind()))?;

        Ok(PublishedResource {
            uri: resource_uri(self.kind(), self.id()),
            name: format!("{}: {}", self.kind().label(), self.name()),
            mime_type: RESOURCE_MIME_TYPE.to_string(),
            text,
        })
    }
}

/// A resource in the form handed to protocol clients
#[derive(Debug, Clone, Serialize)]
pub struct PublishedResource {
    pub uri: String,
    pub name: String,
    #[serde(rename = "mimeType")]
    pub mime_type: String,
    pub text: String,
}

/// Build the canonical URI for a resource
pub fn resource_uri(kind: ResourceKind, id: &str) -> String {
    format!("{}{}/{}", URI_SCHEME, kind.as_str(), id)
}

/// Parse a resource URI into its kind and id
pub fn parse_resource_uri(uri: &str) -> Result<(ResourceKind, String)> {
    let rest = uri
        .strip_prefix(URI_SCHEME)
        .with_context(|| format!("unsupported URI scheme in '{}'", uri))?;

    let (slug, id) = rest
        .split_once('/')
        .with_context(|| format!("malformed resource URI '{}'", uri))?;

    let kind = ResourceKind::from_slug(slug)
        .with_context(|| format!("unknown resource kind '{}'", slug))?;

    if id.is_empty() {
        anyhow::bail!("resource URI '{}' is missing an id", uri);
    }

    Ok((kind, id.to_string()))
}
