//! OpenStack MCP server
//!
//! Publishes the compute instances, networks, and orchestration stacks
//! of an OpenStack project as URI-addressed JSON resources over the
//! Model Context Protocol's JSON-RPC surface, so LLM tooling can browse
//! a deployment without holding cloud credentials of its own.
//!
//! The crate is organized in layers:
//!
//! - [`config`] - Connection settings and their validation
//! - [`openstack`] - Keystone auth, service catalog, and REST plumbing
//! - [`resource`] - Record mapping, URIs, fetching, and aggregation
//! - [`server`] - The JSON-RPC interface served over HTTP

pub mod config;
pub mod openstack;
pub mod resource;
pub mod server;
