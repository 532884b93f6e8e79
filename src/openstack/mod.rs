//! OpenStack API interaction module
//!
//! This module provides the core functionality for talking to an OpenStack
//! cloud: Keystone authentication, service catalog resolution, and an HTTP
//! client for the per-service REST APIs.
//!
//! # Module Structure
//!
//! - [`auth`] - Keystone Identity v3 password authentication
//! - [`catalog`] - Service catalog and endpoint resolution
//! - [`http`] - HTTP utilities for REST API calls
//! - [`session`] - Authenticated session with token caching
//!
//! # Example
//!
//! ```ignore
//! use crate::openstack::catalog::Service;
//! use crate::openstack::session::Session;
//!
//! async fn example(config: &crate::config::OpenStackConfig) -> anyhow::Result<()> {
//!     let session = Session::connect(config).await?;
//!     let compute = session.service_client(Service::Compute).await?;
//!     let servers = compute.get("servers/detail").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod catalog;
pub mod http;
pub mod session;
