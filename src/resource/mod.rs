//! Resource abstraction layer
//!
//! This module turns raw OpenStack API responses into the uniform
//! resources the server publishes: each resource gets a stable
//! `openstack://{kind}/{id}` URI and a JSON record body.
//!
//! # Architecture
//!
//! - `model` (re-exported here) - Resource kinds, record shapes, and the URI scheme
//! - [`fetcher`] - Fetches collections from the APIs with pagination support
//! - [`aggregator`] - Combines all collections, isolating per-source failures

pub mod aggregator;
pub mod fetcher;
mod model;

pub use model::*;
