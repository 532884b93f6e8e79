//! Wire Protocol
//!
//! JSON-RPC 2.0 message types for the resource provider interface,
//! plus the method names and error codes it uses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::resource::aggregator::SourceReport;
use crate::resource::PublishedResource;

/// Protocol version accepted and emitted
pub const JSONRPC_VERSION: &str = "2.0";

/// Method listing every known resource
pub const METHOD_LIST_RESOURCES: &str = "resources/list";

/// Method reading a single resource by URI
pub const METHOD_READ_RESOURCE: &str = "resources/read";

/// JSON-RPC error codes used by this server
pub mod error_code {
    /// Request body is not valid JSON
    pub const PARSE_ERROR: i64 = -32700;
    /// Envelope is not a valid JSON-RPC 2.0 call
    pub const INVALID_REQUEST: i64 = -32600;
    /// Unknown method
    pub const METHOD_NOT_FOUND: i64 = -32601;
    /// Parameters missing or malformed
    pub const INVALID_PARAMS: i64 = -32602;
    /// Failure inside this server
    pub const INTERNAL_ERROR: i64 = -32603;
    /// Upstream OpenStack API failure
    pub const UPSTREAM_ERROR: i64 = -32000;
}

/// Incoming request envelope
#[derive(Debug, Clone, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// Outgoing response envelope
#[derive(Debug, Clone, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl RpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

/// Error object carried by failure responses
#[derive(Debug, Clone, Serialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Result payload of `resources/list`
#[derive(Debug, Serialize)]
pub struct ListResourcesResult {
    pub resources: Vec<PublishedResource>,
    pub diagnostics: Vec<SourceReport>,
}

/// Parameters of `resources/read`
#[derive(Debug, Deserialize)]
pub struct ReadResourceParams {
    pub uri: String,
}

/// Result payload of `resources/read`
#[derive(Debug, Serialize)]
pub struct ReadResourceResult {
    pub contents: Vec<PublishedResource>,
}
