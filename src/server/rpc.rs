//! Request Dispatch
//!
//! Parses incoming JSON-RPC calls, dispatches them to the resource
//! handlers, and maps failures onto protocol error codes.

use serde_json::Value;

use super::protocol::{
    error_code, ListResourcesResult, ReadResourceParams, ReadResourceResult, RpcRequest,
    RpcResponse, JSONRPC_VERSION, METHOD_LIST_RESOURCES, METHOD_READ_RESOURCE,
};
use crate::openstack::session::Session;
use crate::resource::aggregator;
use crate::resource::{fetcher, parse_resource_uri};

/// Handle one raw request body and produce the response envelope
pub async fn handle(session: &Session, raw: &str) -> RpcResponse {
    let request: RpcRequest = match serde_json::from_str(raw) {
        Ok(request) => request,
        Err(err) => {
            return RpcResponse::failure(
                Value::Null,
                error_code::PARSE_ERROR,
                format!("invalid JSON: {}", err),
            );
        }
    };

    if request.jsonrpc != JSONRPC_VERSION {
        return RpcResponse::failure(
            request.id,
            error_code::INVALID_REQUEST,
            format!("unsupported protocol version '{}'", request.jsonrpc),
        );
    }

    tracing::debug!(method = %request.method, "dispatching request");

    match request.method.as_str() {
        METHOD_LIST_RESOURCES => list_resources(session, request.id).await,
        METHOD_READ_RESOURCE => read_resource(session, request.id, request.params).await,
        other => RpcResponse::failure(
            request.id,
            error_code::METHOD_NOT_FOUND,
            format!("unknown method '{}'", other),
        ),
    }
}

async fn list_resources(session: &Session, id: Value) -> RpcResponse {
    let aggregate = aggregator::collect_all(session).await;

    let mut resources = Vec::with_capacity(aggregate.resources.len());
    for record in &aggregate.resources {
        match record.published() {
            Ok(published) => resources.push(published),
            Err(err) => {
                return RpcResponse::failure(id, error_code::INTERNAL_ERROR, format!("{:#}", err));
            }
        }
    }

    into_success(
        id,
        ListResourcesResult {
            resources,
            diagnostics: aggregate.reports,
        },
    )
}

async fn read_resource(session: &Session, id: Value, params: Value) -> RpcResponse {
    let params: ReadResourceParams = match serde_json::from_value(params) {
        Ok(params) => params,
        Err(err) => {
            return RpcResponse::failure(
                id,
                error_code::INVALID_PARAMS,
                format!("invalid params: {}", err),
            );
        }
    };

    let (kind, resource_id) = match parse_resource_uri(&params.uri) {
        Ok(parsed) => parsed,
        Err(err) => {
            return RpcResponse::failure(id, error_code::INVALID_PARAMS, format!("{:#}", err));
        }
    };

    let record = match fetcher::get_resource(session, kind, &resource_id).await {
        Ok(record) => record,
        Err(err) => {
            tracing::warn!(uri = %params.uri, "failed to read resource: {:#}", err);
            return RpcResponse::failure(id, error_code::UPSTREAM_ERROR, format!("{:#}", err));
        }
    };

    match record.published() {
        Ok(published) => into_success(
            id,
            ReadResourceResult {
                contents: vec![published],
            },
        ),
        Err(err) => RpcResponse::failure(id, error_code::INTERNAL_ERROR, format!("{:#}", err)),
    }
}

fn into_success<T: serde::Serialize>(id: Value, result: T) -> RpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => RpcResponse::success(id, value),
        Err(err) => RpcResponse::failure(
            id,
            error_code::INTERNAL_ERROR,
            format!("failed to encode response: {}", err),
        ),
    }
}
