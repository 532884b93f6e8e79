//! End-to-end tests for the JSON-RPC surface
//!
//! These tests run the real router against a mocked OpenStack cloud and
//! exercise the protocol as a client would: raw HTTP POSTs with JSON-RPC
//! envelopes, plus the health and fallback routes.

use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use osmcp::config::OpenStackConfig;
use osmcp::openstack::session::Session;
use osmcp::server::router;

const TEST_TOKEN: &str = "test-token";

fn test_config(server: &MockServer) -> OpenStackConfig {
    OpenStackConfig {
        auth_url: format!("{}/v3", server.uri()),
        username: "svc".to_string(),
        password: "secret".to_string(),
        project_name: "demo".to_string(),
        region: "RegionOne".to_string(),
        user_domain_name: "Default".to_string(),
        project_domain_name: "Default".to_string(),
    }
}

async fn mock_keystone(server: &MockServer) {
    let catalog = json!([
        {
            "type": "compute",
            "name": "nova",
            "endpoints": [
                {"interface": "public", "region": "RegionOne", "url": format!("{}/compute/v2.1", server.uri())}
            ]
        },
        {
            "type": "network",
            "name": "neutron",
            "endpoints": [
                {"interface": "public", "region": "RegionOne", "url": format!("{}/network", server.uri())}
            ]
        },
        {
            "type": "orchestration",
            "name": "heat",
            "endpoints": [
                {"interface": "public", "region": "RegionOne", "url": format!("{}/orchestration/v1", server.uri())}
            ]
        }
    ]);

    Mock::given(method("POST"))
        .and(path("/v3/auth/tokens"))
        .respond_with(
            ResponseTemplate::new(201)
                .insert_header("X-Subject-Token", TEST_TOKEN)
                .set_body_json(json!({
                    "token": {"expires_at": "2099-01-01T00:00:00Z", "catalog": catalog}
                })),
        )
        .mount(server)
        .await;
}

async fn mock_collection(server: &MockServer, endpoint: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(header("X-Auth-Token", TEST_TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mock_all_collections(server: &MockServer) {
    mock_collection(
        server,
        "/compute/v2.1/servers/detail",
        json!({"servers": [{
            "id": "i1",
            "name": "web1",
            "status": "ACTIVE",
            "flavor": {"id": "m1.small"},
            "image": {"id": "cirros"},
            "created": "2024-01-01T00:00:00Z",
            "updated": "2024-01-02T00:00:00Z"
        }]}),
    )
    .await;
    mock_collection(
        server,
        "/network/v2.0/networks",
        json!({"networks": [{
            "id": "n1",
            "name": "private",
            "status": "ACTIVE",
            "admin_state_up": true,
            "shared": false,
            "tenant_id": "proj42"
        }]}),
    )
    .await;
    mock_collection(
        server,
        "/orchestration/v1/stacks",
        json!({"stacks": [{
            "id": "s1",
            "stack_name": "app",
            "stack_status": "CREATE_COMPLETE",
            "description": "demo stack",
            "creation_time": "2024-01-01T00:00:00Z",
            "updated_time": null
        }]}),
    )
    .await;
}

/// Bind the real router on an ephemeral port and return its base URL
async fn start_app(server: &MockServer) -> String {
    let session = Session::connect(&test_config(server)).await.unwrap();
    let app = router(Arc::new(session));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app.into_make_service()).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn rpc_call(base: &str, body: Value) -> Value {
    reqwest::Client::new()
        .post(base)
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn list_returns_resources_and_diagnostics() {
    let server = MockServer::start().await;
    mock_keystone(&server).await;
    mock_all_collections(&server).await;
    let base = start_app(&server).await;

    let response = rpc_call(
        &base,
        json!({"jsonrpc": "2.0", "id": 1, "method": "resources/list"}),
    )
    .await;

    assert_eq!(response["jsonrpc"], "2.0");
    assert_eq!(response["id"], 1);
    assert!(response.get("error").is_none());

    let resources = response["result"]["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 3);
    assert_eq!(resources[0]["uri"], "openstack://instances/i1");
    assert_eq!(resources[0]["name"], "Instance: web1");
    assert_eq!(resources[0]["mimeType"], "application/json");

    // Every published body is itself valid JSON
    for resource in resources {
        let text = resource["text"].as_str().unwrap();
        serde_json::from_str::<Value>(text).unwrap();
    }

    let diagnostics = response["result"]["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics.len(), 3);
    assert_eq!(diagnostics[0], json!({"source": "instances", "count": 1}));
}

#[tokio::test]
async fn list_reports_failing_sources() {
    let server = MockServer::start().await;
    mock_keystone(&server).await;

    Mock::given(method("GET"))
        .and(path("/compute/v2.1/servers/detail"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mock_collection(
        &server,
        "/network/v2.0/networks",
        json!({"networks": [{"id": "n1", "name": "private", "status": "ACTIVE"}]}),
    )
    .await;
    mock_collection(&server, "/orchestration/v1/stacks", json!({"stacks": []})).await;

    let base = start_app(&server).await;
    let response = rpc_call(
        &base,
        json!({"jsonrpc": "2.0", "id": 2, "method": "resources/list"}),
    )
    .await;

    let resources = response["result"]["resources"].as_array().unwrap();
    assert_eq!(resources.len(), 1);
    assert_eq!(resources[0]["uri"], "openstack://networks/n1");

    let diagnostics = response["result"]["diagnostics"].as_array().unwrap();
    assert_eq!(diagnostics[0]["source"], "instances");
    assert!(diagnostics[0]["error"].as_str().unwrap().contains("500"));
    assert_eq!(diagnostics[2], json!({"source": "stacks", "count": 0}));
}

#[tokio::test]
async fn read_returns_one_resource() {
    let server = MockServer::start().await;
    mock_keystone(&server).await;
    mock_collection(
        &server,
        "/compute/v2.1/servers/i1",
        json!({"server": {
            "id": "i1",
            "name": "web1",
            "status": "ACTIVE",
            "flavor": {"id": "m1.small"},
            "image": {"id": "cirros"},
            "created": "2024-01-01T00:00:00Z",
            "updated": "2024-01-02T00:00:00Z",
            "addresses": {"private": [{"addr": "10.0.0.3", "version": 4}]}
        }}),
    )
    .await;

    let base = start_app(&server).await;
    let response = rpc_call(
        &base,
        json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "resources/read",
            "params": {"uri": "openstack://instances/i1"}
        }),
    )
    .await;

    assert_eq!(response["id"], 3);
    let contents = response["result"]["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0]["uri"], "openstack://instances/i1");
    assert_eq!(contents[0]["mimeType"], "application/json");

    let body: Value = serde_json::from_str(contents[0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(body["addresses"]["private"][0]["addr"], "10.0.0.3");
}

#[tokio::test]
async fn read_missing_resource_maps_to_upstream_error() {
    let server = MockServer::start().await;
    mock_keystone(&server).await;

    Mock::given(method("GET"))
        .and(path("/compute/v2.1/servers/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let base = start_app(&server).await;
    let response = rpc_call(
        &base,
        json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "resources/read",
            "params": {"uri": "openstack://instances/ghost"}
        }),
    )
    .await;

    assert_eq!(response["error"]["code"], -32000);
    assert!(response["error"]["message"].as_str().unwrap().contains("404"));
}

#[tokio::test]
async fn read_rejects_unknown_kind() {
    let server = MockServer::start().await;
    mock_keystone(&server).await;
    let base = start_app(&server).await;

    let response = rpc_call(
        &base,
        json!({
            "jsonrpc": "2.0",
            "id": 5,
            "method": "resources/read",
            "params": {"uri": "openstack://volumes/v1"}
        }),
    )
    .await;

    assert_eq!(response["error"]["code"], -32602);
    assert!(response["error"]["message"].as_str().unwrap().contains("volumes"));
}

#[tokio::test]
async fn read_requires_uri_param() {
    let server = MockServer::start().await;
    mock_keystone(&server).await;
    let base = start_app(&server).await;

    let response = rpc_call(
        &base,
        json!({"jsonrpc": "2.0", "id": 6, "method": "resources/read"}),
    )
    .await;

    assert_eq!(response["id"], 6);
    assert_eq!(response["error"]["code"], -32602);
}

#[tokio::test]
async fn unknown_method_is_reported() {
    let server = MockServer::start().await;
    mock_keystone(&server).await;
    let base = start_app(&server).await;

    let response = rpc_call(
        &base,
        json!({"jsonrpc": "2.0", "id": 7, "method": "resources/subscribe"}),
    )
    .await;

    assert_eq!(response["id"], 7);
    assert_eq!(response["error"]["code"], -32601);
    assert!(
        response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("resources/subscribe")
    );
}

#[tokio::test]
async fn invalid_json_is_a_parse_error() {
    let server = MockServer::start().await;
    mock_keystone(&server).await;
    let base = start_app(&server).await;

    let response: Value = reqwest::Client::new()
        .post(&base)
        .body("{not json")
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(response["id"], Value::Null);
    assert_eq!(response["error"]["code"], -32700);
}

#[tokio::test]
async fn wrong_protocol_version_is_rejected() {
    let server = MockServer::start().await;
    mock_keystone(&server).await;
    let base = start_app(&server).await;

    let response = rpc_call(
        &base,
        json!({"jsonrpc": "1.0", "id": 8, "method": "resources/list"}),
    )
    .await;

    assert_eq!(response["error"]["code"], -32600);
}

#[tokio::test]
async fn healthz_responds_ok() {
    let server = MockServer::start().await;
    mock_keystone(&server).await;
    let base = start_app(&server).await;

    let response = reqwest::get(format!("{}/healthz", base)).await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let server = MockServer::start().await;
    mock_keystone(&server).await;
    let base = start_app(&server).await;

    let response = reqwest::get(format!("{}/resources", base)).await.unwrap();
    assert_eq!(response.status(), 404);
}
