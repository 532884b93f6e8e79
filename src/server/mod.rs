//! Provider-Facing Server
//!
//! Serves the resource provider protocol over HTTP: JSON-RPC calls on
//! `POST /`, a health probe on `GET /healthz`, and 404 for anything else.

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{any, get, post};
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::openstack::session::Session;

pub mod protocol;
mod rpc;

/// Build the router over a shared session
pub fn router(session: Arc<Session>) -> Router {
    Router::new()
        .route("/", post(rpc_handler))
        .route("/healthz", get(healthz))
        .fallback(any(not_found))
        .with_state(session)
}

async fn rpc_handler(
    State(session): State<Arc<Session>>,
    body: String,
) -> Json<protocol::RpcResponse> {
    Json(rpc::handle(&session, &body).await)
}

async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

/// Bind the listen address and serve until interrupted
pub async fn serve(addr: SocketAddr, session: Arc<Session>) -> Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind on '{}'", addr))?;

    tracing::info!(%addr, "listening for provider requests");

    axum::serve(listener, router(session).into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server stopped unexpectedly")?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => {
            tracing::error!("failed to install interrupt handler: {}", err);
            std::future::pending::<()>().await;
        }
    }
}
