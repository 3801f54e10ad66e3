//! HTTP transport for the MCP server.
//!
//! A JSON-RPC endpoint carrying the same logical requests as stdio, plus
//! REST convenience routes per tool, machine-readable interface documents,
//! and static serving of persisted chart images. Handlers share only `Arc`
//! read-only state; each dispatch is independently connection-scoped.

use crate::error::McpError;
use crate::openapi;
use crate::protocol::{JsonRpcRequest, ToolContent};
use crate::server::McpServer;
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Create the HTTP router.
pub fn create_router(server: Arc<McpServer>, chart_dir: &str) -> Router {
    Router::new()
        .route("/mcp", post(handle_jsonrpc))
        .route("/", post(handle_jsonrpc).get(handle_root))
        .route("/api/tools/{name}", post(handle_rest_call))
        .route("/openapi.json", get(handle_openapi_json))
        .route("/openapi.yaml", get(handle_openapi_yaml))
        .route("/health", get(handle_health))
        .nest_service("/charts", ServeDir::new(chart_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(server)
}

/// JSON-RPC over HTTP (`POST /mcp` and the root path).
async fn handle_jsonrpc(
    State(server): State<Arc<McpServer>>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    match server.handle_request(request).await {
        Some(response) => Json(response).into_response(),
        // Notifications carry no response body
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// REST convenience path: the JSON body is the tool's argument mapping.
async fn handle_rest_call(
    State(server): State<Arc<McpServer>>,
    Path(name): Path<String>,
    body: Option<Json<Value>>,
) -> impl IntoResponse {
    if server.registry().get(&name).is_none() {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error": format!("unknown tool: {name}")})),
        );
    }

    let arguments = body.map(|Json(v)| v).unwrap_or_else(|| json!({}));
    let response = server.dispatcher().invoke(&name, &arguments).await;

    if response.is_error {
        let message = response
            .content
            .first()
            .map(ToolContent::as_text)
            .unwrap_or("tool call failed")
            .to_string();
        (
            StatusCode::OK,
            Json(json!({"success": false, "error": message})),
        )
    } else {
        (
            StatusCode::OK,
            Json(json!({"success": true, "result": response.content})),
        )
    }
}

async fn handle_openapi_json(State(server): State<Arc<McpServer>>) -> impl IntoResponse {
    Json(openapi::document(server.registry()))
}

async fn handle_openapi_yaml(State(server): State<Arc<McpServer>>) -> impl IntoResponse {
    match openapi::document_yaml(server.registry()) {
        Ok(yaml) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/yaml")],
            yaml,
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("failed to render OpenAPI document: {e}"),
        )
            .into_response(),
    }
}

async fn handle_health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "orders-mcp",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn handle_root(State(server): State<Arc<McpServer>>) -> impl IntoResponse {
    Json(json!({
        "status": "orders MCP server running",
        "tools": server.registry().len()
    }))
}

/// HTTP server for the MCP transport.
pub struct HttpServer {
    host: String,
    port: u16,
    chart_dir: String,
    server: Arc<McpServer>,
}

impl HttpServer {
    pub fn new(host: impl Into<String>, port: u16, chart_dir: impl Into<String>, server: Arc<McpServer>) -> Self {
        Self {
            host: host.into(),
            port,
            chart_dir: chart_dir.into(),
            server,
        }
    }

    /// Run the HTTP server until the process is stopped.
    pub async fn run(self) -> Result<(), McpError> {
        let app = create_router(self.server, &self.chart_dir);

        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| McpError::StartupFailed(format!("failed to bind {addr}: {e}")))?;

        tracing::info!(%addr, "MCP HTTP server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| McpError::Internal(e.into()))?;

        Ok(())
    }
}
