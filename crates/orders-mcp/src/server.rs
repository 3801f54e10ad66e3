//! MCP server implementation.
//!
//! Handles tool discovery and execution over JSON-RPC. The stdio transport
//! lives here; the HTTP transport reuses `handle_request` through
//! `http_transport`.

use crate::dispatcher::Dispatcher;
use crate::error::McpError;
use crate::protocol::{CallToolParams, JsonRpcRequest, JsonRpcResponse};
use crate::registry::ToolRegistry;
use serde_json::{json, Value};
use std::io::{BufRead, Write};
use std::sync::Arc;

/// The MCP server: the read-only registry plus the dispatcher.
pub struct McpServer {
    registry: Arc<ToolRegistry>,
    dispatcher: Dispatcher,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            registry: Arc::new(ToolRegistry::new()),
            dispatcher,
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Run the server over stdio: one line-delimited JSON-RPC message per
    /// line. A malformed or failing request never terminates the loop.
    pub async fn run_stdio(&self) -> Result<(), McpError> {
        tracing::info!(tools = self.registry.len(), "starting MCP server on stdio");

        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        let mut stdout_lock = stdout.lock();

        for line in stdin.lock().lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }

            let response = match serde_json::from_str::<JsonRpcRequest>(&line) {
                Ok(request) => self.handle_request(request).await,
                Err(e) => Some(JsonRpcResponse::error(
                    None,
                    -32700,
                    format!("Parse error: {e}"),
                )),
            };

            if let Some(response) = response {
                let response_json = serde_json::to_string(&response)?;
                writeln!(stdout_lock, "{}", response_json)?;
                stdout_lock.flush()?;
            }
        }

        Ok(())
    }

    /// Handle a JSON-RPC request. Returns `None` for notifications, which
    /// get no response frame.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        let is_notification = request.is_notification();
        let id = request.id.clone();

        let response = match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" => {
                JsonRpcResponse::success(id, json!({}))
            }
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "shutdown" => {
                tracing::info!("MCP server shutdown requested");
                JsonRpcResponse::success(id, Value::Null)
            }
            other => {
                JsonRpcResponse::error(id, -32601, format!("Method not found: {other}"))
            }
        };

        if is_notification {
            None
        } else {
            Some(response)
        }
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": {
                "name": "orders-mcp",
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {}
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        JsonRpcResponse::success(id, json!({ "tools": self.registry.list() }))
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(id, -32602, format!("Invalid params: {e}"))
                }
            },
            None => return JsonRpcResponse::error(id, -32602, "Missing params"),
        };

        // Unknown tools are reported as content, not as a protocol fault
        let response = self.dispatcher.invoke(&params.name, &params.arguments).await;
        JsonRpcResponse::success(
            id,
            json!({
                "content": response.content,
                "isError": response.is_error,
            }),
        )
    }
}
