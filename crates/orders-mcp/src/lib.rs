//! # orders-mcp
//!
//! MCP (Model Context Protocol) server exposing a small orders catalog as
//! schema-described tools for AI agents to consume.
//!
//! ## Architecture
//!
//! ```text
//! AI Agent (Claude, GPT, etc.)
//!       │
//!       │ MCP protocol (list tools / call tool)
//!       ▼
//! ┌──────────────────────┐
//! │  Orders MCP Server   │
//! │  1. Look up tool in  │  ← registry (closed ToolKind set)
//! │     the registry     │
//! │  2. Validate args,   │  ← query (whitelisted selectors)
//! │     apply defaults   │
//! │  3. Build one bound  │
//! │     SQL statement    │
//! │  4. Execute & shape  │  ← orders-store
//! │  5. Return content   │
//! │     blocks           │
//! └──────────┬───────────┘
//!            │
//!            ▼
//!      SQLite catalog
//! ```
//!
//! Two interchangeable transports sit above the dispatcher: a stdio
//! JSON-RPC loop ([`server::McpServer::run_stdio`]) and an HTTP adapter
//! ([`http_transport::HttpServer`]) which adds REST convenience routes and
//! OpenAPI documents generated from the registry. The chart tool is the one
//! operation that crosses a process boundary ([`chart::ChartDelegate`]).

pub mod chart;
pub mod dispatcher;
pub mod error;
pub mod http_transport;
pub mod openapi;
pub mod protocol;
pub mod query;
pub mod registry;
pub mod server;

// Re-export main types
pub use chart::{ChartDelegate, ChartKind};
pub use dispatcher::Dispatcher;
pub use error::McpError;
pub use http_transport::{create_router, HttpServer};
pub use protocol::{
    CallToolParams, JsonRpcRequest, JsonRpcResponse, ToolContent, ToolDefinition, ToolResponse,
};
pub use registry::{ToolKind, ToolRegistry};
pub use server::McpServer;
