//! Configuration for the orders MCP server.
//!
//! All configuration is an explicit struct passed into constructors at
//! startup. Nothing reads configuration ad hoc from globals or the
//! environment after boot.
//!
//! Loaded from a TOML file by the CLI; every field has a serde default so a
//! missing file or partial file still yields a working local setup.

use serde::{Deserialize, Serialize};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Database location.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Transport / HTTP settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// External chart renderer settings.
    #[serde(default)]
    pub chart: ChartConfig,
}

/// Database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Transport type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Line-delimited JSON-RPC over stdin/stdout (for desktop agents).
    #[default]
    Stdio,
    /// HTTP transport (JSON-RPC endpoint plus REST convenience routes).
    Http,
}

/// Server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Transport to run: "stdio" or "http".
    #[serde(default)]
    pub transport: Transport,

    /// HTTP bind host (only used when transport is HTTP).
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP port (only used when transport is HTTP).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Externally visible base URL, used to build chart links.
    #[serde(default = "default_public_url")]
    pub public_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: Transport::default(),
            host: default_host(),
            port: default_port(),
            public_url: default_public_url(),
        }
    }
}

impl ServerConfig {
    pub fn is_http(&self) -> bool {
        self.transport == Transport::Http
    }

    pub fn is_stdio(&self) -> bool {
        self.transport == Transport::Stdio
    }
}

/// Chart renderer settings.
///
/// The renderer is an external process: it receives a JSON chart request on
/// stdin and writes a base64-encoded PNG to stdout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Renderer command and arguments, e.g. `["mcp-echarts", "--render"]`.
    /// Empty means chart generation is unconfigured.
    #[serde(default)]
    pub renderer: Vec<String>,

    /// Hard timeout for a single render.
    #[serde(default = "default_chart_timeout")]
    pub timeout_secs: u64,

    /// Directory where rendered images are persisted and served from.
    #[serde(default = "default_chart_dir")]
    pub output_dir: String,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            renderer: Vec::new(),
            timeout_secs: default_chart_timeout(),
            output_dir: default_chart_dir(),
        }
    }
}

fn default_db_path() -> String {
    "orders.db".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_public_url() -> String {
    format!("http://{}:{}", default_host(), default_port())
}

fn default_chart_timeout() -> u64 {
    30
}

fn default_chart_dir() -> String {
    "charts".to_string()
}
