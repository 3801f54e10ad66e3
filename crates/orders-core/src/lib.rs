// Configuration and domain types shared across all orders-mcp crates.

pub mod config;
pub mod status;

// Re-export commonly used types for convenience
pub use config::{AppConfig, ChartConfig, DatabaseConfig, ServerConfig, Transport};
pub use status::{InvalidStatus, OrderStatus};
