//! CLI entry point for the orders MCP server.
//!
//! `serve` runs the MCP server on stdio or HTTP, `seed` bootstraps and
//! populates the database, `tools` prints the registry.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use orders_core::{AppConfig, Transport};
use orders_mcp::{ChartDelegate, Dispatcher, HttpServer, McpServer, ToolRegistry};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "orders-mcp", version, about = "Orders MCP server")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server.
    Serve(ServeArgs),

    /// Create the database schema and insert seed data.
    Seed(SeedArgs),

    /// List the tools this server exposes.
    Tools,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Configuration file path.
    #[arg(short, long, default_value = "orders.toml")]
    config: PathBuf,

    /// Override the transport: "stdio" or "http".
    #[arg(short, long)]
    transport: Option<String>,

    /// Override the database path.
    #[arg(long)]
    db: Option<String>,

    /// Override the HTTP port.
    #[arg(short, long)]
    port: Option<u16>,
}

#[derive(Args, Debug)]
struct SeedArgs {
    /// Configuration file path.
    #[arg(short, long, default_value = "orders.toml")]
    config: PathBuf,

    /// Override the database path.
    #[arg(long)]
    db: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // stdout carries the protocol in stdio mode, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => serve(args).await,
        Command::Seed(args) => seed(args).await,
        Command::Tools => {
            tools();
            Ok(())
        }
    }
}

/// Load the configuration file, falling back to defaults when it is absent.
fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "config file not found, using defaults");
        return Ok(AppConfig::default());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    toml::from_str(&raw)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

async fn serve(args: ServeArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(db) = args.db {
        config.database.path = db;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(transport) = args.transport {
        config.server.transport = match transport.as_str() {
            "stdio" => Transport::Stdio,
            "http" => Transport::Http,
            other => anyhow::bail!("unknown transport {other:?} (expected stdio or http)"),
        };
    }

    let pool = orders_store::connect(&config.database).await?;
    orders_store::create_tables(&pool).await?;

    let chart = ChartDelegate::new(config.chart.clone(), config.server.public_url.clone());
    let server = Arc::new(McpServer::new(Dispatcher::new(pool, chart)));

    match config.server.transport {
        Transport::Stdio => server.run_stdio().await?,
        Transport::Http => {
            HttpServer::new(
                config.server.host.clone(),
                config.server.port,
                config.chart.output_dir.clone(),
                server,
            )
            .run()
            .await?
        }
    }
    Ok(())
}

async fn seed(args: SeedArgs) -> Result<()> {
    let mut config = load_config(&args.config)?;
    if let Some(db) = args.db {
        config.database.path = db;
    }

    let pool = orders_store::connect(&config.database).await?;
    orders_store::create_tables(&pool).await?;
    let summary = orders_store::seed(&pool).await?;

    println!(
        "seeded {}: {} regions, {} customers, {} products, {} orders",
        config.database.path, summary.regions, summary.customers, summary.products, summary.orders
    );
    Ok(())
}

fn tools() {
    let registry = ToolRegistry::new();
    for tool in registry.list() {
        println!("{:<24} {}", tool.name, tool.title);
    }
}
