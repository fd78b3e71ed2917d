//! Expose Kong Admin API CRUD as MCP tools over streamable HTTP.
//!
//! Startup is strict: admin configuration, tool manifest, and registry
//! binding all happen before the listener opens, and any failure there
//! aborts the process. After that the server is stateless per invocation.

mod error;
mod manifest;
mod registry;
mod service;

use anyhow::Context as _;
use clap::Parser;
use kong_admin_tools::{AdminClient, AdminConfig};
use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ServerError;
use crate::manifest::ToolManifest;
use crate::registry::ToolRegistry;
use crate::service::ToolServer;

#[derive(Debug, Parser)]
#[command(
    name = "kong-mcp-server",
    version,
    about = "Expose Kong Admin API CRUD as MCP tools over streamable HTTP"
)]
struct Args {
    /// Address to bind the MCP endpoint on
    #[arg(long, env = "KONG_MCP_BIND", default_value = "127.0.0.1:8088")]
    bind: SocketAddr,

    /// Path to the tool manifest (JSON, or YAML by extension)
    #[arg(long, env = "KONG_MCP_TOOLS", default_value = "tools.json")]
    tools: PathBuf,

    /// Log level filter (e.g. info, debug, kong_mcp_server=debug)
    #[arg(long, env = "KONG_MCP_LOG", default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "KONG_MCP_LOG_JSON")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(&args)?;

    let admin_config = AdminConfig::from_env().context("load admin API configuration")?;
    tracing::info!(base_url = %admin_config.base_url, "admin API configured");
    let client = Arc::new(AdminClient::new(admin_config).context("build admin API client")?);

    let manifest = ToolManifest::from_path(&args.tools)
        .with_context(|| format!("load tool manifest {}", args.tools.display()))?;
    let registry =
        Arc::new(ToolRegistry::from_manifest(&manifest).context("bind tool registry")?);
    tracing::info!(
        tools = registry.len(),
        manifest = %args.tools.display(),
        "tool registry bound"
    );

    let server = ToolServer::new(registry, client);
    let mcp_service = StreamableHttpService::new(
        move || Ok(server.clone()),
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig {
            sse_keep_alive: Some(Duration::from_secs(15)),
            stateful_mode: true,
            ..Default::default()
        },
    );

    let router = axum::Router::new()
        .nest_service("/mcp", mcp_service)
        .route("/health", axum::routing::get(health));

    let listener = tokio::net::TcpListener::bind(args.bind)
        .await
        .map_err(|e| ServerError::Startup(format!("cannot bind {}: {e}", args.bind)))?;
    tracing::info!(addr = %args.bind, "MCP endpoint listening on /mcp");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serve MCP endpoint")?;

    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install ctrl-c handler");
        return;
    }
    tracing::info!("shutdown signal received");
}

fn init_tracing(args: &Args) -> Result<(), ServerError> {
    let filter = tracing_subscriber::EnvFilter::try_new(&args.log_level)
        .map_err(|e| ServerError::Config(format!("invalid log filter '{}': {e}", args.log_level)))?;

    if args.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    Ok(())
}
