use anyhow::Result;
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

use statgate_mcp::config::Config;
use statgate_mcp::server::StatGateMcp;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing (logs go to stderr to keep stdout clean for MCP)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env()?;
    tracing::info!(
        base_url = %config.base_url,
        chunk_size = config.limits.chunk_size,
        max_limit = config.limits.max_limit,
        max_tokens = config.budget.max_tokens,
        "starting statgate-mcp"
    );
    let service = StatGateMcp::new(config)?;
    let server = service.serve(stdio()).await?;
    server.waiting().await?;

    Ok(())
}
