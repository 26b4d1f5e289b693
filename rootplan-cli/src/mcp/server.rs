use anyhow::{Context, Result};
use rmcp::{transport::stdio, ServiceExt};
use tracing::info;

use super::tools::RootPlanService;
use crate::config::Settings;

/// Run the MCP server using stdio transport
pub async fn run_mcp_server(settings: Settings) -> Result<()> {
    info!("Starting rootplan MCP server");

    let service = RootPlanService::new(settings);
    let server = service
        .serve(stdio())
        .await
        .context("Failed to start MCP server")?;

    info!("MCP server ready, listening on stdio");
    let reason = server.waiting().await?;
    info!("MCP server stopped: {:?}", reason);

    Ok(())
}
