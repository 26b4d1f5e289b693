use anyhow::Result;

use crate::config::Settings;

pub async fn run(settings: Settings) -> Result<()> {
    crate::mcp::run_mcp_server(settings).await
}
