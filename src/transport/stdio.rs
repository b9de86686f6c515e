use crate::tools::GitDigestTools;
use anyhow::Result;
use rmcp::ServiceExt;
use rmcp::transport::stdio;

pub async fn run_stdio_server(tools: GitDigestTools) -> Result<()> {
    let server = tools.serve(stdio()).await?;

    server.waiting().await?;
    Ok(())
}
