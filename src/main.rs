#[tokio::main]
async fn main() -> anyhow::Result<()> {
    loop_mcp_stdio::main().await
}
