use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    gfv_server::run().await
}
