use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    notifyd_cli::app::run().await
}
