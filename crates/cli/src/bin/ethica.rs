use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    ethica_cli::main_entry().await
}
