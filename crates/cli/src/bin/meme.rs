use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    meme_cli::main_entry().await
}
