//! blockmerge - consolidate and resolve DNS blocklists

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    blockmerge_cli::run().await
}
