use anyhow::Result;
use clap::Parser;
use sentinel::runner::{run_cli, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    run_cli(Cli::parse()).await?;
    Ok(())
}
