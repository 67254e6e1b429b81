//! morphdict-update: rebuild the compiled morphological dictionary.
//!
//! Downloads the OpenCorpora export, compiles it, removes the raw file and
//! stamps the result with a version.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
