//! elemdoc CLI: embeds reference documentation into HTML element sources.
//!
//! Walks a tree of `<tag> Name.swift` files, fetches each element's
//! documentation page, and writes its text into the file as comments.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
