mod catalog;
mod cli;
mod client;
mod config;
mod dispatch;
mod error;
mod output;
mod series;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting OpenDigger metrics report");
    let status = cli.execute().await?;

    Ok(status.exit_code())
}
