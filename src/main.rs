mod app;
mod classify;
mod cli;
mod config;
mod db;
mod domain;
mod history;
mod infrastructure;
mod page;
mod session;
#[cfg(test)]
mod testing;

use anyhow::Result;
use clap::Parser;
use infrastructure::{directories, logging};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = cli::Cli::parse();

    let config = config::load_config()?;
    let paths = directories::ensure_directories(&config.directories)?;
    logging::init_tracing(&config, &paths)?;

    let app = app::SieveApp::initialize(config, paths, cli.format).await?;
    app.run(cli.command).await
}
