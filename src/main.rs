// (C) Coralbits SL 2025
// This file is part of Pagepress and is licensed under the
// GNU Affero General Public License v3.0.
// A commercial license on request is also available;
// contact info@coralbits.com for details.

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;

use pagepress::{config::API_KEY_ENV, server, utils::setup_logging, Config, Pipeline};

/// Turns lists of web pages into a single PDF
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Address to listen on, overrides the configured host and port
    #[arg(short, long)]
    listen: Option<String>,

    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    setup_logging(args.debug || config.debug);

    if !config.backend.has_api_key() {
        bail!(
            "Browserless API key is not configured, set {} or backend.api_key",
            API_KEY_ENV
        );
    }
    info!("Using rendering backend at {}", config.backend.endpoint);

    let pipeline = Pipeline::from_config(&config)?;
    let listen = args.listen.unwrap_or_else(|| config.listen_addr());
    server::start(&listen, pipeline).await
}
