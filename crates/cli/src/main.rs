//! sift command-line entry point.
//!
//! Results go to stdout; logs go to stderr as JSON so output can be piped.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sift_client::SearchOrchestrator;
use sift_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "sift", version, about = "Search the web across providers and extract page text")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search and print enriched results as JSON.
    Search {
        query: String,

        /// Number of results to return.
        #[arg(short = 'n', long = "num", default_value_t = 5)]
        num_results: usize,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Print the extracted main text of a page.
    Extract { url: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load().context("failed to load configuration")?;
    let orchestrator = SearchOrchestrator::from_config(&config).context("failed to build search engine")?;

    match cli.command {
        Command::Search { query, num_results, pretty } => {
            tracing::info!(query = %query, num_results, "search");
            let results = orchestrator.search(&query, num_results).await;
            let output =
                if pretty { serde_json::to_string_pretty(&results)? } else { serde_json::to_string(&results)? };
            println!("{output}");
        }
        Command::Extract { url } => {
            tracing::info!(url = %url, "extract");
            let text = orchestrator.extract_content(&url).await;
            println!("{text}");
        }
    }

    Ok(())
}
