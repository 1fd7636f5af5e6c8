mod inspect;
mod scrape;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shelfscan")]
#[command(about = "Scrape search-result listings per location into gzip NDJSON")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape one search results page per location and save the listings
    Scrape {
        /// Location parameter (pincode); repeat for several. Falls back to
        /// SHELFSCAN_LOCATIONS when omitted.
        #[arg(long = "pincode", value_name = "PINCODE")]
        pincodes: Vec<String>,

        /// Output file (defaults to SHELFSCAN_OUTPUT_PATH)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a summary of a saved dataset
    Inspect {
        path: PathBuf,

        /// Number of records to print
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

/// Default filter for commands that run without loading the app config.
const DEFAULT_LOG_LEVEL: &str = "info";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Scrape { pincodes, output } => {
            let config = shelfscan_core::load_app_config()?;
            init_tracing(&config.log_level)?;
            scrape::run_scrape(&config, pincodes, output).await
        }
        Commands::Inspect { path, limit } => {
            init_tracing(DEFAULT_LOG_LEVEL)?;
            inspect::run_inspect(&path, limit)
        }
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn scrape_accepts_repeated_pincodes() {
        let cli = Cli::try_parse_from([
            "shelfscan",
            "scrape",
            "--pincode",
            "560001",
            "--pincode",
            "110001",
            "--output",
            "out.ndjson.gz",
        ])
        .unwrap();
        match cli.command {
            Commands::Scrape { pincodes, output } => {
                assert_eq!(pincodes, ["560001", "110001"]);
                assert_eq!(output, Some(PathBuf::from("out.ndjson.gz")));
            }
            Commands::Inspect { .. } => panic!("expected scrape"),
        }
    }

    #[test]
    fn inspect_defaults_limit() {
        let cli = Cli::try_parse_from(["shelfscan", "inspect", "data.ndjson.gz"]).unwrap();
        match cli.command {
            Commands::Inspect { path, limit } => {
                assert_eq!(path, PathBuf::from("data.ndjson.gz"));
                assert_eq!(limit, 5);
            }
            Commands::Scrape { .. } => panic!("expected inspect"),
        }
    }
}
