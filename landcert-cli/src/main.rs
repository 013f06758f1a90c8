//! landcert - certification conflict resolution
//!
//! Usage:
//!   landcert resolve --requests lands.json --code A2024
//!   landcert resolve-all --requests lands.json

use clap::{Parser, Subcommand};
use landcert_cli::error::CliError;
use landcert_cli::logging::{self, LogFormat};
use landcert_cli::{commands, config};
use landcert_core::RequestCode;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "landcert")]
#[command(about = "Find certification conflicts between land requests")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Resolver config file (TOML)
    #[arg(long, global = true, env = "LANDCERT_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log output format (logs go to stderr)
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,
}

#[derive(Subcommand)]
enum Command {
    /// Print the conflict record of one request, or null
    Resolve {
        /// JSON array of land requests
        #[arg(long, value_name = "FILE")]
        requests: PathBuf,

        /// Code of the request to check
        #[arg(long)]
        code: String,
    },
    /// Print the conflict records of every request
    ResolveAll {
        /// JSON array of land requests
        #[arg(long, value_name = "FILE")]
        requests: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    logging::init(cli.log_format)?;

    let resolver_config = config::load(cli.config.as_deref())?;
    tracing::debug!(config = ?resolver_config, "Loaded resolver config");

    let output = match cli.command {
        Command::Resolve { requests, code } => {
            let requests = commands::read_requests(&requests)?;
            commands::resolve(requests, RequestCode::new(code), resolver_config).await?
        }
        Command::ResolveAll { requests } => {
            let requests = commands::read_requests(&requests)?;
            commands::resolve_all(requests, resolver_config).await?
        }
    };

    println!("{}", output);
    Ok(())
}
