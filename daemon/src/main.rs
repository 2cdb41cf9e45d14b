//! DPoS maintenance daemon: command-line entry point for a maintenance node.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use dpos_node::{init_logging, MaintenanceNode, NodeConfig};
use dpos_types::{BlockHash, BlockHeader, Timestamp};

#[derive(Parser)]
#[command(name = "dpos-daemon", about = "DPoS epoch-maintenance node")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings
    /// are used as the base; CLI flags and env vars override them.
    #[arg(long, global = true, env = "DPOS_CONFIG")]
    config: Option<PathBuf>,

    /// Data directory for the LMDB store.
    #[arg(long, global = true, env = "DPOS_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "DPOS_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "DPOS_LOG_FORMAT")]
    log_format: Option<String>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Create the store and write genesis state if it is empty.
    Init,
    /// Apply one block and print the outcome as JSON.
    Apply {
        /// Block height.
        #[arg(long)]
        number: u64,
        /// Block timestamp in milliseconds since the Unix epoch.
        #[arg(long)]
        timestamp: u64,
        /// Block hash, 64 hex characters.
        #[arg(long)]
        hash: Option<String>,
    },
    /// Print the persisted maintenance state as JSON.
    Status,
    /// Print the effective configuration as TOML.
    Config,
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let mut config = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(&path.to_string_lossy())
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => NodeConfig::default(),
    };
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    config.validate()?;
    Ok(config)
}

fn parse_hash(raw: &str) -> anyhow::Result<BlockHash> {
    let bytes = hex::decode(raw).context("block hash is not valid hex")?;
    Ok(BlockHash::from_slice(&bytes)?)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format()?, &config.log_level)?;

    match cli.command {
        Command::Init => {
            let node = MaintenanceNode::open(config)?;
            tracing::info!(
                data_dir = %node.config().data_dir.display(),
                "store ready"
            );
        }
        Command::Apply {
            number,
            timestamp,
            hash,
        } => {
            let hash = match hash.as_deref() {
                Some(raw) => parse_hash(raw)?,
                None => BlockHash::ZERO,
            };
            let mut node = MaintenanceNode::open(config)?;
            let outcome = node
                .apply_block(&BlockHeader::new(number, Timestamp::new(timestamp), hash))
                .with_context(|| format!("applying block {number}"))?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Command::Status => {
            let node = MaintenanceNode::open(config)?;
            println!("{}", serde_json::to_string_pretty(&node.status()?)?);
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
