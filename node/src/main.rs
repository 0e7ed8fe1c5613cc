//! `tsvm-node`: run the timestamp VM on a single node.
//!
//! Each non-empty line on stdin becomes a payload. Accepted blocks are
//! printed to stdout as JSON, one per line.

use std::io::BufRead;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tsvm_store::FjallDb;
use tsvm_vm::{service::GetBlockReply, Notifier, TimestampVm, NAME, VERSION};

mod config;
mod engine;

use crate::config::NodeConfig;
use crate::engine::LocalEngine;

#[derive(Debug, clap::Parser)]
#[command(name = "tsvm-node", about = "Single-node timestamp VM", disable_version_flag = true)]
struct Args {
    /// Configuration file, may be given more than once
    #[arg(long, value_name = "PATH")]
    config: Vec<String>,

    /// Print the VM version and exit
    #[arg(long)]
    version: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.version {
        println!("{NAME}@{VERSION}");
        return Ok(());
    }

    let config = NodeConfig::load(&args.config)?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    info!(version = VERSION, "{NAME} node");

    let path = Path::new(&config.database_path);
    if config.clear_on_start && path.exists() {
        warn!(path = %path.display(), "clearing chain database");
        std::fs::remove_dir_all(path)
            .with_context(|| format!("failed to clear {}", path.display()))?;
    }
    let db = FjallDb::open(path).context("failed to open chain database")?;

    let (notifier, from_vm) = Notifier::channel();
    let mut engine = LocalEngine::new(TimestampVm::new(db, notifier), from_vm);
    engine
        .start(config.genesis_data.as_bytes())
        .context("failed to initialize VM")?;

    for line in std::io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        let data = line.trim();
        if data.is_empty() {
            continue;
        }
        if let Err(err) = engine.submit(data.as_bytes()) {
            warn!(error = %err, "payload rejected");
            continue;
        }
        for block in engine.drain()? {
            println!("{}", serde_json::to_string(&GetBlockReply::from(&block))?);
        }
    }

    engine.shutdown()?;
    info!("Exiting");
    Ok(())
}
