//! Node configuration.
//!
//! Sources, later ones winning: built-in defaults, each `--config` file in
//! order, then `TSVM_*` environment variables (`TSVM_DATABASE_PATH`, ...).

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use tsvm_store::fjall_db::DEFAULT_DATABASE_PATH as DEFAULT_DATABASE_DIR;

pub const DEFAULT_DATABASE_PATH: (&str, &str) = ("database_path", DEFAULT_DATABASE_DIR);
pub const DEFAULT_GENESIS_DATA: (&str, &str) = ("genesis_data", "");
pub const DEFAULT_LOG_FILTER: (&str, &str) = ("log_filter", "info,fjall=warn");
pub const DEFAULT_CLEAR_ON_START: (&str, bool) = ("clear_on_start", false);

const ENV_PREFIX: &str = "TSVM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Directory of the on-disk chain database.
    pub database_path: String,
    /// Genesis payload, used only on the first run over a database.
    pub genesis_data: String,
    /// `tracing` filter directives, overridden by `RUST_LOG` when set.
    pub log_filter: String,
    /// Wipe the database directory before opening it.
    pub clear_on_start: bool,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.1.to_string(),
            genesis_data: DEFAULT_GENESIS_DATA.1.to_string(),
            log_filter: DEFAULT_LOG_FILTER.1.to_string(),
            clear_on_start: DEFAULT_CLEAR_ON_START.1,
        }
    }
}

impl NodeConfig {
    /// Load from the given files and the process environment.
    pub fn load(files: &[String]) -> Result<Self> {
        Self::load_with(files, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_with(files: &[String], env: Environment) -> Result<Self> {
        let mut builder = Config::builder();
        for file in files {
            builder = builder.add_source(File::with_name(file));
        }
        let config = builder
            .add_source(env)
            .build()
            .context("failed to read configuration")?;
        Self::from_config(&config)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let get_string = |key: (&str, &str)| {
            config.get_string(key.0).unwrap_or_else(|_| key.1.to_string())
        };
        let clear_on_start = match config.get_bool(DEFAULT_CLEAR_ON_START.0) {
            Ok(value) => value,
            Err(config::ConfigError::NotFound(_)) => DEFAULT_CLEAR_ON_START.1,
            Err(err) => {
                return Err(err).context(format!("invalid '{}'", DEFAULT_CLEAR_ON_START.0))
            }
        };

        Ok(Self {
            database_path: get_string(DEFAULT_DATABASE_PATH),
            genesis_data: get_string(DEFAULT_GENESIS_DATA),
            log_filter: get_string(DEFAULT_LOG_FILTER),
            clear_on_start,
        })
    }
}
