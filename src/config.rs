//! Command-line configuration

use std::path::PathBuf;

use clap::{Args, Parser};
use rusty_money::iso::{self, Currency};

use crate::cli::Command;

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn")]
    pub(crate) log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    pub(crate) log_format: LogFormat,
}

/// Tiffin command line
#[derive(Debug, Parser)]
#[command(name = "tiffin", about = "Tiffin cart and order lifecycle CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) config: Config,

    #[command(subcommand)]
    pub(crate) command: Command,
}

impl Cli {
    /// Load configuration from `.env`, the environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub(crate) fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// Tiffin configuration
#[derive(Debug, Args)]
pub(crate) struct Config {
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    /// Directory holding the persisted cart
    #[arg(long, env = "TIFFIN_CART_DIR", default_value = ".tiffin")]
    pub(crate) cart_dir: PathBuf,

    /// ISO 4217 currency code carts are priced in
    #[arg(long, env = "TIFFIN_CURRENCY", default_value = "USD")]
    pub(crate) currency: String,

    /// Base path for fixture files
    #[arg(long, env = "TIFFIN_FIXTURES", default_value = "./fixtures")]
    pub(crate) fixtures: PathBuf,

    /// Menu fixture to load from `<fixtures>/menus/`
    #[arg(long, env = "TIFFIN_MENU", default_value = "house")]
    pub(crate) menu: String,
}

impl Config {
    /// The configured currency
    ///
    /// # Errors
    ///
    /// Returns an error if the code is not an ISO 4217 currency.
    pub(crate) fn currency(&self) -> Result<&'static Currency, String> {
        iso::find(&self.currency).ok_or_else(|| format!("unknown currency code: {}", self.currency))
    }
}
