use clap::{Parser, Subcommand};
use quill_client::{Client, ClientConfig};

use super::error::CliError;

#[derive(Parser)]
#[command(name = "quill", about = "SQL client for the quill database service")]
pub struct Cli {
    /// Path to TOML client configuration.
    #[arg(long, default_value = "quill.toml", env = "QUILL_CONFIG")]
    pub config: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Execute every statement of a SQL script in one read-write transaction.
    Run {
        /// Script file; statements separated by `;`.
        file: String,
    },
    /// Run a read-only query and print rows as JSON lines.
    Query { sql: String },
    /// Print the statements of a SQL script without connecting.
    Split { file: String },
}

pub fn connect(path: &str) -> Result<Client, CliError> {
    tracing::info!(config = %path, "loading configuration");
    let config = ClientConfig::load(path)?;
    Ok(Client::new(&config)?)
}
