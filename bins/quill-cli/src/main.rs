mod cmd;

use clap::Parser;
use cmd::config::{Cli, Command};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Split { file } => cmd::run::split(file),
        Command::Run { file } => match cmd::config::connect(&cli.config) {
            Ok(client) => cmd::run::run(&client, file).await,
            Err(e) => Err(e),
        },
        Command::Query { sql } => match cmd::config::connect(&cli.config) {
            Ok(client) => cmd::query::run(&client, sql).await,
            Err(e) => Err(e),
        },
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        std::process::exit(1);
    }
}
