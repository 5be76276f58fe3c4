mod cmd;
mod config;
mod context;
mod domain;
mod drafts;
mod error;
mod http;
mod infra;
mod services;
#[cfg(test)]
mod test_support;
mod workflow;

use std::env;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::draft::{self, DraftArgs};
use crate::cmd::serve::{self, ServeArgs};
use crate::cmd::validate::{self, ValidateArgs};
use crate::config::AppConfig;
use crate::error::AppResult;

#[derive(Parser)]
#[command(name = "uatdash", author, version, about = "UAT and release dashboard backend for Jira")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the dashboard API in front of Jira.
    Serve(ServeArgs),
    /// Check one row's dates and derive its UAT and release statuses.
    Validate(ValidateArgs),
    /// Manage locally stored ticket drafts.
    Draft(DraftArgs),
    /// Manage configuration.
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() {
    init_tracing();

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

/// Ok(false) means the command ran but found problems to report.
async fn run() -> AppResult<bool> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(true)
        }
        Commands::Validate(args) => validate::run(args),
        Commands::Draft(args) => {
            let config = AppConfig::load()?;
            draft::run(args, config.draft_limit)?;
            Ok(true)
        }
        Commands::Serve(args) => {
            let config = AppConfig::load()?;
            serve::run(config, args).await?;
            Ok(true)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("UATDASH_LOG")
        .unwrap_or_else(|_| EnvFilter::new("uatdash=info,warn"));
    let format = env::var("UATDASH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);
    match format.as_str() {
        "json" => registry
            .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
            .init(),
        _ => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .init(),
    }
}
