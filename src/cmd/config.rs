use std::io::{self, Write};

use clap::{Args, Subcommand};

use crate::config::{AppConfig, StoredConfig, config_file_path};
use crate::error::AppResult;

#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommand {
    /// Run the interactive configuration wizard.
    Init,
    /// Show the stored configuration and the effective values.
    Show,
}

pub fn run(command: ConfigCommand) -> AppResult<()> {
    match command {
        ConfigCommand::Init => run_init(),
        ConfigCommand::Show => run_show(),
    }
}

fn run_init() -> AppResult<()> {
    let mut cfg = StoredConfig::load()?;

    println!("Configuring uatdash.");
    println!("Press Enter to keep the current value, '-' to clear it.");
    println!("Jira credentials are entered at login and never stored here.");
    println!();

    apply_prompt("Listen address (e.g., 127.0.0.1:5001)", &mut cfg.listen_addr)?;
    apply_prompt("Session lifetime in seconds", &mut cfg.session_ttl_secs)?;
    apply_prompt("Issue type shown on the dashboard", &mut cfg.issue_type)?;
    apply_prompt("Jira request timeout in seconds", &mut cfg.request_timeout_secs)?;
    apply_prompt("Maximum tickets with saved drafts", &mut cfg.draft_limit)?;

    // Reject values the server could not start with.
    AppConfig::from_stored(&cfg)?;
    cfg.save()?;

    let path = config_file_path()?;
    println!("\nConfiguration saved to {}", path.display());
    Ok(())
}

fn run_show() -> AppResult<()> {
    let cfg = StoredConfig::load()?;
    let path = config_file_path()?;
    let effective = AppConfig::load()?;

    println!("Configuration file: {}", path.display());
    println!(
        "Listen address: {} (effective {})",
        display_value(&cfg.listen_addr),
        effective.listen_addr
    );
    println!(
        "Session lifetime: {} (effective {}s)",
        display_value(&cfg.session_ttl_secs),
        effective.session_ttl.as_secs()
    );
    println!(
        "Issue type: {} (effective {})",
        display_value(&cfg.issue_type),
        effective.issue_type
    );
    println!(
        "Request timeout: {} (effective {}s)",
        display_value(&cfg.request_timeout_secs),
        effective.request_timeout.as_secs()
    );
    println!(
        "Draft limit: {} (effective {})",
        display_value(&cfg.draft_limit),
        effective.draft_limit
    );

    Ok(())
}

fn apply_prompt(field: &str, target: &mut Option<String>) -> AppResult<()> {
    match prompt(field, target.as_deref())? {
        PromptAction::Keep => {}
        PromptAction::Clear => *target = None,
        PromptAction::Set(value) => *target = Some(value),
    }
    Ok(())
}

fn prompt(field: &str, current: Option<&str>) -> AppResult<PromptAction> {
    let mut stdout = io::stdout();

    match current {
        Some(value) => write!(stdout, "{field} [{value}] (Enter to keep, '-' to clear): ")?,
        None => write!(stdout, "{field} (Enter for default): ")?,
    }
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(parse_answer(&input))
}

fn parse_answer(input: &str) -> PromptAction {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        PromptAction::Keep
    } else if trimmed == "-" {
        PromptAction::Clear
    } else {
        PromptAction::Set(trimmed.to_string())
    }
}

fn display_value(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .unwrap_or_else(|| "<not set>".to_string())
}

#[derive(Debug, PartialEq, Eq)]
enum PromptAction {
    Keep,
    Clear,
    Set(String),
}
