//! Architect - project plans from a one-line goal
//!
//! CLI entry point for the REPL, history browsing, and the Slack front-end.

use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use clap::Parser;
use eyre::{Context, Result};
use tokio::io::BufReader;
use tracing::{info, warn};

use architect::cli::{Cli, Command, log_path};
use architect::config::Config;
use architect::repl::history_lines;
use architect::slack::{EventPayload, SlashCommand, build_frontend, listen};
use planstore::PlanStore;

fn setup_logging(level: &str) -> Result<()> {
    let log_file_path = log_path();
    if let Some(log_dir) = log_file_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Write to the log file, never stdout/stderr
    let (parsed, fallback) = match tracing::Level::from_str(level) {
        Ok(parsed) => (parsed, false),
        Err(_) => (tracing::Level::INFO, true),
    };
    let log_file = fs::File::create(&log_file_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(parsed.into()))
        .init();

    if fallback {
        warn!("Unknown log level '{}', using INFO", level);
    }
    info!("Logging initialized (level: {})", parsed);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // --log-level beats the config file, which beats INFO
    let level = cli
        .log_level
        .clone()
        .or_else(|| Config::load_log_level(cli.config.as_ref()))
        .unwrap_or_else(|| "INFO".to_string());
    setup_logging(&level).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    info!(
        "Architect loaded config: provider={}, model={}",
        config.llm.provider, config.llm.model
    );

    match cli.command {
        None | Some(Command::Repl) => cmd_repl(&config).await,
        Some(Command::History { select }) => cmd_history(&config, select),
        Some(Command::SlackCommand { payload }) => cmd_slack_command(&config, &payload).await,
        Some(Command::SlackEvent { payload }) => cmd_slack_event(&config, &payload).await,
        Some(Command::SlackListen) => cmd_slack_listen(&config).await,
    }
}

/// Run the interactive REPL
async fn cmd_repl(config: &Config) -> Result<()> {
    architect::repl::run_interactive(config).await
}

/// Print the saved plans, or one of them
fn cmd_history(config: &Config, select: Option<usize>) -> Result<()> {
    let store = PlanStore::open(config.storage.expanded_plans_dir()).context("Failed to open plan store")?;
    let records = store.list_history().context("Failed to list saved plans")?;

    let Some(n) = select else {
        if records.is_empty() {
            println!("No plans found.");
            return Ok(());
        }
        for (line, record) in history_lines(&records).iter().zip(&records) {
            println!(
                "{}  [{}]  {}",
                line,
                record.key,
                record.modified.format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        return Ok(());
    };

    let record = n
        .checked_sub(1)
        .and_then(|idx| records.get(idx))
        .ok_or_else(|| eyre::eyre!("No plan number {} ({} saved)", n, records.len()))?;
    let text = store.read(&record.key)?;
    print!("{}", text);
    Ok(())
}

/// Handle one slash command payload
async fn cmd_slack_command(config: &Config, payload: &Path) -> Result<()> {
    let raw = read_payload(payload)?;
    let command: SlashCommand = serde_json::from_str(&raw).context("Failed to parse slash command payload")?;

    let frontend = build_frontend(config)?;
    frontend.handle_command(command).await;
    Ok(())
}

/// Handle one Events API payload
async fn cmd_slack_event(config: &Config, payload: &Path) -> Result<()> {
    let raw = read_payload(payload)?;
    let event = serde_json::from_str::<EventPayload>(&raw)
        .context("Failed to parse event payload")?
        .into_event();

    if !event.kind.is_empty() && event.kind != "app_mention" {
        info!(kind = %event.kind, "cmd_slack_event: ignoring event");
        return Ok(());
    }

    let frontend = build_frontend(config)?;
    frontend.handle_mention(event).await;
    Ok(())
}

/// Handle envelopes from stdin until it closes
async fn cmd_slack_listen(config: &Config) -> Result<()> {
    let frontend = build_frontend(config)?;
    let stats = listen(frontend, BufReader::new(tokio::io::stdin())).await?;
    info!(?stats, "cmd_slack_listen: done");
    Ok(())
}

/// Payload text from a file, or stdin for `-`
fn read_payload(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        return io::read_to_string(io::stdin()).context("Failed to read payload from stdin");
    }
    fs::read_to_string(path).context(format!("Failed to read payload from {}", path.display()))
}
