//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Where log output goes
pub fn log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("architect")
        .join("logs")
        .join("architect.log")
}

/// Architect - turn a project goal into a step-by-step plan
#[derive(Parser)]
#[command(
    name = "architect",
    about = "Turn a project goal into a step-by-step plan",
    version,
    after_help = "Logs are written to: ~/.local/share/architect/logs/architect.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(short, long, global = true, help = "Log level (overrides config)")]
    pub log_level: Option<String>,

    /// Subcommand to execute; the REPL when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Start the interactive REPL
    Repl,

    /// List saved plans, or print one
    History {
        /// 1-based number from the listing
        #[arg(value_name = "N")]
        select: Option<usize>,
    },

    /// Handle one slash command payload (JSON file, or - for stdin)
    SlackCommand {
        #[arg(value_name = "PAYLOAD")]
        payload: PathBuf,
    },

    /// Handle one Events API payload (JSON file, or - for stdin)
    SlackEvent {
        #[arg(value_name = "PAYLOAD")]
        payload: PathBuf,
    },

    /// Handle a stream of envelopes on stdin, one JSON object per line
    SlackListen,
}
