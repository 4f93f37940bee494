//! REPL session management

use std::fmt::Display;
use std::io::{self, IsTerminal, Write};

use colored::Colorize;
use eyre::Result;
use planstore::{PlanStore, StoredPlanRecord};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, error, info};

use super::history::{Selection, history_lines, parse_selection};
use super::spinner::with_spinner;
use crate::error::ArchitectError;
use crate::frontend::{SaveStatus, extract_goal, request_plan};
use crate::plan::PlanGenerator;
use crate::render::render_terminal;

/// Message shown next to the busy indicator
pub const BUSY_MESSAGE: &str = "Architecting...";

/// Interactive REPL session
///
/// Output goes through `out` so tests can capture it; the readline prompt
/// itself always talks to the terminal.
pub struct ReplSession<W: Write> {
    generator: PlanGenerator,
    store: PlanStore,
    out: W,
    spinner: bool,
}

impl ReplSession<io::Stdout> {
    /// Create a session printing to stdout
    pub fn new(generator: PlanGenerator, store: PlanStore) -> Self {
        let spinner = io::stderr().is_terminal();
        Self {
            generator,
            store,
            out: io::stdout(),
            spinner,
        }
    }
}

impl<W: Write> ReplSession<W> {
    /// Create a session printing to the given writer, without a spinner
    pub fn with_output(generator: PlanGenerator, store: PlanStore, out: W) -> Self {
        Self {
            generator,
            store,
            out,
            spinner: false,
        }
    }

    /// Captured output
    pub fn output(&self) -> &W {
        &self.out
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", "Goal >".bright_green()));

            match readline {
                Ok(line) => {
                    let input = line.trim();
                    let _ = rl.add_history_entry(input);

                    if input.starts_with('/') {
                        match self.handle_slash_command(input, &mut rl) {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    } else {
                        self.handle_goal(input).await;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    self.say("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    self.say("");
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        self.say("Goodbye!");
        Ok(())
    }

    /// Generate, render, and save a plan for one goal
    ///
    /// Never fails: every error is reported as a single line and the session
    /// carries on.
    pub async fn handle_goal(&mut self, input: &str) {
        debug!(input_len = input.len(), "handle_goal: called");
        if let Err(e) = self.try_handle_goal(input).await {
            match &e {
                ArchitectError::EmptyGoal => debug!("handle_goal: empty goal"),
                other => error!(error = %other, "handle_goal: request failed"),
            }
            let message = e.user_message();
            self.say(format!("{} {}", "Error:".red(), message));
        }
    }

    async fn try_handle_goal(&mut self, input: &str) -> Result<(), ArchitectError> {
        let goal = extract_goal(Some(input))?;
        if !self.spinner {
            self.say(BUSY_MESSAGE.dimmed());
        }

        let delivery = with_spinner(
            self.spinner,
            BUSY_MESSAGE,
            request_plan(&self.generator, Some(&self.store), &goal),
        )
        .await?;

        for line in render_terminal(&delivery.plan) {
            self.say(line);
        }

        match delivery.save {
            SaveStatus::Saved(key) => {
                info!(key = %key, "handle_goal: plan saved");
                let path = self.store.path_for(&key);
                self.say(format!("Plan saved to {}", path.display()).dimmed());
            }
            SaveStatus::Failed(e) => {
                self.say(format!("{} {}", "Warning:".yellow(), e.user_message()));
            }
            SaveStatus::Skipped => {}
        }
        Ok(())
    }

    /// Print the history listing
    ///
    /// Returns the listed records, or `None` when there is nothing to choose
    /// from and no selection prompt should be shown.
    pub fn show_history(&mut self) -> Option<Vec<StoredPlanRecord>> {
        debug!("show_history: called");
        let records = match self.store.list_history() {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "show_history: listing failed");
                let message = ArchitectError::from(e).user_message();
                self.say(format!("{} {}", "Error:".red(), message));
                return None;
            }
        };

        if records.is_empty() {
            self.say("No plans found.".dimmed());
            return None;
        }

        self.say("");
        self.say("Saved Plans:".bright_cyan());
        for line in history_lines(&records) {
            self.say(line);
        }
        self.say("");
        Some(records)
    }

    /// Act on the answer to the selection prompt
    pub fn open_selection(&mut self, records: &[StoredPlanRecord], input: &str) {
        match parse_selection(input, records.len()) {
            Selection::Back => {}
            Selection::Invalid => self.say("Invalid selection.".yellow()),
            Selection::Open(idx) => {
                let record = &records[idx];
                match self.store.read(&record.key) {
                    Ok(text) => {
                        self.say("");
                        self.say(text.trim_end());
                        self.say("");
                    }
                    Err(e) => {
                        error!(key = %record.key, error = %e, "open_selection: read failed");
                        let message = ArchitectError::from(e).user_message();
                        self.say(format!("{} {}", "Error:".red(), message));
                    }
                }
            }
        }
    }

    fn print_welcome(&mut self) {
        self.say("");
        self.say("Architect".bright_cyan().bold());
        self.say("Describe a project goal and get a step-by-step plan.");
        self.say(format!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow()));
        self.say("");
    }

    fn print_help(&mut self) {
        self.say("");
        self.say("Available Commands:".bright_cyan());
        self.say(format!("  {:14} Show this help", "/help".yellow()));
        self.say(format!("  {:14} Browse saved plans", "/history".yellow()));
        self.say(format!("  {:14} Exit", "/quit".yellow()));
        self.say("");
        self.say("Anything else is treated as a project goal.");
        self.say("");
    }

    fn handle_slash_command(&mut self, input: &str, rl: &mut DefaultEditor) -> SlashResult {
        let cmd = input.split_whitespace().next().unwrap_or("");

        match cmd {
            "/help" | "/h" => {
                self.print_help();
                SlashResult::Continue
            }
            "/quit" | "/q" | "/exit" => SlashResult::Quit,
            "/history" => {
                if let Some(records) = self.show_history() {
                    match rl.readline("Select a plan number (Enter to go back): ") {
                        Ok(answer) => self.open_selection(&records, &answer),
                        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {}
                        Err(err) => error!(error = %err, "handle_slash_command: readline failed"),
                    }
                }
                SlashResult::Continue
            }
            _ => {
                self.say(format!("{} Unknown command: {}", "?".yellow(), cmd));
                self.say(format!("Type {} for available commands", "/help".yellow()));
                SlashResult::Continue
            }
        }
    }

    /// Write one line; a broken terminal has nowhere to report to
    fn say(&mut self, line: impl Display) {
        let _ = writeln!(self.out, "{}", line);
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
