//! Interactive REPL for Architect
//!
//! Reads goals line by line, shows a busy indicator while the model works,
//! and prints each plan with colored formatting. `/history` browses saved
//! plans.

mod history;
mod session;
mod spinner;

pub use history::{Selection, history_lines, parse_selection};
pub use session::{BUSY_MESSAGE, ReplSession};
pub use spinner::{FRAME_INTERVAL, FRAMES, Spinner, with_spinner, with_spinner_on};

use eyre::Result;
use planstore::PlanStore;

use crate::config::Config;
use crate::llm::create_client;
use crate::plan::PlanGenerator;

/// Run the interactive REPL
///
/// This is the main entry point for `architect repl`.
pub async fn run_interactive(config: &Config) -> Result<()> {
    // Validate API key early
    config.validate()?;

    let llm = create_client(&config.llm).map_err(|e| eyre::eyre!("Failed to create LLM client: {}", e))?;
    let generator = PlanGenerator::from_config(llm, &config.llm);
    let store = PlanStore::open(config.storage.expanded_plans_dir())?;

    let mut session = ReplSession::new(generator, store);
    session.run().await
}
