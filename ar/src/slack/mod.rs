//! Slack front-end for Architect
//!
//! `/architect <goal>` greets the user, posts the plan as Block Kit sections,
//! and saves it. Mentions get the plan as a thread reply. Inbound payloads
//! arrive one at a time from the CLI or as an envelope stream on stdin;
//! replies go out through the Web API.

pub mod client;
mod handler;
mod listener;
mod payload;

pub use client::{Responder, SlackError, SlackWebClient};
pub use handler::{INTERNAL_ERROR_REPLY, SlackFrontend, greeting};
pub use listener::{ListenStats, listen};
pub use payload::{Envelope, EventPayload, MentionEvent, SlashCommand, strip_mentions};

use std::sync::Arc;

use eyre::Result;
use planstore::PlanStore;

use crate::config::Config;
use crate::llm::create_client;
use crate::plan::PlanGenerator;

/// Build the Slack front-end from configuration
pub fn build_frontend(config: &Config) -> Result<Arc<SlackFrontend>> {
    config.validate()?;

    let llm = create_client(&config.llm).map_err(|e| eyre::eyre!("Failed to create LLM client: {}", e))?;
    let responder = SlackWebClient::from_config(&config.slack)?;
    let store = PlanStore::open(config.storage.expanded_plans_dir())?;

    let frontend = SlackFrontend::new(PlanGenerator::from_config(llm, &config.llm), store, Arc::new(responder))
        .with_persist_mentions(config.slack.persist_mentions);
    Ok(Arc::new(frontend))
}
