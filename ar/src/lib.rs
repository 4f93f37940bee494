//! Architect - project plans from a one-line goal
//!
//! A goal goes to a language model with a structured-output schema. The reply
//! is normalized into a [`Plan`], rendered for the channel that asked, and
//! saved as a text record. Three front-ends share that pipeline: an
//! interactive terminal REPL, a Slack slash command, and Slack mentions.
//!
//! # Modules
//!
//! - [`llm`] - LLM client trait with Gemini and OpenAI implementations
//! - [`plan`] - Plan generation and reply normalization
//! - [`render`] - Terminal and Slack Block Kit rendering
//! - [`frontend`] - Steps every front-end shares
//! - [`repl`] - Interactive terminal front-end
//! - [`slack`] - Slack slash command and mention front-end
//! - [`config`] - Configuration types and loading
//! - [`cli`] - Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod frontend;
pub mod llm;
pub mod plan;
pub mod prompts;
pub mod render;
pub mod repl;
pub mod slack;

// Re-export commonly used types
pub use config::{Config, LlmConfig, SlackConfig, StorageConfig};
pub use error::ArchitectError;
pub use frontend::{Delivery, SaveStatus, extract_goal, request_plan};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, create_client};
pub use plan::{InvalidPlan, InvalidReason, PlanGenerator, PlanOutcome, normalize};
pub use planstore::{Plan, PlanStore, Severity, StorageKey, StoredPlanRecord};
pub use render::{Channel, ChatMessage, RenderedOutput, render};
