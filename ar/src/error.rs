//! Front-end error taxonomy
//!
//! Every front-end funnels its failures through `ArchitectError` and shows
//! `user_message()` to the user. None of these escape a request boundary.

use planstore::StoreError;
use thiserror::Error;

use crate::llm::LlmError;
use crate::plan::InvalidPlan;

#[derive(Debug, Error)]
pub enum ArchitectError {
    /// Goal text was empty or missing
    #[error("No goal provided")]
    EmptyGoal,

    /// The model answered but not in the plan schema
    #[error("Model reply could not be decoded ({})", invalid.reason.code())]
    Decode { invalid: InvalidPlan },

    /// The model could not be reached
    #[error("Planning service unavailable: {0}")]
    Transport(#[from] LlmError),

    /// A stored plan or history entry does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Persistence failed for some other reason
    #[error("Storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for ArchitectError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(key) => ArchitectError::NotFound(key),
            other => ArchitectError::Storage(other),
        }
    }
}

impl From<InvalidPlan> for ArchitectError {
    fn from(invalid: InvalidPlan) -> Self {
        ArchitectError::Decode { invalid }
    }
}

impl ArchitectError {
    /// One-line message suitable for any channel
    pub fn user_message(&self) -> String {
        match self {
            ArchitectError::EmptyGoal => "Please provide a project goal.".to_string(),
            ArchitectError::Decode { .. } => {
                "The AI returned an unexpected format. Try rephrasing your goal.".to_string()
            }
            ArchitectError::Transport(e) => transport_message(e),
            ArchitectError::NotFound(what) => format!("Plan not found: {}", what),
            ArchitectError::Storage(e) => format!("Could not save or read the plan: {}", e),
        }
    }
}

fn transport_message(err: &LlmError) -> String {
    match err {
        LlmError::RateLimited { retry_after } => format!(
            "The planning service is busy. Please wait {}s and try again.",
            retry_after.as_secs()
        ),
        LlmError::Timeout(after) => format!(
            "The planning service did not answer within {}s. Please try again.",
            after.as_secs()
        ),
        e if e.is_auth() => "The planning service rejected our credentials. Check the API key.".to_string(),
        LlmError::Config(msg) => format!("The planning service is not configured: {}", msg),
        other => format!("The planning service is unavailable right now ({}).", one_line(&other.to_string())),
    }
}

/// Collapse an error body to a short single line
fn one_line(s: &str) -> String {
    let flat = s.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > 200 {
        let mut cut: String = flat.chars().take(199).collect();
        cut.push('…');
        cut
    } else {
        flat
    }
}
