//! Plan generation and normalization
//!
//! A generation request ends in one of three ways:
//!
//! - `Ok(PlanOutcome::Plan)` - the model answered with a usable plan
//! - `Ok(PlanOutcome::Invalid)` - the model answered, but not in the schema
//! - `Err(LlmError)` - the model could not be reached at all
//!
//! Callers match on all three before touching plan fields.

mod generator;
mod normalizer;

pub use generator::{PlanGenerator, plan_schema};
pub use normalizer::normalize;

pub use planstore::Plan;

/// Why a model reply could not become a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// Reply was not the expected JSON structure
    DecodeError,
}

impl InvalidReason {
    /// Stable reason code for logs and payloads
    pub fn code(&self) -> &'static str {
        match self {
            InvalidReason::DecodeError => "decode_error",
        }
    }
}

/// A model reply that could not be decoded into a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPlan {
    /// The reply exactly as received
    pub raw_text: String,
    pub reason: InvalidReason,
}

impl InvalidPlan {
    pub fn decode_error(raw_text: impl Into<String>) -> Self {
        Self {
            raw_text: raw_text.into(),
            reason: InvalidReason::DecodeError,
        }
    }
}

/// Result of normalizing one model reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanOutcome {
    Plan(Plan),
    Invalid(InvalidPlan),
}

impl PlanOutcome {
    pub fn is_plan(&self) -> bool {
        matches!(self, PlanOutcome::Plan(_))
    }

    /// The plan, if decoding succeeded
    pub fn plan(&self) -> Option<&Plan> {
        match self {
            PlanOutcome::Plan(plan) => Some(plan),
            PlanOutcome::Invalid(_) => None,
        }
    }
}
