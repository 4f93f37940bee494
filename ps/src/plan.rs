//! Plan model shared by generation, storage, and rendering

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::NOT_AVAILABLE;
use crate::key::StorageKey;

/// Leading ordinal such as "1." or " 2) " on a step
static ORDINAL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\d+[.)]\s*").expect("ordinal prefix pattern is valid"));

/// A normalized project plan
///
/// Built once per generation request and never updated in place. Step order
/// is meaningful and is kept as-is through storage and rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Human-readable project name, never empty
    pub project_name: String,

    /// Ordered steps with ordinal prefixes already removed
    pub steps: Vec<String>,

    /// Estimated effort; `None` when the model gave nothing usable
    pub estimated_hours: Option<u32>,

    /// Free-form difficulty label, usually Easy/Medium/Hard
    pub difficulty: String,

    /// ISO-8601 creation timestamp, if known
    pub created_at: Option<String>,
}

impl Plan {
    /// Storage key derived from the project name
    pub fn key(&self) -> StorageKey {
        StorageKey::derive(&self.project_name)
    }

    /// Presentation category for the difficulty label
    pub fn severity(&self) -> Severity {
        Severity::from_difficulty(&self.difficulty)
    }

    /// Difficulty label, or "N/A" when empty
    pub fn difficulty_label(&self) -> &str {
        if self.difficulty.trim().is_empty() {
            NOT_AVAILABLE
        } else {
            &self.difficulty
        }
    }

    /// Hour estimate as display text
    pub fn hours_label(&self) -> String {
        self.estimated_hours
            .map(|h| h.to_string())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string())
    }

    /// Creation timestamp as display text
    pub fn created_label(&self) -> &str {
        self.created_at.as_deref().unwrap_or(NOT_AVAILABLE)
    }
}

/// Severity bucket used to color a difficulty label
///
/// Only the exact labels `Easy` and `Medium` map below `High`; every other
/// string, including empty and unrecognized ones, is `High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn from_difficulty(difficulty: &str) -> Self {
        debug!(%difficulty, "Severity::from_difficulty: called");
        match difficulty {
            "Easy" => Severity::Low,
            "Medium" => Severity::Medium,
            _ => Severity::High,
        }
    }
}

/// Remove one leading ordinal ("1.", "2)") from a step
///
/// Applied once; a step like "1. 2. Deploy" becomes "2. Deploy".
pub fn strip_ordinal(step: &str) -> String {
    ORDINAL_PREFIX.replace(step, "").trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(difficulty: &str) -> Plan {
        Plan {
            project_name: "Todo App".to_string(),
            steps: vec![],
            estimated_hours: None,
            difficulty: difficulty.to_string(),
            created_at: None,
        }
    }

    #[test]
    fn test_strip_ordinal_variants() {
        assert_eq!(strip_ordinal("1. Set up repo"), "Set up repo");
        assert_eq!(strip_ordinal("2) Build API"), "Build API");
        assert_eq!(strip_ordinal("   10.Deploy"), "Deploy");
        assert_eq!(strip_ordinal("No prefix here"), "No prefix here");
    }

    #[test]
    fn test_strip_ordinal_is_not_recursive() {
        assert_eq!(strip_ordinal("1. 2. Deploy"), "2. Deploy");
    }

    #[test]
    fn test_strip_ordinal_keeps_inner_numbers() {
        assert_eq!(strip_ordinal("Use 3 replicas"), "Use 3 replicas");
        assert_eq!(strip_ordinal("2024 roadmap"), "2024 roadmap");
    }

    #[test]
    fn test_severity_mapping() {
        assert_eq!(Severity::from_difficulty("Easy"), Severity::Low);
        assert_eq!(Severity::from_difficulty("Medium"), Severity::Medium);
        assert_eq!(Severity::from_difficulty("Hard"), Severity::High);
        assert_eq!(Severity::from_difficulty("Unknown"), Severity::High);
        assert_eq!(Severity::from_difficulty(""), Severity::High);
    }

    #[test]
    fn test_labels_fall_back_to_na() {
        let p = plan("");
        assert_eq!(p.difficulty_label(), "N/A");
        assert_eq!(p.hours_label(), "N/A");
        assert_eq!(p.created_label(), "N/A");
        assert_eq!(p.severity(), Severity::High);
    }

    #[test]
    fn test_labels_with_values() {
        let mut p = plan("Medium");
        p.estimated_hours = Some(10);
        p.created_at = Some("2024-01-01T00:00:00Z".to_string());
        assert_eq!(p.difficulty_label(), "Medium");
        assert_eq!(p.hours_label(), "10");
        assert_eq!(p.created_label(), "2024-01-01T00:00:00Z");
        assert_eq!(p.key().as_str(), "todo_app");
    }
}
