//! Steps shared by every delivery front-end
//!
//! Goal extraction, generation, and optional persistence. Rendering and
//! message delivery belong to each front-end.

use planstore::{Plan, PlanStore, StorageKey};
use tracing::{debug, warn};

use crate::error::ArchitectError;
use crate::plan::{PlanGenerator, PlanOutcome};

/// What happened to the plan on disk
#[derive(Debug)]
pub enum SaveStatus {
    /// This front-end does not persist
    Skipped,
    Saved(StorageKey),
    /// The plan is still delivered; the failure is reported alongside it
    Failed(ArchitectError),
}

/// A generated plan ready to render
#[derive(Debug)]
pub struct Delivery {
    pub plan: Plan,
    pub save: SaveStatus,
}

/// Trimmed goal text, or `EmptyGoal` when there is none
pub fn extract_goal(text: Option<&str>) -> Result<String, ArchitectError> {
    match text.map(str::trim) {
        Some(goal) if !goal.is_empty() => Ok(goal.to_string()),
        _ => Err(ArchitectError::EmptyGoal),
    }
}

/// Generate a plan for `goal` and save it when a store is given
///
/// Decode and transport failures come back as their own `ArchitectError`
/// variants; nothing is written in either case.
pub async fn request_plan(
    generator: &PlanGenerator,
    store: Option<&PlanStore>,
    goal: &str,
) -> Result<Delivery, ArchitectError> {
    debug!(persist = store.is_some(), "request_plan: called");
    let plan = match generator.generate(goal).await? {
        PlanOutcome::Plan(plan) => plan,
        PlanOutcome::Invalid(invalid) => return Err(invalid.into()),
    };

    let save = match store {
        None => SaveStatus::Skipped,
        Some(store) => match store.save(&plan) {
            Ok(key) => SaveStatus::Saved(key),
            Err(e) => {
                warn!(error = %e, project = %plan.project_name, "request_plan: save failed");
                SaveStatus::Failed(e.into())
            }
        },
    };

    Ok(Delivery { plan, save })
}
