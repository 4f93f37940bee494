//! Raw model output to Plan

use serde::Deserialize;
use tracing::debug;

use super::{InvalidPlan, Plan, PlanOutcome};
use planstore::strip_ordinal;

/// Wire shape of a plan reply
#[derive(Debug, Deserialize)]
struct RawPlan {
    project_name: String,
    #[serde(default)]
    steps: Vec<String>,
    #[serde(default)]
    estimated_hours: Option<serde_json::Value>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

/// Decode a model reply into a plan
///
/// Any structural problem yields `PlanOutcome::Invalid` carrying `raw`
/// unchanged. Soft problems (unusable hours, missing difficulty) fall back to
/// defaults instead. Line breaks and runs of whitespace inside text fields
/// collapse to single spaces.
pub fn normalize(raw: &str) -> PlanOutcome {
    debug!(raw_len = raw.len(), "normalize: called");

    let parsed: RawPlan = match serde_json::from_str(strip_code_fence(raw)) {
        Ok(parsed) => parsed,
        Err(e) => {
            debug!(error = %e, "normalize: decode failed");
            return PlanOutcome::Invalid(InvalidPlan::decode_error(raw));
        }
    };

    let project_name = collapse_whitespace(&parsed.project_name);
    if project_name.is_empty() {
        debug!("normalize: empty project_name");
        return PlanOutcome::Invalid(InvalidPlan::decode_error(raw));
    }

    let plan = Plan {
        project_name,
        steps: parsed.steps.iter().map(|s| strip_ordinal(&collapse_whitespace(s))).collect(),
        estimated_hours: parsed.estimated_hours.as_ref().and_then(coerce_hours),
        difficulty: parsed.difficulty.as_deref().map(collapse_whitespace).unwrap_or_default(),
        created_at: parsed
            .created_at
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
    };

    debug!(project = %plan.project_name, steps = plan.steps.len(), "normalize: decoded plan");
    PlanOutcome::Plan(plan)
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Integer hours from a JSON number or numeric string
fn coerce_hours(value: &serde_json::Value) -> Option<u32> {
    let hours = match value {
        serde_json::Value::Number(n) => n.as_f64()?,
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };

    if !hours.is_finite() || hours < 0.0 || hours > u32::MAX as f64 {
        return None;
    }
    Some(hours.round() as u32)
}

/// Remove one surrounding markdown code fence, if present
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return raw;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return raw;
    };
    // Drop an info string such as "json" on the opening line
    match body.split_once('\n') {
        Some((info, inner)) if !info.trim_start().starts_with('{') => inner,
        _ => body,
    }
}
