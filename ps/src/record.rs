//! Flat text record format
//!
//! ```text
//! Project: Todo App
//! Difficulty: Medium
//! Created: 2024-01-01T00:00:00Z
//! Estimated hours: 10
//!
//! Steps:
//! - Design schema
//! - Build API
//! ```
//!
//! Parsing is tolerant: unknown lines are ignored and missing fields fall
//! back to their defaults.

use crate::NOT_AVAILABLE;
use crate::plan::Plan;

const PROJECT: &str = "Project:";
const DIFFICULTY: &str = "Difficulty:";
const CREATED: &str = "Created:";
const HOURS: &str = "Estimated hours:";
const STEPS: &str = "Steps:";
const STEP_BULLET: &str = "- ";

/// Render a plan as a record
pub fn format(plan: &Plan) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", PROJECT, single_line(&plan.project_name)));
    out.push_str(&format!("{} {}\n", DIFFICULTY, single_line(plan.difficulty_label())));
    out.push_str(&format!("{} {}\n", CREATED, single_line(plan.created_label())));
    out.push_str(&format!("{} {}\n", HOURS, plan.hours_label()));
    out.push('\n');
    out.push_str(STEPS);
    out.push('\n');
    for step in &plan.steps {
        out.push_str(STEP_BULLET);
        out.push_str(&single_line(step));
        out.push('\n');
    }
    out
}

/// Parse a record back into a plan
pub fn parse(text: &str) -> Plan {
    let mut plan = Plan {
        project_name: String::new(),
        steps: Vec::new(),
        estimated_hours: None,
        difficulty: String::new(),
        created_at: None,
    };

    let mut in_steps = false;
    for line in text.lines() {
        if in_steps {
            if let Some(step) = line.strip_prefix(STEP_BULLET) {
                plan.steps.push(step.to_string());
            } else if line == "-" {
                plan.steps.push(String::new());
            }
            continue;
        }

        if line.trim() == STEPS {
            in_steps = true;
        } else if let Some(value) = field(line, PROJECT) {
            plan.project_name = value.to_string();
        } else if let Some(value) = field(line, DIFFICULTY) {
            plan.difficulty = value.to_string();
        } else if let Some(value) = field(line, CREATED) {
            plan.created_at = Some(value.to_string());
        } else if let Some(value) = field(line, HOURS) {
            plan.estimated_hours = value.parse().ok();
        }
    }

    plan
}

/// Value after a `Label:` prefix, `None` for "N/A" or an empty value
fn field<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let value = line.strip_prefix(label)?.trim();
    if value.is_empty() || value == NOT_AVAILABLE {
        None
    } else {
        Some(value)
    }
}

fn single_line(s: &str) -> String {
    s.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo_plan() -> Plan {
        Plan {
            project_name: "Todo App".to_string(),
            steps: vec!["Design schema".to_string(), "Build API".to_string()],
            estimated_hours: Some(10),
            difficulty: "Medium".to_string(),
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_format_contains_every_field() {
        let text = format(&todo_plan());
        assert!(text.contains("Project: Todo App"));
        assert!(text.contains("Difficulty: Medium"));
        assert!(text.contains("Created: 2024-01-01T00:00:00Z"));
        assert!(text.contains("Estimated hours: 10"));
        assert!(text.contains("- Design schema\n- Build API\n"));
    }

    #[test]
    fn test_parse_reads_back_formatted_record() {
        let plan = todo_plan();
        assert_eq!(parse(&format(&plan)), plan);
    }

    #[test]
    fn test_missing_values_render_na_and_parse_to_none() {
        let plan = Plan {
            project_name: "Bare".to_string(),
            steps: vec![],
            estimated_hours: None,
            difficulty: String::new(),
            created_at: None,
        };
        let text = format(&plan);
        assert!(text.contains("Difficulty: N/A"));
        assert!(text.contains("Created: N/A"));
        assert!(text.contains("Estimated hours: N/A"));
        assert_eq!(parse(&text), plan);
    }

    #[test]
    fn test_multiline_step_is_flattened() {
        let mut plan = todo_plan();
        plan.steps = vec!["Write docs\nand publish".to_string()];
        let text = format(&plan);
        assert!(text.contains("- Write docs and publish\n"));
    }

    #[test]
    fn test_parse_tolerates_legacy_record_without_hours() {
        let text = "Project: Old Plan\nDifficulty: Hard\n\nSteps:\n- One\n- Two\n";
        let plan = parse(text);
        assert_eq!(plan.project_name, "Old Plan");
        assert_eq!(plan.difficulty, "Hard");
        assert_eq!(plan.estimated_hours, None);
        assert_eq!(plan.created_at, None);
        assert_eq!(plan.steps, vec!["One", "Two"]);
    }

    #[test]
    fn test_step_order_preserved() {
        let mut plan = todo_plan();
        plan.steps = (1..=20).map(|i| format!("step {}", i)).collect();
        assert_eq!(parse(&format(&plan)).steps, plan.steps);
    }
}
