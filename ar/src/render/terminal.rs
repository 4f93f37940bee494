//! Terminal rendering

use colored::{ColoredString, Colorize};
use planstore::{Plan, Severity};

/// Closing line printed after every plan
pub const HAPPY_BUILDING: &str = "Happy building!";

/// Difficulty badge colored by severity
fn difficulty_badge(plan: &Plan) -> ColoredString {
    let label = format!(" {} ", plan.difficulty_label());
    match plan.severity() {
        Severity::Low => label.green().reversed().bold(),
        Severity::Medium => label.yellow().reversed().bold(),
        Severity::High => label.red().reversed().bold(),
    }
}

/// Render a plan as terminal display lines
pub fn render_terminal(plan: &Plan) -> Vec<String> {
    let mut lines = Vec::with_capacity(plan.steps.len() + 8);

    lines.push(String::new());
    lines.push(plan.project_name.cyan().bold().to_string());
    lines.push(difficulty_badge(plan).to_string());
    lines.push(format!("{} hours", plan.hours_label()).blue().bold().to_string());
    lines.push(format!("Created: {}", plan.created_label()).dimmed().to_string());
    lines.push(String::new());
    lines.push("Execution Steps:".blue().bold().to_string());
    for (i, step) in plan.steps.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, step.white().bold()));
    }
    lines.push(String::new());
    lines.push(HAPPY_BUILDING.bright_green().to_string());

    lines
}
