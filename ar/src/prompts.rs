//! Prompt templates
//!
//! The system instruction and goal prompt are compiled into the binary from
//! `.pmt` files and rendered with Handlebars.

use handlebars::Handlebars;
use serde::Serialize;
use tracing::debug;

/// Fixed system instruction describing the plan schema
pub const SYSTEM: &str = include_str!("../prompts/system.pmt");

/// User prompt wrapping the goal
pub const GOAL: &str = include_str!("../prompts/goal.pmt");

#[derive(Debug, Serialize)]
struct GoalContext<'a> {
    goal: &'a str,
}

/// Render the user prompt for a goal
pub fn render_goal(goal: &str) -> Result<String, handlebars::RenderError> {
    debug!(goal_len = goal.len(), "render_goal: called");
    let mut hb = Handlebars::new();
    hb.set_strict_mode(true);
    // Goals are plain text, not HTML
    hb.register_escape_fn(handlebars::no_escape);
    let rendered = hb.render_template(GOAL, &GoalContext { goal })?;
    Ok(rendered.trim_end().to_string())
}
