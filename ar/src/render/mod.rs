//! Channel-specific plan rendering
//!
//! Rendering only accepts a `Plan`; an `InvalidPlan` has to be handled by the
//! caller before anything reaches this module.

mod chat;
mod terminal;

pub use chat::{
    Block, CHAT_CHUNK_LIMIT, ChatMessage, HEADER_TEXT_LIMIT, TextObject, chunk, escape_mrkdwn, plan_text,
    render_chat,
};
pub use terminal::{HAPPY_BUILDING, render_terminal};

use planstore::Plan;

/// Output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Terminal,
    Chat,
}

/// Rendered plan ready for one channel
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedOutput {
    /// Display lines, already colored for a terminal
    Terminal(Vec<String>),
    /// Slack message with blocks and fallback text
    Chat(ChatMessage),
}

/// Render a plan for the given channel
pub fn render(plan: &Plan, channel: Channel) -> RenderedOutput {
    match channel {
        Channel::Terminal => RenderedOutput::Terminal(render_terminal(plan)),
        Channel::Chat => RenderedOutput::Chat(render_chat(plan)),
    }
}
