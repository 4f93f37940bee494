//! Slack Block Kit rendering
//!
//! The whole plan is written as one mrkdwn text, then cut into segments of at
//! most `CHAT_CHUNK_LIMIT` characters. Cuts fall on raw character boundaries,
//! not words, so the limit always holds and the segments join back to the
//! original text exactly.

use serde::{Deserialize, Serialize};
use tracing::debug;

use planstore::Plan;

/// Maximum characters in one section block
pub const CHAT_CHUNK_LIMIT: usize = 2900;

/// Slack rejects header text longer than this
pub const HEADER_TEXT_LIMIT: usize = 150;

/// Text object inside a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TextObject {
    #[serde(rename = "plain_text")]
    PlainText { text: String },
    #[serde(rename = "mrkdwn")]
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn text(&self) -> &str {
        match self {
            TextObject::PlainText { text } | TextObject::Mrkdwn { text } => text,
        }
    }
}

/// Layout block in a chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Header { text: TextObject },
    Section { text: TextObject },
    Divider,
}

/// A chat message: blocks plus plain fallback text for notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub blocks: Vec<Block>,
}

impl ChatMessage {
    /// A message with no blocks
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            blocks: Vec::new(),
        }
    }
}

/// Escape the characters Slack treats as control sequences in mrkdwn
pub fn escape_mrkdwn(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Full plan as a single mrkdwn text
pub fn plan_text(plan: &Plan) -> String {
    let mut lines = vec![
        format!("*{}*", escape_mrkdwn(&plan.project_name)),
        format!(
            "Difficulty: {} | Est. hours: {}",
            escape_mrkdwn(plan.difficulty_label()),
            plan.hours_label()
        ),
        format!("Created: {}", escape_mrkdwn(plan.created_label())),
        String::new(),
        "*Steps:*".to_string(),
    ];
    for (i, step) in plan.steps.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, escape_mrkdwn(step)));
    }
    lines.join("\n")
}

/// Split text into segments of at most `limit` characters
///
/// Produces `ceil(len / limit)` segments; empty input produces none.
pub fn chunk(text: &str, limit: usize) -> Vec<String> {
    debug!(len = text.len(), limit, "chunk: called");
    let limit = limit.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars.chunks(limit).map(|c| c.iter().collect()).collect()
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Render a plan as a Slack message
///
/// Header naming the project, a divider, then one section per chunk.
pub fn render_chat(plan: &Plan) -> ChatMessage {
    let title = format!("Here is the full plan: {}", plan.project_name);
    // Escaping happens before the split, so a cut may land inside "&amp;"
    let chunks = chunk(&plan_text(plan), CHAT_CHUNK_LIMIT);
    debug!(chunks = chunks.len(), "render_chat: rendered plan text");

    let mut blocks = Vec::with_capacity(chunks.len() + 2);
    blocks.push(Block::Header {
        text: TextObject::PlainText {
            text: truncate_chars(&title, HEADER_TEXT_LIMIT),
        },
    });
    blocks.push(Block::Divider);
    blocks.extend(chunks.into_iter().map(|text| Block::Section {
        text: TextObject::Mrkdwn { text },
    }));

    ChatMessage { text: title, blocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn plan_with_steps(steps: Vec<String>) -> Plan {
        Plan {
            project_name: "Todo App".to_string(),
            steps,
            estimated_hours: Some(10),
            difficulty: "Medium".to_string(),
            created_at: Some("2024-01-01T00:00:00Z".to_string()),
        }
    }

    #[test]
    fn test_chunk_exact_boundaries() {
        assert!(chunk("", 2900).is_empty());
        assert_eq!(chunk("abc", 2900), vec!["abc"]);

        let text = "x".repeat(2900);
        assert_eq!(chunk(&text, 2900).len(), 1);

        let text = "x".repeat(2901);
        let parts = chunk(&text, 2900);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1], "x");
    }

    #[test]
    fn test_chunk_counts_characters_not_bytes() {
        let text = "é".repeat(3000);
        let parts = chunk(&text, 2900);
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].chars().count(), 2900);
        assert_eq!(parts[1].chars().count(), 100);
    }

    #[test]
    fn test_plan_text_layout() {
        let text = plan_text(&plan_with_steps(vec!["Design schema".to_string(), "Build API".to_string()]));
        assert_eq!(
            text,
            "*Todo App*\nDifficulty: Medium | Est. hours: 10\nCreated: 2024-01-01T00:00:00Z\n\n*Steps:*\n1. Design schema\n2. Build API"
        );
    }

    #[test]
    fn test_plan_text_escapes_control_characters() {
        let text = plan_text(&plan_with_steps(vec!["Wire <api> & db".to_string()]));
        assert!(text.contains("1. Wire &lt;api&gt; &amp; db"));
    }

    #[test]
    fn test_render_chat_block_order() {
        let message = render_chat(&plan_with_steps(vec!["Design schema".to_string()]));

        assert_eq!(message.text, "Here is the full plan: Todo App");
        assert_eq!(message.blocks.len(), 3);
        match &message.blocks[0] {
            Block::Header { text } => assert_eq!(text.text(), "Here is the full plan: Todo App"),
            other => panic!("expected header, got {:?}", other),
        }
        assert_eq!(message.blocks[1], Block::Divider);
        assert!(matches!(&message.blocks[2], Block::Section { text } if text.text().contains("Design schema")));
    }

    #[test]
    fn test_render_chat_long_plan_splits_in_order() {
        let steps: Vec<String> = (0..400).map(|i| format!("Step number {} of a long plan", i)).collect();
        let plan = plan_with_steps(steps);
        let message = render_chat(&plan);

        let sections: Vec<&str> = message
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Section { text } => Some(text.text()),
                _ => None,
            })
            .collect();

        assert!(sections.len() > 1);
        assert!(sections.iter().all(|s| s.chars().count() <= CHAT_CHUNK_LIMIT));
        assert_eq!(sections.concat(), plan_text(&plan));
    }

    #[test]
    fn test_chunk_boundary_may_split_escaped_entity() {
        let head = plan_text(&plan_with_steps(vec![String::new()])).chars().count();
        let step = format!("{}&tail", "x".repeat(CHAT_CHUNK_LIMIT - head - 2));
        let plan = plan_with_steps(vec![step]);
        let message = render_chat(&plan);

        let sections: Vec<&str> = message
            .blocks
            .iter()
            .filter_map(|b| match b {
                Block::Section { text } => Some(text.text()),
                _ => None,
            })
            .collect();

        assert_eq!(sections.len(), 2);
        assert!(sections[0].ends_with("&a"));
        assert!(sections[1].starts_with("mp;tail"));
        assert_eq!(sections.concat(), plan_text(&plan));
    }

    #[test]
    fn test_header_is_truncated() {
        let mut plan = plan_with_steps(vec![]);
        plan.project_name = "N".repeat(300);
        let message = render_chat(&plan);
        match &message.blocks[0] {
            Block::Header { text } => assert_eq!(text.text().chars().count(), HEADER_TEXT_LIMIT),
            other => panic!("expected header, got {:?}", other),
        }
    }

    #[test]
    fn test_blocks_serialize_to_slack_shape() {
        let message = render_chat(&plan_with_steps(vec!["a".to_string()]));
        let json = serde_json::to_value(&message.blocks).unwrap();

        assert_eq!(json[0]["type"], "header");
        assert_eq!(json[0]["text"]["type"], "plain_text");
        assert_eq!(json[1], serde_json::json!({ "type": "divider" }));
        assert_eq!(json[2]["type"], "section");
        assert_eq!(json[2]["text"]["type"], "mrkdwn");
    }

    proptest! {
        #[test]
        fn prop_chunk_respects_limit_and_rejoins(text in ".{0,9000}", limit in 1usize..4000) {
            let parts = chunk(&text, limit);
            let len = text.chars().count();
            prop_assert_eq!(parts.len(), len.div_ceil(limit));
            prop_assert!(parts.iter().all(|p| p.chars().count() <= limit && !p.is_empty()));
            prop_assert_eq!(parts.concat(), text);
        }
    }
}
