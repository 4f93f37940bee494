//! Inbound Slack payloads
//!
//! Field names follow Slack's wire format. Every field a handler reads is
//! optional so a sparse payload is handled instead of rejected.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// `<@U123>` or `<@U123|name>` user mention tokens
static MENTION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@[A-Za-z0-9]+(\|[^>]*)?>").expect("mention pattern is valid"));

/// A slash command invocation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlashCommand {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub response_url: Option<String>,
}

/// An `app_mention` event
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionEvent {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default)]
    pub thread_ts: Option<String>,
}

impl MentionEvent {
    /// Mention text with the bot's user tokens removed
    pub fn goal_text(&self) -> Option<String> {
        self.text.as_deref().map(strip_mentions)
    }

    /// Thread to reply in: the existing thread, or a new one under the mention
    pub fn reply_thread(&self) -> Option<&str> {
        self.thread_ts.as_deref().or(self.ts.as_deref())
    }
}

/// An Events API callback body, or a bare event
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EventPayload {
    Callback { event: MentionEvent },
    Bare(MentionEvent),
}

impl EventPayload {
    pub fn into_event(self) -> MentionEvent {
        match self {
            EventPayload::Callback { event } | EventPayload::Bare(event) => event,
        }
    }
}

/// One line of a socket-mode style envelope stream
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum Envelope {
    #[serde(rename = "slash_commands")]
    SlashCommands {
        #[serde(default)]
        envelope_id: Option<String>,
        payload: SlashCommand,
    },
    #[serde(rename = "events_api")]
    EventsApi {
        #[serde(default)]
        envelope_id: Option<String>,
        payload: EventPayload,
    },
    /// hello, disconnect and anything newer
    #[serde(other)]
    Other,
}

/// Remove user mention tokens and trim
pub fn strip_mentions(text: &str) -> String {
    MENTION_TOKEN.replace_all(text, "").trim().to_string()
}
