//! Outbound Slack messages
//!
//! Handlers only see the `Responder` trait. `SlackWebClient` implements it
//! against the Web API's `chat.postMessage`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::SlackConfig;
use crate::render::ChatMessage;

/// Errors delivering a message to Slack
#[derive(Debug, Error)]
pub enum SlackError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Slack answered with `ok: false`
    #[error("Slack API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Sends messages back to a channel
#[async_trait]
pub trait Responder: Send + Sync {
    /// Post `message` to `channel`, inside `thread_ts` when given
    async fn send(&self, channel: &str, message: &ChatMessage, thread_ts: Option<&str>) -> Result<(), SlackError>;
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack Web API client
pub struct SlackWebClient {
    token: String,
    base_url: String,
    http: Client,
}

impl SlackWebClient {
    /// Create a client from configuration
    ///
    /// Reads the bot token from the environment variable named in config.
    pub fn from_config(config: &SlackConfig) -> Result<Self, SlackError> {
        debug!(api_base_url = %config.api_base_url, "from_config: called");
        let token = config.get_bot_token().map_err(|e| SlackError::Config(e.to_string()))?;
        let http = Client::builder().build()?;

        Ok(Self {
            token,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn body(channel: &str, message: &ChatMessage, thread_ts: Option<&str>) -> serde_json::Value {
        let mut body = serde_json::json!({
            "channel": channel,
            "text": message.text,
        });
        if !message.blocks.is_empty() {
            body["blocks"] = serde_json::json!(message.blocks);
        }
        if let Some(ts) = thread_ts {
            body["thread_ts"] = serde_json::json!(ts);
        }
        body
    }
}

#[async_trait]
impl Responder for SlackWebClient {
    async fn send(&self, channel: &str, message: &ChatMessage, thread_ts: Option<&str>) -> Result<(), SlackError> {
        debug!(%channel, blocks = message.blocks.len(), "send: called");
        let response = self
            .http
            .post(format!("{}/chat.postMessage", self.base_url))
            .bearer_auth(&self.token)
            .json(&Self::body(channel, message, thread_ts))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SlackError::Api(format!("HTTP {}", status.as_u16())));
        }

        let parsed: PostMessageResponse = response.json().await?;
        if parsed.ok {
            Ok(())
        } else {
            Err(SlackError::Api(parsed.error.unwrap_or_else(|| "unknown_error".to_string())))
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Block, TextObject};

    #[test]
    fn test_body_plain_message() {
        let body = SlackWebClient::body("C1", &ChatMessage::plain("hi"), None);
        assert_eq!(body, serde_json::json!({ "channel": "C1", "text": "hi" }));
    }

    #[test]
    fn test_body_with_blocks_and_thread() {
        let message = ChatMessage {
            text: "fallback".to_string(),
            blocks: vec![
                Block::Divider,
                Block::Section {
                    text: TextObject::Mrkdwn { text: "*x*".to_string() },
                },
            ],
        };
        let body = SlackWebClient::body("C1", &message, Some("1.0"));

        assert_eq!(body["thread_ts"], "1.0");
        assert_eq!(body["blocks"][0]["type"], "divider");
        assert_eq!(body["blocks"][1]["text"]["text"], "*x*");
    }

    #[test]
    fn test_post_message_response_parse() {
        let ok: PostMessageResponse = serde_json::from_str(r#"{"ok":true,"ts":"1.0"}"#).unwrap();
        assert!(ok.ok);

        let err: PostMessageResponse = serde_json::from_str(r#"{"ok":false,"error":"not_in_channel"}"#).unwrap();
        assert!(!err.ok);
        assert_eq!(err.error.as_deref(), Some("not_in_channel"));
    }
}
