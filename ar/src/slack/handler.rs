//! Slash command and mention handlers
//!
//! Each request runs in its own task. A failure of any kind ends in exactly
//! one error message to the requester and never takes the listener down.

use std::sync::Arc;

use planstore::PlanStore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::client::Responder;
use super::payload::{MentionEvent, SlashCommand};
use crate::error::ArchitectError;
use crate::frontend::{SaveStatus, extract_goal, request_plan};
use crate::plan::PlanGenerator;
use crate::render::{ChatMessage, escape_mrkdwn, render_chat};

/// Reply sent when a handler task dies without reporting
pub const INTERNAL_ERROR_REPLY: &str = "Sorry, I encountered an internal error. Please try again.";

/// Greeting posted before a slash command plan is generated
pub fn greeting(user_id: Option<&str>, goal: &str) -> String {
    match user_id {
        Some(user) => format!("Hello, <@{}>! You asked me to architect: *{}*", user, escape_mrkdwn(goal)),
        None => format!("Hello! You asked me to architect: *{}*", escape_mrkdwn(goal)),
    }
}

/// Slack front-end
pub struct SlackFrontend {
    generator: PlanGenerator,
    store: PlanStore,
    responder: Arc<dyn Responder>,
    persist_mentions: bool,
}

impl SlackFrontend {
    /// Create a front-end; mention plans are not saved unless enabled
    pub fn new(generator: PlanGenerator, store: PlanStore, responder: Arc<dyn Responder>) -> Self {
        Self {
            generator,
            store,
            responder,
            persist_mentions: false,
        }
    }

    pub fn with_persist_mentions(mut self, persist: bool) -> Self {
        self.persist_mentions = persist;
        self
    }

    /// Handle a slash command to completion
    pub async fn handle_command(self: &Arc<Self>, command: SlashCommand) {
        debug!(command = %command.command, "handle_command: called");
        let Some(channel) = command.channel_id.clone() else {
            warn!("handle_command: payload has no channel, nowhere to reply");
            return;
        };

        let this = Arc::clone(self);
        let task = tokio::spawn(async move { this.process_command(command).await });
        self.contain(task, &channel, None).await;
    }

    /// Handle an app mention to completion
    pub async fn handle_mention(self: &Arc<Self>, event: MentionEvent) {
        debug!(kind = %event.kind, "handle_mention: called");
        let Some(channel) = event.channel.clone() else {
            warn!("handle_mention: event has no channel, nowhere to reply");
            return;
        };
        let thread = event.reply_thread().map(String::from);

        let this = Arc::clone(self);
        let task = tokio::spawn(async move { this.process_mention(event).await });
        self.contain(task, &channel, thread.as_deref()).await;
    }

    /// Report a handler task that panicked or was cancelled
    async fn contain(&self, task: JoinHandle<()>, channel: &str, thread_ts: Option<&str>) {
        if let Err(e) = task.await {
            error!(error = %e, %channel, "contain: handler task failed");
            self.reply(channel, &ChatMessage::plain(INTERNAL_ERROR_REPLY), thread_ts)
                .await;
        }
    }

    async fn process_command(&self, command: SlashCommand) {
        let channel = command.channel_id.as_deref().unwrap_or_default();

        let goal = match extract_goal(command.text.as_deref()) {
            Ok(goal) => goal,
            Err(e) => return self.reply_error(channel, e, None).await,
        };
        info!(%channel, %goal, "process_command: architecting");

        let hello = greeting(command.user_id.as_deref(), &goal);
        self.reply(channel, &ChatMessage::plain(hello), None).await;

        match request_plan(&self.generator, Some(&self.store), &goal).await {
            Ok(delivery) => {
                self.reply(channel, &render_chat(&delivery.plan), None).await;
                self.report_save(channel, delivery.save, None).await;
            }
            Err(e) => self.reply_error(channel, e, None).await,
        }
    }

    async fn process_mention(&self, event: MentionEvent) {
        let channel = event.channel.as_deref().unwrap_or_default();
        let thread = event.reply_thread();

        let goal = match extract_goal(event.goal_text().as_deref()) {
            Ok(goal) => goal,
            Err(e) => return self.reply_error(channel, e, thread).await,
        };
        info!(%channel, %goal, persist = self.persist_mentions, "process_mention: architecting");

        let store = self.persist_mentions.then_some(&self.store);
        match request_plan(&self.generator, store, &goal).await {
            Ok(delivery) => {
                self.reply(channel, &render_chat(&delivery.plan), thread).await;
                self.report_save(channel, delivery.save, thread).await;
            }
            Err(e) => self.reply_error(channel, e, thread).await,
        }
    }

    async fn report_save(&self, channel: &str, save: SaveStatus, thread_ts: Option<&str>) {
        if let SaveStatus::Failed(e) = save {
            let note = format!("Note: the plan could not be saved. {}", e.user_message());
            self.reply(channel, &ChatMessage::plain(note), thread_ts).await;
        }
    }

    async fn reply_error(&self, channel: &str, err: ArchitectError, thread_ts: Option<&str>) {
        match &err {
            ArchitectError::EmptyGoal => debug!("reply_error: empty goal"),
            other => error!(error = %other, %channel, "reply_error: request failed"),
        }
        self.reply(channel, &ChatMessage::plain(err.user_message()), thread_ts)
            .await;
    }

    /// Send a message; delivery failures are logged and dropped
    async fn reply(&self, channel: &str, message: &ChatMessage, thread_ts: Option<&str>) {
        if let Err(e) = self.responder.send(channel, message, thread_ts).await {
            error!(error = %e, %channel, "reply: failed to deliver message");
        }
    }
}
