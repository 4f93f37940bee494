//! Envelope stream listener
//!
//! Reads one JSON envelope per line and handles each on its own task. Bad
//! lines are logged and skipped. At end of input the listener waits for every
//! in-flight handler before returning.

use std::sync::Arc;

use eyre::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::handler::SlackFrontend;
use super::payload::Envelope;

/// Counts from one listener run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ListenStats {
    pub dispatched: usize,
    pub ignored: usize,
    pub malformed: usize,
}

/// Dispatch envelopes from `reader` until it is exhausted or fails
pub async fn listen<R>(frontend: Arc<SlackFrontend>, reader: R) -> Result<ListenStats>
where
    R: AsyncBufRead + Unpin,
{
    debug!("listen: called");
    let mut stats = ListenStats::default();
    let mut tasks = JoinSet::new();
    let mut reader = reader;
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => {
                // Stop reading but still let dispatched handlers finish
                error!(error = %e, "listen: read failed, draining in-flight handlers");
                break;
            }
        }

        let line = match std::str::from_utf8(&buf) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!(error = %e, "listen: skipping envelope that is not UTF-8");
                stats.malformed += 1;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        let envelope = match serde_json::from_str::<Envelope>(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                warn!(error = %e, "listen: skipping malformed envelope");
                stats.malformed += 1;
                continue;
            }
        };

        let frontend = Arc::clone(&frontend);
        match envelope {
            Envelope::SlashCommands { envelope_id, payload } => {
                debug!(?envelope_id, "listen: slash command");
                stats.dispatched += 1;
                tasks.spawn(async move { frontend.handle_command(payload).await });
            }
            Envelope::EventsApi { envelope_id, payload } => {
                let event = payload.into_event();
                if event.kind != "app_mention" {
                    debug!(?envelope_id, kind = %event.kind, "listen: ignoring event");
                    stats.ignored += 1;
                    continue;
                }
                debug!(?envelope_id, "listen: app mention");
                stats.dispatched += 1;
                tasks.spawn(async move { frontend.handle_mention(event).await });
            }
            Envelope::Other => {
                stats.ignored += 1;
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!(error = %e, "listen: handler task failed");
        }
    }

    info!(?stats, "listen: input exhausted");
    Ok(stats)
}
