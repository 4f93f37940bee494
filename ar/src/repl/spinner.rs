//! Busy indicator for the terminal
//!
//! The animation runs on its own task and only shares a stop signal with the
//! caller. `stop()` waits for the task, which clears the line and shows the
//! cursor before exiting. Dropping a `Spinner` without calling `stop()` drops
//! the signal sender, which the task also treats as a stop.

use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;

use crossterm::{cursor, execute, terminal};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::debug;

/// Animation frames, cycled in order
pub const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Delay between frames
pub const FRAME_INTERVAL: Duration = Duration::from_millis(100);

/// Running busy indicator
pub struct Spinner {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start animating on stderr
    pub fn start(message: impl Into<String>) -> Self {
        Self::start_with(message, io::stderr())
    }

    /// Start animating on the given writer
    pub fn start_with<W>(message: impl Into<String>, mut out: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let message = message.into();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            debug!("Spinner: started");
            let mut ticker = tokio::time::interval(FRAME_INTERVAL);
            let mut frame = 0usize;
            let _ = execute!(out, cursor::Hide);

            loop {
                tokio::select! {
                    // Fires on an explicit stop and when the sender is dropped
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {
                        let _ = write!(out, "\r{} {}", FRAMES[frame], message);
                        let _ = out.flush();
                        frame = (frame + 1) % FRAMES.len();
                    }
                }
            }

            let _ = write!(out, "\r");
            let _ = execute!(out, terminal::Clear(terminal::ClearType::CurrentLine), cursor::Show);
            debug!("Spinner: stopped");
        });

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    /// Stop the animation and wait until the terminal is restored
    pub async fn stop(mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Run `fut` with a spinner shown when `enabled`
///
/// The spinner is stopped and joined before the output is returned, whatever
/// the future resolved to.
pub async fn with_spinner<F>(enabled: bool, message: &str, fut: F) -> F::Output
where
    F: Future,
{
    with_spinner_on(enabled.then(io::stderr), message, fut).await
}

/// Run `fut` with a spinner drawn on `out`, or no spinner when `None`
pub async fn with_spinner_on<W, F>(out: Option<W>, message: &str, fut: F) -> F::Output
where
    W: Write + Send + 'static,
    F: Future,
{
    let spinner = out.map(|out| Spinner::start_with(message, out));
    let output = fut.await;
    if let Some(spinner) = spinner {
        spinner.stop().await;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Writer that appends into a shared buffer
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).to_string()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    const SHOW_CURSOR: &str = "\x1b[?25h";
    const HIDE_CURSOR: &str = "\x1b[?25l";

    #[tokio::test]
    async fn test_spinner_animates_and_restores_cursor() {
        let buf = SharedBuf::default();
        let spinner = Spinner::start_with("Architecting...", buf.clone());

        tokio::time::sleep(FRAME_INTERVAL * 3).await;
        spinner.stop().await;

        let out = buf.contents();
        assert!(out.starts_with(HIDE_CURSOR));
        assert!(out.contains(&format!("{} Architecting...", FRAMES[0])));
        assert!(out.contains(FRAMES[1]));
        assert!(out.ends_with(SHOW_CURSOR));
    }

    #[tokio::test]
    async fn test_stop_is_joined_before_return() {
        let buf = SharedBuf::default();
        let spinner = Spinner::start_with("busy", buf.clone());
        spinner.stop().await;

        // Nothing is written once stop() has returned
        let after_stop = buf.contents();
        tokio::time::sleep(FRAME_INTERVAL * 2).await;
        assert_eq!(buf.contents(), after_stop);
        assert!(after_stop.ends_with(SHOW_CURSOR));
    }

    #[tokio::test]
    async fn test_dropped_spinner_still_restores_cursor() {
        let buf = SharedBuf::default();
        {
            let _spinner = Spinner::start_with("busy", buf.clone());
            tokio::time::sleep(FRAME_INTERVAL).await;
        }

        tokio::time::sleep(FRAME_INTERVAL * 3).await;
        assert!(buf.contents().ends_with(SHOW_CURSOR));
    }

    #[tokio::test]
    async fn test_with_spinner_returns_output_on_error() {
        let result: Result<u32, &str> = with_spinner(false, "busy", async { Err("boom") }).await;
        assert_eq!(result, Err("boom"));

        let result: Result<u32, &str> = with_spinner(true, "busy", async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_spinner_restores_cursor_when_future_fails() {
        let buf = SharedBuf::default();
        let result: Result<u32, &str> = with_spinner_on(Some(buf.clone()), "busy", async {
            tokio::time::sleep(FRAME_INTERVAL * 2).await;
            Err("boom")
        })
        .await;

        assert_eq!(result, Err("boom"));
        let out = buf.contents();
        assert!(out.starts_with(HIDE_CURSOR));
        assert!(out.contains("busy"));
        assert!(out.ends_with(SHOW_CURSOR));
    }

    #[tokio::test]
    async fn test_with_spinner_on_without_writer() {
        let result: Result<u32, &str> = with_spinner_on(None::<SharedBuf>, "busy", async { Err("boom") }).await;
        assert_eq!(result, Err("boom"));
    }
}
