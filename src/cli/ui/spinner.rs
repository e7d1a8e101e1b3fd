//! Spinner component for showing progress while waiting on the org
//!
//! Deploys can sit in the org's queue for minutes, so the spinner also shows
//! how long it has been waiting.

use is_terminal::IsTerminal;
use std::io::{self, Write};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

const SPINNER_CHARS: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
const SPINNER_INTERVAL: Duration = Duration::from_millis(80);

/// Elapsed time is only worth showing once the wait is noticeable
const SHOW_ELAPSED_AFTER: Duration = Duration::from_secs(3);

/// A spinner that displays an animated progress indicator
///
/// The spinner starts when created and clears its line when dropped.
///
/// # Example
///
/// ```ignore
/// {
///     let _spinner = Spinner::start("Deploying metadata...");
///     client.deploy(&request).await?;
/// } // line cleared here
/// ```
pub struct Spinner {
    stop_tx: Option<oneshot::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl Spinner {
    /// Start a new spinner with the given message
    pub fn start(message: impl Into<String>) -> Self {
        let message = message.into();
        let (stop_tx, stop_rx) = oneshot::channel();

        let handle = tokio::spawn(Self::run_spinner(message, stop_rx));

        Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        }
    }

    fn stop_internal(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(handle) = self.handle.take() {
            // can't await in Drop
            handle.abort();
        }

        Self::clear_line();
    }

    async fn run_spinner(message: String, mut stop_rx: oneshot::Receiver<()>) {
        let started = Instant::now();
        let mut frame = 0;
        let mut stdout = io::stdout();

        loop {
            print!("\r{}", render_frame(frame, &message, started.elapsed()));
            let _ = stdout.flush();

            frame += 1;

            tokio::select! {
                _ = tokio::time::sleep(SPINNER_INTERVAL) => {},
                _ = &mut stop_rx => break,
            }
        }

        Self::clear_line();
    }

    fn clear_line() {
        print!("\r\x1b[K");
        let _ = io::stdout().flush();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop_internal();
    }
}

/// One line of the animation, e.g. `⠙ — Deploying metadata... (12s)`
fn render_frame(frame: usize, message: &str, elapsed: Duration) -> String {
    let spinner_char = SPINNER_CHARS[frame % SPINNER_CHARS.len()];
    if elapsed < SHOW_ELAPSED_AFTER {
        format!("{} — {}", spinner_char, message)
    } else {
        format!("{} — {} ({}s)", spinner_char, message, elapsed.as_secs())
    }
}

/// Run a future with a spinner
///
/// Without a terminal on stdout the future is simply awaited, so piped
/// reports contain no animation frames.
///
/// # Example
///
/// ```ignore
/// let report = with_spinner("Deploying metadata...", deploy::submit(&client, prepared, false))
///     .await?;
/// ```
pub async fn with_spinner<F, T>(message: impl Into<String>, future: F) -> T
where
    F: std::future::Future<Output = T>,
{
    if !io::stdout().is_terminal() {
        return future.await;
    }
    let _spinner = Spinner::start(message);
    future.await
}
