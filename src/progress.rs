//! Progress indicator: a spinner line rendered by a background thread while
//! the caller blocks on a network call.
//!
//! Contract: once `stop()` returns, the thread has exited and its line has
//! been cleared. Nothing is written afterwards. `stop()` is idempotent and
//! also runs on drop, so early returns and `?` paths clean up too.

use std::io::Write;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::constants::{SPINNER_FRAMES, SPINNER_TICK_MS};

const YELLOW: &str = "\x1b[33m";
const RESET: &str = "\x1b[39m";

/// In-memory sink, shareable with the indicator thread.
#[derive(Debug, Clone, Default)]
pub struct CaptureBuffer(Arc<Mutex<Vec<u8>>>);

impl CaptureBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        match self.0.lock() {
            Ok(buf) => String::from_utf8_lossy(&buf).to_string(),
            Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.0.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Write for CaptureBuffer {
    fn write(&mut self, data: &[u8]) -> std::io::Result<usize> {
        match self.0.lock() {
            Ok(mut buf) => {
                buf.extend_from_slice(data);
                Ok(data.len())
            }
            Err(_) => Err(std::io::Error::other("capture buffer poisoned")),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Where the spinner line goes.
#[derive(Debug, Clone, Default)]
pub enum ProgressOutput {
    #[default]
    Stdout,
    Stderr,
    /// Render nothing (non-interactive callers).
    Silent,
    Capture(CaptureBuffer),
}

impl ProgressOutput {
    fn writer(&self) -> Box<dyn Write + Send> {
        match self {
            Self::Stdout => Box::new(std::io::stdout()),
            Self::Stderr => Box::new(std::io::stderr()),
            Self::Silent => Box::new(std::io::sink()),
            Self::Capture(buf) => Box::new(buf.clone()),
        }
    }
}

/// Spinner settings carried by components that run an indicator.
#[derive(Debug, Clone)]
pub struct SpinnerSettings {
    pub tick: Duration,
    pub output: ProgressOutput,
}

impl Default for SpinnerSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(SPINNER_TICK_MS),
            output: ProgressOutput::Stdout,
        }
    }
}

impl SpinnerSettings {
    pub fn silent() -> Self {
        Self {
            output: ProgressOutput::Silent,
            ..Self::default()
        }
    }

    pub fn start(&self, message: &str) -> ProgressIndicator {
        ProgressIndicator::start_with(message, self.tick, self.output.clone())
    }
}

pub struct ProgressIndicator {
    stop_tx: Option<mpsc::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ProgressIndicator {
    /// Start on stdout at the default 100ms cadence.
    pub fn start(message: &str) -> Self {
        SpinnerSettings::default().start(message)
    }

    pub fn start_with(message: &str, tick: Duration, output: ProgressOutput) -> Self {
        let (stop_tx, stop_rx) = mpsc::channel();
        let message = message.to_string();
        let mut out = output.writer();

        let handle = std::thread::Builder::new()
            .name("progress-indicator".into())
            .spawn(move || render_until_stopped(&message, tick, &mut *out, &stop_rx));

        let handle = match handle {
            Ok(h) => Some(h),
            Err(e) => {
                // No spinner is not a reason to fail the operation it decorates
                tracing::warn!(error = %e, "Failed to spawn progress indicator thread");
                None
            }
        };

        Self {
            stop_tx: Some(stop_tx),
            handle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Signal cancellation and wait until the line is cleared.
    pub fn stop(&mut self) {
        if let Some(tx) = self.stop_tx.take() {
            // Err means the thread already exited; join below still applies
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("Progress indicator thread panicked");
            }
        }
    }
}

impl Drop for ProgressIndicator {
    fn drop(&mut self) {
        self.stop();
    }
}

fn render_until_stopped(
    message: &str,
    tick: Duration,
    out: &mut dyn Write,
    stop: &mpsc::Receiver<()>,
) {
    let mut width = 0;
    for frame in SPINNER_FRAMES.iter().cycle() {
        let line = format!("{}{}", message, frame);
        width = width.max(line.chars().count());
        let _ = write!(out, "\r{}{}{}", YELLOW, line, RESET);
        let _ = out.flush();

        match stop.recv_timeout(tick) {
            Err(RecvTimeoutError::Timeout) => continue,
            // Stop requested, or the handle is gone
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    let _ = write!(out, "\r{}\r", " ".repeat(width));
    let _ = out.flush();
}
