//! Request/response layer over the device's interactive shell.
//!
//! The shell echoes typed characters, decorates its output with VT100
//! sequences and prints `jtag:~$ ` whenever it is ready for input. There is
//! no other framing: the prompt is the only signal that a response is
//! complete.

pub mod escape;

use std::io;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::constants::{
    COMMAND_SETTLE_MS, ECHO_TIMEOUT_MS, POLL_INTERVAL_MS, PROMPT, SYNC_IDLE_MS, SYNC_RETRY_MS,
    SYNC_SETTLE_MS,
};
use crate::interface::DeviceInterface;
pub use escape::strip_escape_sequences;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    Synchronized,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session is not synchronized with the shell prompt")]
    NotSynchronized,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Command timeout after {elapsed:?}: {command}")]
    Timeout { command: String, elapsed: Duration },
}

pub struct ShellSession {
    device: Option<Box<dyn DeviceInterface + Send>>,
    state: SessionState,
}

impl ShellSession {
    pub fn new(device: Box<dyn DeviceInterface + Send>) -> Self {
        ShellSession {
            device: Some(device),
            state: SessionState::Connected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Poke the shell with newlines until it answers with a prompt.
    ///
    /// Returns `false` once `timeout` has elapsed without seeing the prompt.
    /// Read and write errors are logged and the attempt repeated.
    pub fn synchronize(&mut self, timeout: Duration) -> bool {
        let Some(device) = self.device.as_mut() else {
            return false;
        };

        let deadline = Instant::now() + timeout;
        if let Err(e) = device.clear_input() {
            debug!("Failed to clear input before sync: {}", e);
        }

        let mut found = false;
        while Instant::now() < deadline {
            if let Err(e) = device.send(b"\n") {
                debug!("Write error during sync: {}", e);
                pause(Duration::from_millis(SYNC_RETRY_MS), deadline);
                continue;
            }
            pause(Duration::from_millis(SYNC_SETTLE_MS), deadline);

            match device.receive() {
                Ok(data) if data.is_empty() => {
                    pause(Duration::from_millis(SYNC_IDLE_MS), deadline);
                    continue;
                }
                Ok(data) => {
                    let text = String::from_utf8_lossy(&data);
                    if strip_escape_sequences(&text).contains(PROMPT) {
                        found = true;
                        break;
                    }
                }
                Err(e) => debug!("Read error during sync: {}", e),
            }

            pause(Duration::from_millis(SYNC_RETRY_MS), deadline);
        }

        if found {
            info!("Shell prompt detected");
            self.state = SessionState::Synchronized;
        } else {
            warn!("Shell prompt not detected after {:?}", timeout);
        }
        found
    }

    /// Run one command and return its non-empty output lines, echo and
    /// prompt removed.
    pub fn execute(&mut self, command: &str, timeout: Duration) -> Result<Vec<String>, SessionError> {
        if self.state != SessionState::Synchronized {
            return Err(SessionError::NotSynchronized);
        }
        let device = self.device.as_mut().ok_or(SessionError::NotSynchronized)?;

        let start = Instant::now();
        let deadline = start + timeout;

        device.clear_input()?;
        device.send(format!("{}\n", command).as_bytes())?;
        pause(Duration::from_millis(COMMAND_SETTLE_MS), deadline);

        let mut buffer = read_past_echo(device.as_mut(), command, deadline)?;

        loop {
            if strip_escape_sequences(&String::from_utf8_lossy(&buffer)).contains(PROMPT) {
                break;
            }
            if Instant::now() >= deadline {
                let elapsed = start.elapsed();
                error!("Command timeout after {:?}: {}", elapsed, command);
                return Err(SessionError::Timeout {
                    command: command.to_string(),
                    elapsed,
                });
            }

            let chunk = device.receive()?;
            if chunk.is_empty() {
                pause(Duration::from_millis(POLL_INTERVAL_MS), deadline);
                continue;
            }
            buffer.extend_from_slice(&chunk);
        }

        let lines = collect_output_lines(&String::from_utf8_lossy(&buffer));
        debug!("Command '{}' returned {} lines", command, lines.len());
        Ok(lines)
    }

    /// Release the stream. Safe to call more than once.
    pub fn close(&mut self) {
        if self.device.take().is_some() {
            debug!("Shell session closed");
        }
        self.state = SessionState::Disconnected;
    }
}

/// Wait for the first line the shell sends back and drop it if it is the
/// echo of `command`. Bytes received beyond the echo are returned.
///
/// The echo is recognised by content: a first line that does not contain
/// the command text is kept as output, so a shell with echo off loses nothing.
fn read_past_echo(
    device: &mut (dyn DeviceInterface + Send),
    command: &str,
    deadline: Instant,
) -> io::Result<Vec<u8>> {
    let echo_deadline = (Instant::now() + Duration::from_millis(ECHO_TIMEOUT_MS)).min(deadline);
    let mut buffer = Vec::new();

    while Instant::now() < echo_deadline {
        let chunk = device.receive()?;
        if chunk.is_empty() {
            pause(Duration::from_millis(POLL_INTERVAL_MS), echo_deadline);
            continue;
        }
        buffer.extend_from_slice(&chunk);

        if let Some(end) = buffer.iter().position(|&b| b == b'\n') {
            let first = String::from_utf8_lossy(&buffer[..end]);
            let first = strip_escape_sequences(&first);
            if first.contains(command.trim()) {
                debug!("Echo discarded: {}", first.trim());
                buffer.drain(..=end);
            }
            return Ok(buffer);
        }
    }

    debug!("No echo received for '{}'", command);
    Ok(buffer)
}

/// Split a complete response into cleaned, non-empty lines. The first line
/// holding the prompt ends the response; whatever precedes the prompt on
/// that line is kept.
pub(crate) fn collect_output_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();

    for raw in text.split('\n') {
        let cleaned = strip_escape_sequences(raw);

        // Checked before trimming, which would eat the prompt's trailing space
        if cleaned.contains(PROMPT) {
            let rest = cleaned.replace(PROMPT, "");
            let rest = rest.trim();
            if !rest.is_empty() {
                lines.push(rest.to_string());
            }
            break;
        }

        let cleaned = cleaned.trim();
        if !cleaned.is_empty() {
            lines.push(cleaned.to_string());
        }
    }

    lines
}

fn pause(duration: Duration, deadline: Instant) {
    let remaining = deadline.saturating_duration_since(Instant::now());
    std::thread::sleep(duration.min(remaining));
}
