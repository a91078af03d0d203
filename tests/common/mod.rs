#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex};

use jtagswitch::constants::PROMPT;
use jtagswitch::interface::DeviceInterface;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// In-memory stand-in for the device shell. Reacts to complete lines the
/// way the firmware does: echo, response, prompt.
#[derive(Clone, Default)]
pub struct FakeShell {
    state: Arc<Mutex<FakeState>>,
}

#[derive(Default)]
struct FakeState {
    select: [u8; 2],
    dhcp: bool,
    echo: bool,
    colors: bool,
    chunk: usize,
    raw_replies: HashMap<String, String>,
    line: Vec<u8>,
    pending: VecDeque<u8>,
    written: Vec<u8>,
    commands: Vec<String>,
}

impl FakeShell {
    pub fn new() -> Self {
        let shell = FakeShell::default();
        {
            let mut state = shell.state.lock().unwrap();
            state.echo = true;
            state.dhcp = true;
            state.chunk = 64;
        }
        shell
    }

    pub fn without_echo(self) -> Self {
        self.state.lock().unwrap().echo = false;
        self
    }

    pub fn with_colors(self) -> Self {
        self.state.lock().unwrap().colors = true;
        self
    }

    /// Answer `command` with exactly `raw`, no prompt appended
    pub fn with_raw_reply(self, command: &str, raw: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .raw_replies
            .insert(command.to_string(), raw.to_string());
        self
    }

    pub fn written(&self) -> Vec<u8> {
        self.state.lock().unwrap().written.clone()
    }

    /// Non-empty command lines received so far
    pub fn commands(&self) -> Vec<String> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn boxed(&self) -> Box<dyn DeviceInterface + Send> {
        Box::new(self.clone())
    }
}

impl FakeState {
    fn prompt(&self) -> String {
        if self.colors {
            format!("\x1b[1;32m{}\x1b[m", PROMPT)
        } else {
            PROMPT.to_string()
        }
    }

    fn push(&mut self, text: &str) {
        self.pending.extend(text.as_bytes());
    }

    fn handle_line(&mut self, line: &str) {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            let prompt = self.prompt();
            self.push(&format!("\r\n{}", prompt));
            return;
        }

        self.commands.push(line.to_string());
        if self.echo {
            self.push(&format!("{}\r\n", line));
        }

        if let Some(raw) = self.raw_replies.get(line).cloned() {
            self.push(&raw);
            return;
        }

        let reply = self.respond(line);
        let prompt = self.prompt();
        if reply.is_empty() {
            self.push(&prompt);
        } else {
            self.push(&format!("{}\r\n{}", reply.replace('\n', "\r\n"), prompt));
        }
    }

    fn respond(&mut self, line: &str) -> String {
        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            ["jtag", "select0", v] | ["jtag", "select1", v] => {
                let idx = if words[1] == "select0" { 0 } else { 1 };
                match *v {
                    "0" | "1" => {
                        self.select[idx] = v.parse().unwrap();
                        format!("select{} set to {} (connector {})", idx, v, v)
                    }
                    _ => "\x1b[1;31mInvalid value. Use 0 or 1\x1b[m".to_string(),
                }
            }
            ["jtag", "toggle0"] | ["jtag", "toggle1"] => {
                let idx = if words[1] == "toggle0" { 0 } else { 1 };
                self.select[idx] ^= 1;
                let s = self.select[idx];
                format!("select{} toggled to {} (connector {})", idx, s, s)
            }
            ["jtag", "status"] => format!(
                "JTAG Switch Status:\n  select0: {a} (connector {a})\n  select1: {b} (connector {b})\n\nBoard: frdm_k64f",
                a = self.select[0],
                b = self.select[1]
            ),
            ["net", "status"] => format!(
                "Network Status:\n  Mode: {}\n  IP Address: 192.168.1.100\n  Netmask: 255.255.255.0\n  Gateway: 192.168.1.1\n  MAC Address: 02:00:00:12:34:56\n  Link: Up\n  Uptime: 42 seconds",
                if self.dhcp { "DHCP" } else { "Static IP" }
            ),
            ["net", "config"] => {
                if self.dhcp {
                    "Network Configuration:\n  Mode: dhcp".to_string()
                } else {
                    "Network Configuration:\n  Mode: static\n  Static IP: 10.0.0.5\n  Static Netmask: 255.0.0.0\n  Static Gateway: 10.0.0.1".to_string()
                }
            }
            ["net", "set", "dhcp"] => {
                self.dhcp = true;
                "Enabling DHCP mode...\nDHCP mode enabled successfully.\nUse 'net save' to persist configuration.\nUse 'net restart' to apply changes.".to_string()
            }
            ["net", "set", "static", ip, nm, gw] => {
                self.dhcp = false;
                format!(
                    "Setting static IP configuration...\n  IP Address: {}\n  Netmask: {}\n  Gateway: {}\nStatic IP configuration set successfully.",
                    ip, nm, gw
                )
            }
            ["net", "restart"] => {
                "Restarting network interface...\nNetwork restarted successfully.\nNew IP: 192.168.1.100".to_string()
            }
            ["net", "save"] => {
                "Saving network configuration to non-volatile storage...\nConfiguration saved successfully.".to_string()
            }
            _ => format!("{}: command not found", line),
        }
    }
}

impl DeviceInterface for FakeShell {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        let mut state = self.state.lock().unwrap();
        state.written.extend_from_slice(data);

        for &byte in data {
            if byte == b'\n' {
                let line = String::from_utf8_lossy(&state.line).into_owned();
                state.line.clear();
                state.handle_line(&line);
            } else {
                state.line.push(byte);
            }
        }
        Ok(())
    }

    fn receive(&mut self) -> io::Result<Vec<u8>> {
        let mut state = self.state.lock().unwrap();
        let n = state.chunk.min(state.pending.len());
        Ok(state.pending.drain(..n).collect())
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.state.lock().unwrap().pending.clear();
        Ok(())
    }
}

/// A port that accepts writes and never answers.
#[derive(Clone, Default)]
pub struct SilentDevice {
    written: Arc<Mutex<Vec<u8>>>,
}

impl SilentDevice {
    pub fn written(&self) -> Vec<u8> {
        self.written.lock().unwrap().clone()
    }
}

impl DeviceInterface for SilentDevice {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.written.lock().unwrap().extend_from_slice(data);
        Ok(())
    }

    fn receive(&mut self) -> io::Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn clear_input(&mut self) -> io::Result<()> {
        Ok(())
    }
}
