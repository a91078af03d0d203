use std::time::Duration;

use tracing::info;

use super::{Transport, TransportKind, check_line, check_value, parse};
use crate::constants::{
    COMMAND_TIMEOUT_MS, DEFAULT_BAUD_RATE, DEVICE_NAME, SERIAL_TIMEOUT_MS, SYNC_TIMEOUT_MS,
};
use crate::discovery::find_device_port;
use crate::error::{SwitchError, SwitchResult};
use crate::interface::DeviceInterface;
use crate::interface::serialport::SerialPortDevice;
use crate::result::{
    CommandData, CommandResult, DeviceInfoData, NetworkChangeData, NetworkConfigData,
    NetworkStatusData, SelectData, StatusData, ToggleData,
};
use crate::shell::{SessionError, ShellSession};

#[derive(Debug, Clone)]
pub struct SerialParams {
    /// Serial port path; looked up by USB id when absent
    pub port: Option<String>,
    pub baud: u32,
    /// Read timeout of the port itself
    pub read_timeout: Duration,
    pub sync_timeout: Duration,
    pub command_timeout: Duration,
}

impl Default for SerialParams {
    fn default() -> Self {
        SerialParams {
            port: None,
            baud: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(SERIAL_TIMEOUT_MS),
            sync_timeout: Duration::from_millis(SYNC_TIMEOUT_MS),
            command_timeout: Duration::from_millis(COMMAND_TIMEOUT_MS),
        }
    }
}

impl SerialParams {
    pub fn with_port(port: impl Into<String>) -> Self {
        SerialParams {
            port: Some(port.into()),
            ..Default::default()
        }
    }
}

/// Talks to the device through its `jtag:~$` shell.
pub struct SerialTransport {
    params: SerialParams,
    pending_device: Option<Box<dyn DeviceInterface + Send>>,
    shell: Option<ShellSession>,
}

impl SerialTransport {
    pub fn new(params: SerialParams) -> Self {
        SerialTransport {
            params,
            pending_device: None,
            shell: None,
        }
    }

    /// Use an already opened stream instead of opening `params.port`.
    /// The stream is consumed by the first `connect()`.
    pub fn with_device(device: Box<dyn DeviceInterface + Send>, params: SerialParams) -> Self {
        SerialTransport {
            params,
            pending_device: Some(device),
            shell: None,
        }
    }

    fn open_device(&mut self) -> SwitchResult<Box<dyn DeviceInterface + Send>> {
        if let Some(device) = self.pending_device.take() {
            return Ok(device);
        }

        let port = match &self.params.port {
            Some(port) => port.clone(),
            None => {
                let port = find_device_port()?;
                self.params.port = Some(port.clone());
                port
            }
        };

        let device = SerialPortDevice::open(&port, self.params.baud, self.params.read_timeout)
            .map_err(|e| {
                SwitchError::Connection(format!("Failed to open serial port {}: {}", port, e))
            })?;
        info!("Opened serial port {} at {} baud", port, self.params.baud);
        Ok(Box::new(device))
    }

    /// Run `command` and return its output, rejecting output that reports
    /// a failure.
    fn run(&mut self, command: &str) -> SwitchResult<Vec<String>> {
        let shell = self
            .shell
            .as_mut()
            .ok_or_else(|| SwitchError::Connection("not connected".to_string()))?;

        let output = shell
            .execute(command, self.params.command_timeout)
            .map_err(|e| match e {
                SessionError::Timeout { command, elapsed } => {
                    SwitchError::CommandTimeout { command, elapsed }
                }
                e => SwitchError::CommandExecution(format!("Command '{}' failed: {}", command, e)),
            })?;

        let text = output.join("\n");
        if parse::has_shell_error(&text) {
            return Err(SwitchError::CommandExecution(format!(
                "'{}' reported an error: {}",
                command,
                output.join(" ")
            )));
        }

        Ok(output)
    }

    fn first_line_or(output: &[String], fallback: String) -> String {
        output.first().cloned().unwrap_or(fallback)
    }
}

impl Transport for SerialTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Serial
    }

    fn connect(&mut self) -> SwitchResult<()> {
        self.disconnect();

        let device = self.open_device()?;
        let mut shell = ShellSession::new(device);
        if !shell.synchronize(self.params.sync_timeout) {
            shell.close();
            return Err(SwitchError::Connection(
                "Failed to synchronize with shell prompt".to_string(),
            ));
        }

        self.shell = Some(shell);
        Ok(())
    }

    fn disconnect(&mut self) {
        if let Some(mut shell) = self.shell.take() {
            shell.close();
            info!("Serial connection closed");
        }
    }

    fn select(&mut self, line: u8, value: u8) -> SwitchResult<CommandResult> {
        check_line(line)?;
        check_value(value)?;

        let output = self.run(&format!("jtag select{} {}", line, value))?;
        let message = Self::first_line_or(&output, format!("select{} set to {}", line, value));

        Ok(CommandResult::ok(
            CommandData::Select(SelectData {
                line,
                value,
                ..Default::default()
            }),
            message,
        ))
    }

    fn toggle(&mut self, line: u8) -> SwitchResult<CommandResult> {
        check_line(line)?;

        let output = self.run(&format!("jtag toggle{}", line))?;
        let state = output.first().and_then(|l| parse::toggled_to(l));
        let message = Self::first_line_or(&output, format!("select{} toggled", line));

        Ok(CommandResult::ok(
            CommandData::Toggle(ToggleData { line, state }),
            message,
        ))
    }

    fn status(&mut self) -> SwitchResult<CommandResult> {
        let output = self.run("jtag status")?;
        let text = output.join("\n");

        let data = StatusData {
            select0: parse::select(&text, 0),
            select1: parse::select(&text, 1),
            board: parse::board(&text),
        };
        Ok(CommandResult::ok(CommandData::Status(data), text))
    }

    fn net_status(&mut self) -> SwitchResult<CommandResult> {
        let output = self.run("net status")?;
        let text = output.join("\n");

        let data = NetworkStatusData {
            mode: parse::mode(&text),
            ip: parse::ip_address(&text),
            netmask: parse::netmask(&text),
            gateway: parse::gateway(&text),
            mac: parse::mac_address(&text),
            link_up: parse::link_up(&text),
            uptime: parse::uptime(&text),
        };
        Ok(CommandResult::ok(CommandData::NetworkStatus(data), text))
    }

    fn net_config(&mut self) -> SwitchResult<CommandResult> {
        let output = self.run("net config")?;
        let text = output.join("\n");

        let data = NetworkConfigData {
            mode: parse::mode(&text).map(|m| m.to_lowercase()),
            static_ip: parse::static_ip(&text),
            static_netmask: parse::static_netmask(&text),
            static_gateway: parse::static_gateway(&text),
        };
        Ok(CommandResult::ok(CommandData::NetworkConfig(data), text))
    }

    fn net_set_dhcp(&mut self) -> SwitchResult<CommandResult> {
        let output = self.run("net set dhcp")?;
        Ok(CommandResult::ok(CommandData::Empty, output.join("\n")))
    }

    fn net_set_static(
        &mut self,
        ip: &str,
        netmask: &str,
        gateway: &str,
    ) -> SwitchResult<CommandResult> {
        let output = self.run(&format!("net set static {} {} {}", ip, netmask, gateway))?;

        let data = NetworkChangeData {
            ip: Some(ip.to_string()),
            netmask: Some(netmask.to_string()),
            gateway: Some(gateway.to_string()),
            restart_required: None,
        };
        Ok(CommandResult::ok(
            CommandData::NetworkChange(data),
            output.join("\n"),
        ))
    }

    fn net_restart(&mut self) -> SwitchResult<CommandResult> {
        let output = self.run("net restart")?;
        Ok(CommandResult::ok(CommandData::Empty, output.join("\n")))
    }

    fn net_save(&mut self) -> SwitchResult<CommandResult> {
        let output = self.run("net save")?;
        Ok(CommandResult::ok(CommandData::Empty, output.join("\n")))
    }

    fn device_info(&mut self) -> SwitchResult<CommandResult> {
        // No dedicated shell command; the board name comes from `jtag status`
        let status = self.status()?;
        let board = match status.data {
            CommandData::Status(StatusData { board: Some(b), .. }) => b,
            _ => "unknown".to_string(),
        };

        let message = format!("Device: {}\nBoard: {}", DEVICE_NAME, board);
        let data = DeviceInfoData {
            device: Some(DEVICE_NAME.to_string()),
            board: Some(board),
            ..Default::default()
        };
        Ok(CommandResult::ok(CommandData::DeviceInfo(data), message))
    }

    fn health_check(&mut self) -> SwitchResult<CommandResult> {
        Err(SwitchError::NotSupported {
            command: "health",
            reason: "Only available via the REST API interface.",
        })
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.disconnect();
    }
}
