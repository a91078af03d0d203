use std::time::Duration;

use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Transport, TransportKind, check_line, check_value};
use crate::constants::{DEFAULT_HTTP_PORT, HTTP_CONNECT_TIMEOUT_MS, HTTP_READ_TIMEOUT_MS};
use crate::error::{SwitchError, SwitchResult};
use crate::result::{
    CommandData, CommandResult, DeviceInfoData, HealthData, NetworkChangeData, NetworkStatusData,
    SelectData, StatusData, ToggleData,
};

#[derive(Debug, Clone)]
pub struct RestParams {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
}

impl RestParams {
    pub fn new(host: impl Into<String>) -> Self {
        RestParams {
            host: host.into(),
            port: DEFAULT_HTTP_PORT,
            connect_timeout: Duration::from_millis(HTTP_CONNECT_TIMEOUT_MS),
            read_timeout: Duration::from_millis(HTTP_READ_TIMEOUT_MS),
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}/api", self.host, self.port)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HealthResponse {
    status: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StatusResponse {
    select0: Option<bool>,
    select1: Option<bool>,
    network: NetworkSection,
    system: SystemSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct NetworkSection {
    ip: Option<String>,
    netmask: Option<String>,
    gateway: Option<String>,
    mac: Option<String>,
    dhcp_enabled: Option<bool>,
    link_up: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SystemSection {
    uptime: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct InfoResponse {
    device: Option<String>,
    version: Option<String>,
    zephyr: Option<String>,
    board: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SelectResponse {
    success: Option<bool>,
    select0: Option<bool>,
    select1: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ToggleResponse {
    success: Option<bool>,
    state: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigResponse {
    success: Option<bool>,
    restart_required: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Serialize)]
struct SelectRequest {
    line: u8,
    connector: u8,
}

#[derive(Serialize)]
struct ToggleRequest {
    line: u8,
}

#[derive(Serialize)]
struct NetworkConfigRequest<'a> {
    mode: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    ip: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    netmask: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    gateway: Option<&'a str>,
}

fn level(state: Option<bool>) -> Option<u8> {
    state.map(u8::from)
}

fn show(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

/// Talks to the device's JSON API under `/api`.
pub struct RestTransport {
    params: RestParams,
    base_url: String,
    client: Option<Client>,
}

impl RestTransport {
    pub fn new(params: RestParams) -> Self {
        let base_url = params.base_url();
        RestTransport {
            params,
            base_url,
            client: None,
        }
    }

    fn client(&self) -> SwitchResult<&Client> {
        self.client
            .as_ref()
            .ok_or_else(|| SwitchError::Connection("not connected".to_string()))
    }

    fn get<T: DeserializeOwned>(&self, endpoint: &str) -> SwitchResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("GET {}", url);

        let response = self.client()?.get(&url).send().map_err(|e| {
            SwitchError::CommandExecution(format!("GET {} failed: {}", endpoint, e))
        })?;
        Self::decode("GET", endpoint, response)
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, endpoint: &str, body: &B) -> SwitchResult<T> {
        let url = format!("{}{}", self.base_url, endpoint);
        debug!("POST {}", url);

        let response = self
            .client()?
            .post(&url)
            .json(body)
            .send()
            .map_err(|e| {
                SwitchError::CommandExecution(format!("POST {} failed: {}", endpoint, e))
            })?;
        Self::decode("POST", endpoint, response)
    }

    fn decode<T: DeserializeOwned>(
        method: &str,
        endpoint: &str,
        response: Response,
    ) -> SwitchResult<T> {
        let status = response.status();
        let body = response.text().map_err(|e| {
            SwitchError::CommandExecution(format!("{} {} failed: {}", method, endpoint, e))
        })?;

        if !status.is_success() {
            let detail = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .unwrap_or(body);
            return Err(SwitchError::CommandExecution(format!(
                "{} {} failed: HTTP {}: {}",
                method, endpoint, status, detail
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            SwitchError::InvalidResponse(format!("{} {}: {}", method, endpoint, e))
        })
    }

    fn configure_network(&self, request: &NetworkConfigRequest) -> SwitchResult<ConfigResponse> {
        self.post("/network/config", request)
    }
}

impl Transport for RestTransport {
    fn kind(&self) -> TransportKind {
        TransportKind::Rest
    }

    fn connect(&mut self) -> SwitchResult<()> {
        let target = format!("{}:{}", self.params.host, self.params.port);
        let client = Client::builder()
            .connect_timeout(self.params.connect_timeout)
            .timeout(self.params.read_timeout)
            .build()
            .map_err(|e| SwitchError::Connection(format!("Failed to connect to {}: {}", target, e)))?;

        let response = client
            .get(format!("{}/health", self.base_url))
            .send()
            .and_then(Response::error_for_status)
            .map_err(|e| SwitchError::Connection(format!("Failed to connect to {}: {}", target, e)))?;
        debug!("Health probe answered {}", response.status());

        info!("Connected to {}", target);
        self.client = Some(client);
        Ok(())
    }

    fn disconnect(&mut self) {
        if self.client.take().is_some() {
            info!("HTTP session closed");
        }
    }

    fn select(&mut self, line: u8, value: u8) -> SwitchResult<CommandResult> {
        check_line(line)?;
        check_value(value)?;

        let result: SelectResponse = self.post(
            "/select",
            &SelectRequest {
                line,
                connector: value,
            },
        )?;

        Ok(CommandResult {
            success: result.success.unwrap_or(true),
            data: CommandData::Select(SelectData {
                line,
                value,
                select0: level(result.select0),
                select1: level(result.select1),
            }),
            message: format!("select{} set to {} (connector {})", line, value, value),
        })
    }

    fn toggle(&mut self, line: u8) -> SwitchResult<CommandResult> {
        check_line(line)?;

        let result: ToggleResponse = self.post("/toggle", &ToggleRequest { line })?;
        let state = level(result.state);
        let shown = state.unwrap_or(0);

        Ok(CommandResult {
            success: result.success.unwrap_or(true),
            data: CommandData::Toggle(ToggleData { line, state }),
            message: format!("select{} toggled to {} (connector {})", line, shown, shown),
        })
    }

    fn status(&mut self) -> SwitchResult<CommandResult> {
        let result: StatusResponse = self.get("/status")?;

        // Board name lives on /info; a failure there does not fail the status
        let board = match self.get::<InfoResponse>("/info") {
            Ok(info) => info.board.unwrap_or_else(|| "unknown".to_string()),
            Err(e) => {
                debug!("Board lookup failed: {}", e);
                "unknown".to_string()
            }
        };

        // An absent line reads as low
        let select0 = level(result.select0).unwrap_or(0);
        let select1 = level(result.select1).unwrap_or(0);
        let message = format!(
            "JTAG Switch Status:\n  select0: {s0} (connector {s0})\n  select1: {s1} (connector {s1})\n\nBoard: {board}",
            s0 = select0,
            s1 = select1,
            board = board
        );

        Ok(CommandResult::ok(
            CommandData::Status(StatusData {
                select0: Some(select0),
                select1: Some(select1),
                board: Some(board),
            }),
            message,
        ))
    }

    fn net_status(&mut self) -> SwitchResult<CommandResult> {
        let result: StatusResponse = self.get("/status")?;
        let network = result.network;

        let mode = if network.dhcp_enabled.unwrap_or(false) {
            "DHCP"
        } else {
            "Static IP"
        };
        let link_up = network.link_up.unwrap_or(false);
        let uptime = result.system.uptime.unwrap_or(0);

        let message = format!(
            "Network Status:\n  Mode: {}\n  IP Address: {}\n  Netmask: {}\n  Gateway: {}\n  MAC Address: {}\n  Link: {}\n  Uptime: {} seconds",
            mode,
            show(&network.ip),
            show(&network.netmask),
            show(&network.gateway),
            show(&network.mac),
            if link_up { "Up" } else { "Down" },
            uptime
        );

        Ok(CommandResult::ok(
            CommandData::NetworkStatus(NetworkStatusData {
                mode: Some(mode.to_string()),
                ip: network.ip,
                netmask: network.netmask,
                gateway: network.gateway,
                mac: network.mac,
                link_up: Some(link_up),
                uptime: Some(uptime),
            }),
            message,
        ))
    }

    fn net_config(&mut self) -> SwitchResult<CommandResult> {
        Err(SwitchError::NotSupported {
            command: "net config",
            reason: "Only available via the serial interface; use 'net status' instead.",
        })
    }

    fn net_set_dhcp(&mut self) -> SwitchResult<CommandResult> {
        let result = self.configure_network(&NetworkConfigRequest {
            mode: "dhcp",
            ip: None,
            netmask: None,
            gateway: None,
        })?;

        Ok(CommandResult {
            success: result.success.unwrap_or(true),
            data: CommandData::NetworkChange(NetworkChangeData {
                restart_required: Some(result.restart_required.unwrap_or(false)),
                ..Default::default()
            }),
            message: "Enabling DHCP mode...\nDHCP mode enabled successfully.\nNetwork will restart automatically.".to_string(),
        })
    }

    fn net_set_static(
        &mut self,
        ip: &str,
        netmask: &str,
        gateway: &str,
    ) -> SwitchResult<CommandResult> {
        let result = self.configure_network(&NetworkConfigRequest {
            mode: "static",
            ip: Some(ip),
            netmask: Some(netmask),
            gateway: Some(gateway),
        })?;

        Ok(CommandResult {
            success: result.success.unwrap_or(true),
            data: CommandData::NetworkChange(NetworkChangeData {
                ip: Some(ip.to_string()),
                netmask: Some(netmask.to_string()),
                gateway: Some(gateway.to_string()),
                restart_required: Some(result.restart_required.unwrap_or(false)),
            }),
            message: format!(
                "Setting static IP configuration...\n  IP Address: {}\n  Netmask: {}\n  Gateway: {}\nStatic IP configuration set successfully.\nNetwork will restart automatically.",
                ip, netmask, gateway
            ),
        })
    }

    fn net_restart(&mut self) -> SwitchResult<CommandResult> {
        Err(SwitchError::NotSupported {
            command: "net restart",
            reason: "The network restarts automatically after configuration changes via the REST API.",
        })
    }

    fn net_save(&mut self) -> SwitchResult<CommandResult> {
        Err(SwitchError::NotSupported {
            command: "net save",
            reason: "Configuration is saved automatically via the REST API.",
        })
    }

    fn device_info(&mut self) -> SwitchResult<CommandResult> {
        let info: InfoResponse = self.get("/info")?;

        let message = format!(
            "Device: {}\nVersion: {}\nZephyr: {}\nBoard: {}",
            show(&info.device),
            show(&info.version),
            show(&info.zephyr),
            show(&info.board)
        );

        Ok(CommandResult::ok(
            CommandData::DeviceInfo(DeviceInfoData {
                device: info.device,
                version: info.version,
                zephyr: info.zephyr,
                board: info.board,
            }),
            message,
        ))
    }

    fn health_check(&mut self) -> SwitchResult<CommandResult> {
        let result: HealthResponse = self.get("/health")?;

        Ok(CommandResult {
            success: result.status.as_deref() == Some("ok"),
            message: format!("Health: {}", show(&result.status)),
            data: CommandData::Health(HealthData {
                status: result.status,
            }),
        })
    }
}
