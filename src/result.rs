use std::fmt;

use serde::Serialize;

/// Outcome of one device command, identical in shape for every transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult {
    pub success: bool,
    pub data: CommandData,
    pub message: String,
}

impl CommandResult {
    pub fn ok(data: CommandData, message: impl Into<String>) -> Self {
        CommandResult {
            success: true,
            data,
            message: message.into(),
        }
    }
}

/// Command specific payload. The variant is chosen by the command that
/// produced the result, never by the transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CommandData {
    Select(SelectData),
    Toggle(ToggleData),
    Status(StatusData),
    NetworkStatus(NetworkStatusData),
    NetworkConfig(NetworkConfigData),
    NetworkChange(NetworkChangeData),
    DeviceInfo(DeviceInfoData),
    Health(HealthData),
    Empty,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectData {
    pub line: u8,
    pub value: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select0: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select1: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToggleData {
    pub line: u8,
    pub state: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StatusData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select0: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select1: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
}

impl StatusData {
    /// Current level of select line `line`, if the device reported it.
    pub fn select(&self, line: u8) -> Option<u8> {
        match line {
            0 => self.select0,
            1 => self.select1,
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkStatusData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_up: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkConfigData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_netmask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_gateway: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NetworkChangeData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub netmask: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart_required: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DeviceInfoData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zephyr: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HealthData {
    pub status: Option<String>,
}

/// Loosely typed view of a single payload field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Str(s) => write!(f, "{}", s),
            FieldValue::Int(i) => write!(f, "{}", i),
            FieldValue::Bool(b) => write!(f, "{}", b),
        }
    }
}

#[derive(Default)]
struct Fields(Vec<(&'static str, FieldValue)>);

impl Fields {
    fn int(&mut self, name: &'static str, value: Option<impl Into<i64>>) -> &mut Self {
        if let Some(v) = value {
            self.0.push((name, FieldValue::Int(v.into())));
        }
        self
    }

    fn str(&mut self, name: &'static str, value: &Option<String>) -> &mut Self {
        if let Some(v) = value {
            self.0.push((name, FieldValue::Str(v.clone())));
        }
        self
    }

    fn bool(&mut self, name: &'static str, value: Option<bool>) -> &mut Self {
        if let Some(v) = value {
            self.0.push((name, FieldValue::Bool(v)));
        }
        self
    }
}

impl CommandData {
    /// Flatten the payload into ordered `(name, value)` pairs, skipping
    /// fields the device did not report.
    pub fn fields(&self) -> Vec<(&'static str, FieldValue)> {
        let mut fields = Fields::default();
        match self {
            CommandData::Select(d) => {
                fields
                    .int("line", Some(d.line))
                    .int("value", Some(d.value))
                    .int("select0", d.select0)
                    .int("select1", d.select1);
            }
            CommandData::Toggle(d) => {
                fields.int("line", Some(d.line)).int("state", d.state);
            }
            CommandData::Status(d) => {
                fields
                    .int("select0", d.select0)
                    .int("select1", d.select1)
                    .str("board", &d.board);
            }
            CommandData::NetworkStatus(d) => {
                fields
                    .str("mode", &d.mode)
                    .str("ip", &d.ip)
                    .str("netmask", &d.netmask)
                    .str("gateway", &d.gateway)
                    .str("mac", &d.mac)
                    .bool("link_up", d.link_up)
                    .int("uptime", d.uptime.and_then(|u| i64::try_from(u).ok()));
            }
            CommandData::NetworkConfig(d) => {
                fields
                    .str("mode", &d.mode)
                    .str("static_ip", &d.static_ip)
                    .str("static_netmask", &d.static_netmask)
                    .str("static_gateway", &d.static_gateway);
            }
            CommandData::NetworkChange(d) => {
                fields
                    .str("ip", &d.ip)
                    .str("netmask", &d.netmask)
                    .str("gateway", &d.gateway)
                    .bool("restart_required", d.restart_required);
            }
            CommandData::DeviceInfo(d) => {
                fields
                    .str("device", &d.device)
                    .str("version", &d.version)
                    .str("zephyr", &d.zephyr)
                    .str("board", &d.board);
            }
            CommandData::Health(d) => {
                fields.str("status", &d.status);
            }
            CommandData::Empty => {}
        }
        fields.0
    }

    /// Look up a single field by name.
    pub fn get(&self, name: &str) -> Option<FieldValue> {
        self.fields()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v)
    }
}
