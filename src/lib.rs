//! Client for the JTAG Switch: two select lines routing a debug probe to one
//! of several connectors, plus a small network stack.
//!
//! The device is reachable over its USB serial shell or over its JSON REST
//! API. Both paths implement [`Transport`] and produce the same
//! [`CommandResult`] shape, so callers only pick the interface once:
//!
//! ```no_run
//! use jtagswitch::{InterfaceType, JtagSwitch, RestParams};
//!
//! let mut switch = JtagSwitch::new(InterfaceType::Rest(RestParams::new("192.168.1.100")))?;
//! let status = switch.with_session(|s| {
//!     s.select(0, 1)?;
//!     s.status()
//! })?;
//! println!("{}", status.message);
//! # Ok::<(), jtagswitch::error::SwitchError>(())
//! ```

use std::ops::{Deref, DerefMut};

use error::{SwitchError, SwitchResult};
pub use protocols::rest::{RestParams, RestTransport};
pub use protocols::serial::{SerialParams, SerialTransport};
pub use protocols::{Transport, TransportKind};
pub use result::*;

pub mod constants;
pub mod discovery;
pub mod error;
pub mod interface;
pub mod protocols;
pub mod result;
pub mod shell;

pub enum InterfaceType {
    Serial(SerialParams),
    Rest(RestParams),
}

pub struct JtagSwitch {
    transport: Box<dyn Transport>,
}

impl JtagSwitch {
    pub fn new(interface: InterfaceType) -> SwitchResult<Self> {
        let transport: Box<dyn Transport> = match interface {
            InterfaceType::Serial(params) => Box::new(SerialTransport::new(params)),
            InterfaceType::Rest(params) => {
                if params.host.trim().is_empty() {
                    return Err(SwitchError::InvalidArgument(
                        "a host is required for the REST interface".to_string(),
                    ));
                }
                Box::new(RestTransport::new(params))
            }
        };

        Ok(Self::from_transport(transport))
    }

    /// Serial interface on `port`, or on the auto-detected device when `None`
    pub fn serial(port: Option<String>) -> Self {
        let params = SerialParams {
            port,
            ..Default::default()
        };
        Self::from_transport(Box::new(SerialTransport::new(params)))
    }

    pub fn rest(host: &str, port: u16) -> SwitchResult<Self> {
        Self::new(InterfaceType::Rest(RestParams::new(host).port(port)))
    }

    pub fn from_transport(transport: Box<dyn Transport>) -> Self {
        JtagSwitch { transport }
    }

    pub fn kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// Connect manually. Prefer [`JtagSwitch::session`], which also
    /// disconnects.
    pub fn connect(&mut self) -> SwitchResult<()> {
        self.transport.connect()
    }

    pub fn disconnect(&mut self) {
        self.transport.disconnect()
    }

    /// Connect and return a guard that disconnects when dropped, including
    /// during unwinding.
    pub fn session(&mut self) -> SwitchResult<Session<'_>> {
        self.transport.connect()?;
        Ok(Session { client: self })
    }

    /// Run `f` inside a session; the connection is released whatever `f`
    /// returns.
    pub fn with_session<T>(
        &mut self,
        f: impl FnOnce(&mut JtagSwitch) -> SwitchResult<T>,
    ) -> SwitchResult<T> {
        let mut session = self.session()?;
        f(&mut session)
    }

    pub fn select(&mut self, line: u8, value: u8) -> SwitchResult<CommandResult> {
        self.transport.select(line, value)
    }

    pub fn toggle(&mut self, line: u8) -> SwitchResult<CommandResult> {
        self.transport.toggle(line)
    }

    pub fn status(&mut self) -> SwitchResult<CommandResult> {
        self.transport.status()
    }

    pub fn net_status(&mut self) -> SwitchResult<CommandResult> {
        self.transport.net_status()
    }

    /// Serial interface only
    pub fn net_config(&mut self) -> SwitchResult<CommandResult> {
        self.transport.net_config()
    }

    pub fn net_set_dhcp(&mut self) -> SwitchResult<CommandResult> {
        self.transport.net_set_dhcp()
    }

    pub fn net_set_static(
        &mut self,
        ip: &str,
        netmask: &str,
        gateway: &str,
    ) -> SwitchResult<CommandResult> {
        self.transport.net_set_static(ip, netmask, gateway)
    }

    /// Serial interface only
    pub fn net_restart(&mut self) -> SwitchResult<CommandResult> {
        self.transport.net_restart()
    }

    /// Serial interface only
    pub fn net_save(&mut self) -> SwitchResult<CommandResult> {
        self.transport.net_save()
    }

    pub fn device_info(&mut self) -> SwitchResult<CommandResult> {
        self.transport.device_info()
    }

    /// REST interface only
    pub fn health_check(&mut self) -> SwitchResult<CommandResult> {
        self.transport.health_check()
    }
}

/// A connected [`JtagSwitch`]; disconnects on drop.
pub struct Session<'a> {
    client: &'a mut JtagSwitch,
}

impl Deref for Session<'_> {
    type Target = JtagSwitch;

    fn deref(&self) -> &JtagSwitch {
        self.client
    }
}

impl DerefMut for Session<'_> {
    fn deref_mut(&mut self) -> &mut JtagSwitch {
        self.client
    }
}

impl Drop for Session<'_> {
    fn drop(&mut self) {
        self.client.disconnect();
    }
}
