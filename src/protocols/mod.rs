use crate::error::{SwitchError, SwitchResult};
use crate::result::CommandResult;

pub mod parse;
pub mod rest;
pub mod serial;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    Serial,
    Rest,
}

/// Command set shared by every way of talking to the switch. Operations a
/// transport cannot perform fail with [`SwitchError::NotSupported`] before
/// touching the device.
pub trait Transport: Send {
    fn kind(&self) -> TransportKind;

    /// Open the underlying connection and make it ready for commands
    fn connect(&mut self) -> SwitchResult<()>;

    /// Release the connection. Calling it again is a no-op.
    fn disconnect(&mut self);

    /// Drive select line `line` to `value`
    fn select(&mut self, line: u8, value: u8) -> SwitchResult<CommandResult>;
    fn toggle(&mut self, line: u8) -> SwitchResult<CommandResult>;
    fn status(&mut self) -> SwitchResult<CommandResult>;

    fn net_status(&mut self) -> SwitchResult<CommandResult>;
    fn net_config(&mut self) -> SwitchResult<CommandResult>;
    fn net_set_dhcp(&mut self) -> SwitchResult<CommandResult>;
    fn net_set_static(
        &mut self,
        ip: &str,
        netmask: &str,
        gateway: &str,
    ) -> SwitchResult<CommandResult>;
    fn net_restart(&mut self) -> SwitchResult<CommandResult>;
    fn net_save(&mut self) -> SwitchResult<CommandResult>;

    fn device_info(&mut self) -> SwitchResult<CommandResult>;
    fn health_check(&mut self) -> SwitchResult<CommandResult>;
}

pub(crate) fn check_line(line: u8) -> SwitchResult<()> {
    if line > 1 {
        return Err(SwitchError::InvalidArgument(format!(
            "select line must be 0 or 1, got {}",
            line
        )));
    }
    Ok(())
}

pub(crate) fn check_value(value: u8) -> SwitchResult<()> {
    if value > 1 {
        return Err(SwitchError::InvalidArgument(format!(
            "select value must be 0 or 1, got {}",
            value
        )));
    }
    Ok(())
}
