use serialport::{SerialPortInfo, SerialPortType};
use tracing::{debug, info};

use crate::constants::{USB_PRODUCT_ID, USB_VENDOR_ID};
use crate::error::{SwitchError, SwitchResult};

/// Locate the serial port the switch enumerated as, by USB vendor/product id.
pub fn find_device_port() -> SwitchResult<String> {
    let ports = serialport::available_ports().map_err(|e| {
        SwitchError::DeviceNotFound(format!("Could not get available ports. Err {:?}", e))
    })?;

    match matching_port(&ports) {
        Some(port) => {
            info!("Found JTAG Switch at {}", port);
            Ok(port)
        }
        None => Err(SwitchError::DeviceNotFound(format!(
            "Looked at {} serial ports; none matches USB id {:04x}:{:04x}. \
            Ensure the device is connected via USB or specify a serial port.",
            ports.len(),
            USB_VENDOR_ID,
            USB_PRODUCT_ID
        ))),
    }
}

pub(crate) fn matching_port(ports: &[SerialPortInfo]) -> Option<String> {
    ports.iter().find_map(|port| match &port.port_type {
        SerialPortType::UsbPort(info) if info.vid == USB_VENDOR_ID && info.pid == USB_PRODUCT_ID => {
            Some(port.port_name.clone())
        }
        SerialPortType::UsbPort(info) => {
            debug!(
                "Skipping {} ({:04x}:{:04x})",
                port.port_name, info.vid, info.pid
            );
            None
        }
        _ => None,
    })
}
