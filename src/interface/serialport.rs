use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::ClearBuffer;
use tracing::trace;

use super::DeviceInterface;
use crate::constants::MAX_RESPONSE_SIZE;

pub type BaudRate = u32;

/// Serial port device_interface layer
pub struct SerialPortDevice {
    serial_port: Box<dyn serialport::SerialPort>,
}

impl SerialPortDevice {
    pub fn open(
        port: &str,
        baud: BaudRate,
        timeout: Duration,
    ) -> Result<SerialPortDevice, serialport::Error> {
        let serial_port = serialport::new(port, baud).timeout(timeout).open()?;

        Ok(SerialPortDevice { serial_port })
    }
}

impl DeviceInterface for SerialPortDevice {
    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        self.serial_port.write_all(data)?;
        self.serial_port.flush()?;
        trace!("Sent bytes {:?}", data);
        Ok(())
    }

    fn receive(&mut self) -> io::Result<Vec<u8>> {
        let waiting = self.serial_port.bytes_to_read().map_err(io::Error::from)? as usize;
        if waiting == 0 {
            return Ok(Vec::new());
        }

        let mut buffer = vec![0; waiting.min(MAX_RESPONSE_SIZE)];
        let size = self
            .serial_port
            .read(&mut buffer)
            // Timeout error is fine, just continue
            .or_else(|e| {
                if e.kind() == io::ErrorKind::TimedOut {
                    Ok(0)
                } else {
                    Err(e)
                }
            })?;

        buffer.truncate(size);
        trace!("Received bytes {:?}", buffer);
        Ok(buffer)
    }

    fn clear_input(&mut self) -> io::Result<()> {
        self.serial_port
            .clear(ClearBuffer::Input)
            .map_err(io::Error::from)
    }
}
