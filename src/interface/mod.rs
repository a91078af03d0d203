pub mod serialport;

use std::io;

/// Raw byte stream to the device shell.
///
/// Implementations never block longer than their own read timeout; the
/// session engine does all deadline tracking on top of this.
pub trait DeviceInterface {
    /// Write all bytes to the device
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Return whatever bytes are currently available, possibly none
    fn receive(&mut self) -> io::Result<Vec<u8>>;

    /// Discard anything pending in the receive buffer
    fn clear_input(&mut self) -> io::Result<()>;
}
