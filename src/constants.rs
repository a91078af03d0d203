pub const PROMPT: &str = "jtag:~$ ";
pub const DEVICE_NAME: &str = "JTAG Switch";

pub(crate) const USB_VENDOR_ID: u16 = 0x1209;
pub(crate) const USB_PRODUCT_ID: u16 = 0x4520;

pub(crate) const DEFAULT_BAUD_RATE: u32 = 115200;
pub(crate) const SERIAL_TIMEOUT_MS: u64 = 1000;
pub(crate) const SYNC_TIMEOUT_MS: u64 = 5000;
pub(crate) const COMMAND_TIMEOUT_MS: u64 = 2000;
pub(crate) const MAX_RESPONSE_SIZE: usize = 1024;

pub(crate) const SYNC_SETTLE_MS: u64 = 100;
pub(crate) const SYNC_IDLE_MS: u64 = 300;
pub(crate) const SYNC_RETRY_MS: u64 = 500;
pub(crate) const COMMAND_SETTLE_MS: u64 = 50;
pub(crate) const ECHO_TIMEOUT_MS: u64 = 500;
pub(crate) const POLL_INTERVAL_MS: u64 = 50;

pub(crate) const DEFAULT_HTTP_PORT: u16 = 80;
pub(crate) const HTTP_CONNECT_TIMEOUT_MS: u64 = 5000;
pub(crate) const HTTP_READ_TIMEOUT_MS: u64 = 10000;
