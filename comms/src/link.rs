use std::time::Duration;

use crate::Result;

/// Connection to a controller board. At most one connection is open per
/// link; every operation other than enumeration requires one.
pub trait DeviceLink {
    /// Serial ports whose USB descriptor matches `vid:pid`.
    fn enumerate_rs232(&self, vid: u16, pid: u16) -> Result<Vec<String>>;

    /// HID device paths matching `vid:pid`.
    fn enumerate_hid(&self, vid: u16, pid: u16) -> Result<Vec<String>>;

    /// Opens a serial connection. With `resync` the link discards any
    /// partial frame left on the line before the first command.
    fn open_com_port(&mut self, port: &str, timeout: Duration, baud: u32, resync: bool) -> Result<()>;

    fn open_hid(&mut self, path: &str, timeout: Duration) -> Result<()>;

    fn set_timeout(&mut self, timeout: Duration) -> Result<()>;

    fn timeout(&self) -> Result<Duration>;

    fn close(&mut self) -> Result<()>;

    /// Reads `len` bytes of flash starting at `offset`.
    fn flash_read(&mut self, offset: u32, len: usize) -> Result<Vec<u8>>;

    /// Writes `buf` to flash starting at `offset`.
    fn flash_write(&mut self, buf: &[u8], offset: u32) -> Result<()>;
}
