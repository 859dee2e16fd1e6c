use std::time::Duration;

use tracing::debug;

use crate::{CommError, CommErrorKind, DeviceLink, Result};

pub const CODE_NOT_OPEN: i32 = -1;
pub const CODE_NO_DEVICE: i32 = -2;
pub const CODE_ALREADY_OPEN: i32 = -3;
pub const CODE_OUT_OF_RANGE: i32 = -4;
pub const CODE_BAD_ARGUMENT: i32 = -5;
pub const CODE_NO_MEMORY: i32 = -6;

#[derive(Clone, Debug, PartialEq, Eq)]
enum Transport {
    Rs232 { baud: u32 },
    Hid,
}

#[derive(Debug)]
struct Connection {
    endpoint: String,
    transport: Transport,
    timeout: Duration,
}

#[derive(Debug)]
struct Endpoint {
    vid: u16,
    pid: u16,
    path: String,
}

/// [`DeviceLink`] backed by an in-memory flash image instead of hardware.
#[derive(Debug, Default)]
pub struct LoopbackLink {
    serial: Vec<Endpoint>,
    hid: Vec<Endpoint>,
    flash: Vec<u8>,
    conn: Option<Connection>,
}

impl LoopbackLink {
    /// A link with `flash_len` bytes of erased (`0xFF`) flash and no
    /// endpoints.
    pub fn new(flash_len: usize) -> Self {
        Self {
            flash: vec![0xFF; flash_len],
            ..Self::default()
        }
    }

    pub fn with_serial_port(mut self, vid: u16, pid: u16, port: &str) -> Self {
        self.serial.push(Endpoint {
            vid,
            pid,
            path: port.to_string(),
        });
        self
    }

    pub fn with_hid_device(mut self, vid: u16, pid: u16, path: &str) -> Self {
        self.hid.push(Endpoint {
            vid,
            pid,
            path: path.to_string(),
        });
        self
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Endpoint of the open connection.
    pub fn endpoint(&self) -> Option<&str> {
        self.conn.as_ref().map(|c| c.endpoint.as_str())
    }

    /// Baud rate of the open serial connection.
    pub fn baud(&self) -> Option<u32> {
        match self.conn.as_ref()?.transport {
            Transport::Rs232 { baud } => Some(baud),
            Transport::Hid => None,
        }
    }

    pub fn flash(&self) -> &[u8] {
        &self.flash
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn
            .as_ref()
            .ok_or_else(|| CommError::new(CommErrorKind::Comm, CODE_NOT_OPEN, "no open connection"))
    }

    fn range(&self, offset: u32, len: usize) -> Result<std::ops::Range<usize>> {
        let start: usize = offset as usize;
        match start.checked_add(len) {
            Some(end) if end <= self.flash.len() => Ok(start..end),
            _ => Err(CommError::new(
                CommErrorKind::Board,
                CODE_OUT_OF_RANGE,
                format!("flash region {start}+{len} exceeds {} bytes", self.flash.len()),
            )),
        }
    }

    fn open(&mut self, endpoint: &str, transport: Transport, timeout: Duration) -> Result<()> {
        if let Some(conn) = &self.conn {
            return Err(CommError::new(
                CommErrorKind::Board,
                CODE_ALREADY_OPEN,
                format!("connection to {} already open", conn.endpoint),
            ));
        }
        check_timeout(timeout)?;
        debug!(endpoint, ?transport, ?timeout, "open");
        self.conn = Some(Connection {
            endpoint: endpoint.to_string(),
            transport,
            timeout,
        });
        Ok(())
    }
}

fn matching(endpoints: &[Endpoint], vid: u16, pid: u16) -> Vec<String> {
    endpoints
        .iter()
        .filter(|e| e.vid == vid && e.pid == pid)
        .map(|e| e.path.clone())
        .collect()
}

fn check_timeout(timeout: Duration) -> Result<()> {
    if timeout.is_zero() {
        return Err(CommError::new(CommErrorKind::Board, CODE_BAD_ARGUMENT, "timeout must be positive"));
    }
    Ok(())
}

impl DeviceLink for LoopbackLink {
    fn enumerate_rs232(&self, vid: u16, pid: u16) -> Result<Vec<String>> {
        Ok(matching(&self.serial, vid, pid))
    }

    fn enumerate_hid(&self, vid: u16, pid: u16) -> Result<Vec<String>> {
        Ok(matching(&self.hid, vid, pid))
    }

    fn open_com_port(&mut self, port: &str, timeout: Duration, baud: u32, resync: bool) -> Result<()> {
        if !self.serial.iter().any(|e| e.path == port) {
            return Err(CommError::new(CommErrorKind::Comm, CODE_NO_DEVICE, format!("no serial port {port}")));
        }
        if baud == 0 {
            return Err(CommError::new(CommErrorKind::Comm, CODE_BAD_ARGUMENT, "baud rate must be positive"));
        }
        self.open(port, Transport::Rs232 { baud }, timeout)?;
        if resync {
            debug!(port, "resync");
        }
        Ok(())
    }

    fn open_hid(&mut self, path: &str, timeout: Duration) -> Result<()> {
        if !self.hid.iter().any(|e| e.path == path) {
            return Err(CommError::new(CommErrorKind::Comm, CODE_NO_DEVICE, format!("no HID device {path}")));
        }
        self.open(path, Transport::Hid, timeout)
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<()> {
        check_timeout(timeout)?;
        self.conn()?;
        if let Some(conn) = self.conn.as_mut() {
            conn.timeout = timeout;
        }
        Ok(())
    }

    fn timeout(&self) -> Result<Duration> {
        Ok(self.conn()?.timeout)
    }

    fn close(&mut self) -> Result<()> {
        let conn: Connection = self
            .conn
            .take()
            .ok_or_else(|| CommError::new(CommErrorKind::Comm, CODE_NOT_OPEN, "no open connection"))?;
        debug!(endpoint = %conn.endpoint, "close");
        Ok(())
    }

    fn flash_read(&mut self, offset: u32, len: usize) -> Result<Vec<u8>> {
        self.conn()?;
        let range = self.range(offset, len)?;
        let mut out: Vec<u8> = Vec::new();
        out.try_reserve_exact(len)
            .map_err(|_| CommError::new(CommErrorKind::Memory, CODE_NO_MEMORY, format!("cannot allocate {len} bytes")))?;
        out.extend_from_slice(&self.flash[range]);
        Ok(out)
    }

    fn flash_write(&mut self, buf: &[u8], offset: u32) -> Result<()> {
        self.conn()?;
        let range = self.range(offset, buf.len())?;
        self.flash[range].copy_from_slice(buf);
        Ok(())
    }
}
