//! Serial port transport.
//!
//! The module's UART runs at 115200 baud, 8N1. The port is opened with a
//! zero timeout so reads never wait; `bytes_to_read` tells us how much can
//! be taken without blocking.
//!
//! The port is closed when the transport is dropped, whichever way its
//! owner goes out of scope.
//!
//! # Example
//!
//! ```ignore
//! use rn4020_client::transport::SerialTransport;
//!
//! let transport = SerialTransport::open("/dev/ttyUSB0")?;
//! ```

use std::io::{self, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};

use super::Transport;
use crate::error::Result;

/// Baud rate of the module's UART.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// A serial port opened for non-blocking use.
pub struct SerialTransport {
    port: Box<dyn SerialPort>,
}

impl SerialTransport {
    /// Open `path` at the module's default baud rate.
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with_baud(path, DEFAULT_BAUD_RATE)
    }

    /// Open `path` at `baud_rate`.
    pub fn open_with_baud(path: &str, baud_rate: u32) -> Result<Self> {
        let port = serialport::new(path, baud_rate)
            .timeout(Duration::ZERO)
            .open()?;
        tracing::debug!("Opened {} at {} baud", path, baud_rate);
        Ok(Self { port })
    }

    /// Wrap an already-configured port.
    pub fn from_port(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }

    /// Port name, if the platform reports one.
    pub fn name(&self) -> Option<String> {
        self.port.name()
    }
}

impl Transport for SerialTransport {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let waiting = self.port.bytes_to_read()? as usize;
        if waiting == 0 || buf.is_empty() {
            return Ok(0);
        }

        let want = waiting.min(buf.len());
        match self.port.read(&mut buf[..want]) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock) => {
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        Write::write_all(&mut self.port, data)?;
        self.port.flush()
    }

    fn discard_input(&mut self) -> io::Result<()> {
        self.port.clear(ClearBuffer::Input)?;
        Ok(())
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("port", &self.port.name())
            .finish()
    }
}
