//! Transport module - non-blocking byte source/sink.
//!
//! The channel only needs three things from the link to the module:
//! read whatever bytes are available right now (possibly none), write a
//! command, and throw away pending input. [`Transport`] captures exactly
//! that. Implementations:
//! - [`SerialTransport`]: a real serial port (feature `serial`)
//! - [`StreamTransport`]: any non-blocking `Read + Write` stream
//! - [`MemoryTransport`]: scripted reads and captured writes

mod memory;
#[cfg(feature = "serial")]
mod serial;
mod stream;

use std::io;

pub use memory::MemoryTransport;
#[cfg(feature = "serial")]
pub use serial::{SerialTransport, DEFAULT_BAUD_RATE};
pub use stream::StreamTransport;

/// Scratch size used when discarding input.
const DISCARD_CHUNK: usize = 256;

/// Most reads a default `discard_input` makes before giving up on a peer
/// that keeps sending.
pub const MAX_DISCARD_READS: usize = 64;

/// Non-blocking byte source/sink.
pub trait Transport {
    /// Read the bytes that are available now into `buf`.
    ///
    /// Returns `Ok(0)` when nothing is available; this is not an error and
    /// does not mean end of stream.
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `data`.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Throw away whatever input is currently available.
    ///
    /// The default reads and drops until a read returns nothing, at most
    /// [`MAX_DISCARD_READS`] times.
    fn discard_input(&mut self) -> io::Result<()> {
        let mut scratch = [0u8; DISCARD_CHUNK];
        for _ in 0..MAX_DISCARD_READS {
            if self.read_available(&mut scratch)? == 0 {
                return Ok(());
            }
        }
        tracing::debug!(
            "Input still arriving after {} discard reads",
            MAX_DISCARD_READS
        );
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_available(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_all(data)
    }

    fn discard_input(&mut self) -> io::Result<()> {
        (**self).discard_input()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read_available(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_all(data)
    }

    fn discard_input(&mut self) -> io::Result<()> {
        (**self).discard_input()
    }
}
