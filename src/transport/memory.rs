//! In-memory transport with scripted input.
//!
//! Each queued chunk is returned by exactly one `read_available` call, so a
//! test can model how the module's output is fragmented across polls. An
//! empty chunk models a poll where nothing has arrived yet. Once the script
//! runs out every read returns 0 bytes.
//!
//! # Example
//!
//! ```
//! use rn4020_client::transport::{MemoryTransport, Transport};
//!
//! let mut transport = MemoryTransport::new();
//! transport.push_empty_polls(2);
//! transport.push_chunk(b"AOK\r\n");
//!
//! let mut buf = [0u8; 16];
//! assert_eq!(transport.read_available(&mut buf).unwrap(), 0);
//! assert_eq!(transport.read_available(&mut buf).unwrap(), 0);
//! assert_eq!(transport.read_available(&mut buf).unwrap(), 5);
//! ```

use std::collections::VecDeque;
use std::io;

use bytes::{Buf, Bytes};

use super::Transport;

/// Scripted byte source plus a capture of everything written.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    /// Chunks to hand out, one per read.
    script: VecDeque<Bytes>,
    /// Every byte written, in order.
    written: Vec<u8>,
    /// Error kind returned by the next read, once.
    fail_next_read: Option<io::ErrorKind>,
    /// Error kind returned by every write.
    fail_writes: Option<io::ErrorKind>,
    /// Number of read calls made.
    reads: usize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes to be returned by one future read.
    pub fn push_chunk(&mut self, data: &[u8]) -> &mut Self {
        self.script.push_back(Bytes::copy_from_slice(data));
        self
    }

    /// Queue `count` reads that return nothing.
    pub fn push_empty_polls(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.script.push_back(Bytes::new());
        }
        self
    }

    /// Queue a full response line, terminator included.
    pub fn push_line(&mut self, line: &str) -> &mut Self {
        let mut data = line.as_bytes().to_vec();
        data.extend_from_slice(crate::protocol::LINE_TERMINATOR);
        self.push_chunk(&data)
    }

    /// Make the next read fail with `kind`.
    pub fn fail_next_read(&mut self, kind: io::ErrorKind) -> &mut Self {
        self.fail_next_read = Some(kind);
        self
    }

    /// Make every write fail with `kind`.
    pub fn fail_writes(&mut self, kind: io::ErrorKind) -> &mut Self {
        self.fail_writes = Some(kind);
        self
    }

    /// Everything written so far.
    pub fn written(&self) -> &[u8] {
        &self.written
    }

    /// Written bytes split into `\n`-terminated command lines.
    pub fn written_lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.written)
            .split_terminator('\n')
            .map(str::to_string)
            .collect()
    }

    /// Forget captured writes.
    pub fn clear_written(&mut self) {
        self.written.clear();
    }

    /// Chunks not yet read.
    pub fn pending_chunks(&self) -> usize {
        self.script.len()
    }

    /// Number of `read_available` calls so far.
    pub fn read_count(&self) -> usize {
        self.reads
    }
}

impl Transport for MemoryTransport {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;

        if let Some(kind) = self.fail_next_read.take() {
            return Err(io::Error::new(kind, "scripted read failure"));
        }

        let Some(chunk) = self.script.front_mut() else {
            return Ok(0);
        };

        // Chunks larger than the caller's buffer are handed out over
        // several reads.
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        chunk.advance(n);
        if chunk.is_empty() {
            self.script.pop_front();
        }
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        if let Some(kind) = self.fail_writes {
            return Err(io::Error::new(kind, "scripted write failure"));
        }
        self.written.extend_from_slice(data);
        Ok(())
    }
}
