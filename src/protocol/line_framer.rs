//! Line framer for accumulating partial reads.
//!
//! Uses `bytes::BytesMut` as a persistent buffer. Bytes are appended as they
//! arrive from the transport and complete `\r\n`-terminated lines are split
//! off the front. A trailing partial line, including a lone `\r` waiting for
//! its `\n`, stays buffered until a later append completes it.
//!
//! # Example
//!
//! ```
//! use rn4020_client::protocol::LineFramer;
//!
//! let mut framer = LineFramer::new();
//!
//! framer.append(b"AOK\r");
//! assert!(framer.try_extract_line().is_none());
//!
//! framer.append(b"\nCMD\r\n");
//! assert_eq!(framer.try_extract_line().unwrap().text(), "AOK");
//! assert_eq!(framer.try_extract_line().unwrap().text(), "CMD");
//! assert!(framer.try_extract_line().is_none());
//! ```

use bytes::BytesMut;

use super::line::Line;
use super::LINE_TERMINATOR;

/// Default initial buffer capacity.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Buffer for accumulating incoming bytes and extracting complete lines.
#[derive(Debug)]
pub struct LineFramer {
    /// Unconsumed bytes from transport reads.
    buffer: BytesMut,
}

impl LineFramer {
    /// Create a new framer with default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a new framer with a custom initial capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(capacity),
        }
    }

    /// Append newly arrived bytes to the buffer.
    pub fn append(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Try to split the first complete line off the buffer.
    ///
    /// Returns `None` and leaves the buffer untouched when no terminator is
    /// present.
    pub fn try_extract_line(&mut self) -> Option<Line> {
        let end = find_terminator(&self.buffer)?;

        let mut line = self.buffer.split_to(end + LINE_TERMINATOR.len());
        line.truncate(end);

        Some(Line::new(line.freeze()))
    }

    /// Append data and extract every complete line.
    ///
    /// Partial data stays buffered for the next push.
    pub fn push(&mut self, data: &[u8]) -> Vec<Line> {
        self.append(data);

        let mut lines = Vec::new();
        while let Some(line) = self.try_extract_line() {
            lines.push(line);
        }
        lines
    }

    /// Drop all buffered bytes, complete or not.
    pub fn discard(&mut self) {
        self.buffer.clear();
    }

    /// Get the number of buffered bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

fn find_terminator(buf: &[u8]) -> Option<usize> {
    buf.windows(LINE_TERMINATOR.len())
        .position(|w| w == LINE_TERMINATOR)
}
