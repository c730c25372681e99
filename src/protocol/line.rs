//! Protocol line with typed accessors.
//!
//! A [`Line`] is one `\r\n`-terminated record received from the module,
//! with the terminator stripped. Uses `bytes::Bytes` so lines split off the
//! framer's buffer without copying.
//!
//! # Example
//!
//! ```
//! use rn4020_client::protocol::Line;
//!
//! let line = Line::from_static(b"AOK");
//! assert!(line.is_ack());
//! assert_eq!(line.text(), "AOK");
//! ```

use std::borrow::Cow;
use std::fmt;

use bytes::Bytes;

use crate::error::{Result, Rn4020Error};

/// Acknowledgment sent by the module for an accepted command.
pub const ACK: &str = "AOK";

/// Response sent by the module for a rejected command.
pub const ERR: &str = "ERR";

/// A complete protocol line, terminator excluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    bytes: Bytes,
}

impl Line {
    /// Create a line from already-split bytes.
    pub fn new(bytes: Bytes) -> Self {
        Self { bytes }
    }

    /// Create a line from static bytes.
    pub fn from_static(bytes: &'static [u8]) -> Self {
        Self {
            bytes: Bytes::from_static(bytes),
        }
    }

    /// Raw line bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Line contents as text. Invalid UTF-8 is replaced, not rejected.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Module accepted the command.
    pub fn is_ack(&self) -> bool {
        self.bytes.as_ref() == ACK.as_bytes()
    }

    /// Module rejected the command.
    pub fn is_error(&self) -> bool {
        self.bytes.as_ref() == ERR.as_bytes()
    }

    /// Decode the line as a hex string, as returned by characteristic reads.
    pub fn decode_hex(&self) -> Result<Vec<u8>> {
        hex::decode(self.bytes.as_ref()).map_err(|e| {
            Rn4020Error::Protocol(format!("Expected hex data, got `{}`: {}", self.text(), e))
        })
    }

    /// Consume the line, returning the underlying bytes.
    pub fn into_bytes(self) -> Bytes {
        self.bytes
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl From<&'static str> for Line {
    fn from(s: &'static str) -> Self {
        Self::from_static(s.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_and_error() {
        assert!(Line::from("AOK").is_ack());
        assert!(!Line::from("AOK").is_error());
        assert!(Line::from("ERR").is_error());
        assert!(!Line::from("CMD").is_ack());
    }

    #[test]
    fn test_text_is_lossy() {
        let line = Line::new(Bytes::from_static(b"ok\xff"));
        assert_eq!(line.text(), "ok\u{fffd}");
        assert_eq!(line.len(), 3);
    }

    #[test]
    fn test_decode_hex() {
        assert_eq!(Line::from("0A1b").decode_hex().unwrap(), vec![0x0A, 0x1B]);

        let err = Line::from("ERR").decode_hex().unwrap_err();
        assert!(err.to_string().contains("Expected hex data"));
    }

    #[test]
    fn test_empty_line() {
        let line = Line::from("");
        assert!(line.is_empty());
        assert_eq!(line.to_string(), "");
    }
}
