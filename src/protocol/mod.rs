//! Protocol module - line framing and command wire format.
//!
//! This module implements the text protocol spoken by the module:
//! - Line framer for accumulating partial reads into `\r\n` lines
//! - Line struct with typed accessors
//! - Command encoding
//! - Named-flag bitmaps for services and characteristic properties

pub mod bitmap;
mod ble_uuid;
mod command;
mod line;
mod line_framer;

pub use bitmap::{BitmaskSpec, PROPERTIES, SERVICES};
pub use ble_uuid::{BleUuid, SHORT_UUID_MAX};
pub use command::{features, Command, InfoField};
pub use line::{Line, ACK, ERR};
pub use line_framer::{LineFramer, DEFAULT_CAPACITY};

/// Terminator of lines received from the module.
pub const LINE_TERMINATOR: &[u8] = b"\r\n";

/// Terminator appended to commands sent to the module.
pub const COMMAND_TERMINATOR: &[u8] = b"\n";
