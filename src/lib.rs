//! # rn4020-client
//!
//! Driver for the Microchip RN4020 BLE module in peripheral role.
//!
//! The module speaks a line-oriented ASCII protocol over its UART: every
//! command is a `\n`-terminated line and is answered by exactly one
//! `\r\n`-terminated line.
//!
//! ## Architecture
//!
//! - **Protocol**: line framing over a persistent byte buffer, typed
//!   command encoding, named-flag bitmaps
//! - **Transport**: non-blocking byte source/sink (serial port, stream,
//!   in-memory)
//! - **Channel**: one outstanding command, response matched by arrival
//!   order, bounded wait
//! - **Translator**: declarative [`ModuleConfig`] to ordered command list
//!
//! ## Example
//!
//! ```ignore
//! use rn4020_client::{ModuleConfig, Rn4020};
//!
//! fn main() -> rn4020_client::Result<()> {
//!     let config = ModuleConfig::from_json_file("module.json")?;
//!
//!     let mut module = Rn4020::builder().open_serial("/dev/ttyUSB0")?;
//!     module.setup(&config)?;
//!
//!     let level = module.read_characteristic_bytes(0x2A19u16)?;
//!     println!("battery: {:?}", level);
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod clock;
pub mod config;
pub mod error;
pub mod protocol;
pub mod translator;
pub mod transport;

mod peripheral;

pub use channel::{ChannelConfig, ChannelState, CommandChannel};
pub use config::ModuleConfig;
pub use error::{Result, Rn4020Error};
pub use peripheral::{Rn4020, Rn4020Builder};
pub use protocol::{BleUuid, Command, Line};
