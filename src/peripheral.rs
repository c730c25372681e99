//! RN4020 handle and builder.
//!
//! The [`Rn4020Builder`] configures the command channel. Opening a handle:
//! 1. Wraps the transport in a [`CommandChannel`]
//! 2. Discards whatever the module printed before we attached
//! 3. Sends `V` and waits for the version line, aligning the framing
//!
//! # Example
//!
//! ```
//! use rn4020_client::{ModuleConfig, Rn4020};
//! use rn4020_client::transport::MemoryTransport;
//!
//! let mut transport = MemoryTransport::new();
//! transport.push_empty_polls(1).push_line("MCHP BTLE v1.33.4 BEC");
//! // `setup` discards stale input up to the first empty poll.
//! transport.push_empty_polls(1);
//! for _ in 0..3 {
//!     transport.push_line("AOK");
//! }
//!
//! let mut module = Rn4020::builder().open(transport).unwrap();
//! assert_eq!(module.version().text(), "MCHP BTLE v1.33.4 BEC");
//!
//! module.setup(&ModuleConfig::default()).unwrap();
//! ```

use std::time::Duration;

use crate::channel::{ChannelConfig, CommandChannel};
use crate::clock::{Clock, SystemClock};
use crate::config::ModuleConfig;
use crate::error::Result;
use crate::protocol::{BleUuid, Command, Line};
use crate::transport::Transport;
use crate::translator;

/// Builder for opening an [`Rn4020`] handle.
#[derive(Debug, Clone, Default)]
pub struct Rn4020Builder {
    channel_config: ChannelConfig,
}

impl Rn4020Builder {
    /// Create a new builder with default channel settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response timeout.
    ///
    /// Default: 2 seconds
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.channel_config.response_timeout = Some(timeout);
        self
    }

    /// Wait for responses indefinitely.
    pub fn no_response_timeout(mut self) -> Self {
        self.channel_config.response_timeout = None;
        self
    }

    /// Sleep between empty polls instead of spinning.
    ///
    /// Default: zero (busy poll)
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.channel_config.poll_interval = interval;
        self
    }

    /// Set the number of bytes requested per transport read.
    ///
    /// Default: 256
    pub fn read_chunk_size(mut self, size: usize) -> Self {
        self.channel_config.read_chunk_size = size;
        self
    }

    /// Open a handle over `transport`.
    pub fn open<T: Transport>(self, transport: T) -> Result<Rn4020<T>> {
        self.open_with_clock(transport, SystemClock)
    }

    /// Open a handle over `transport` using `clock` for deadlines.
    pub fn open_with_clock<T: Transport, C: Clock>(
        self,
        transport: T,
        clock: C,
    ) -> Result<Rn4020<T, C>> {
        let mut channel = CommandChannel::with_clock(transport, self.channel_config, clock);

        channel.reset_input()?;
        let version = channel.execute(&Command::Version)?;
        tracing::info!("Module answered sync probe: {}", version);

        Ok(Rn4020 {
            channel,
            version,
        })
    }

    /// Open the serial port at `path` (115200 baud) and sync with the module.
    #[cfg(feature = "serial")]
    pub fn open_serial(self, path: &str) -> Result<Rn4020<crate::transport::SerialTransport>> {
        let transport = crate::transport::SerialTransport::open(path)?;
        self.open(transport)
    }
}

/// An RN4020 module in peripheral role.
///
/// Owns its transport; dropping the handle releases the port.
#[derive(Debug)]
pub struct Rn4020<T, C = SystemClock> {
    channel: CommandChannel<T, C>,
    version: Line,
}

impl Rn4020<()> {
    /// Create a new builder.
    pub fn builder() -> Rn4020Builder {
        Rn4020Builder::new()
    }
}

impl<T: Transport, C: Clock> Rn4020<T, C> {
    /// Response to the startup sync probe.
    pub fn version(&self) -> &Line {
        &self.version
    }

    /// Apply `config` and reboot the module. See [`translator::setup`].
    pub fn setup(&mut self, config: &ModuleConfig) -> Result<Vec<Line>> {
        translator::setup(&mut self.channel, config)
    }

    /// Read a characteristic; the response is its value as hex.
    pub fn read_characteristic(&mut self, uuid: impl Into<BleUuid>) -> Result<Line> {
        translator::read_characteristic(&mut self.channel, uuid.into())
    }

    /// Read a characteristic and decode its value.
    pub fn read_characteristic_bytes(&mut self, uuid: impl Into<BleUuid>) -> Result<Vec<u8>> {
        translator::read_characteristic_bytes(&mut self.channel, uuid.into())
    }

    /// Write a hex string to a characteristic.
    pub fn write_characteristic(
        &mut self,
        uuid: impl Into<BleUuid>,
        hex_data: &str,
    ) -> Result<Line> {
        translator::write_characteristic(&mut self.channel, uuid.into(), hex_data)
    }

    /// Write raw bytes to a characteristic.
    pub fn write_characteristic_bytes(
        &mut self,
        uuid: impl Into<BleUuid>,
        data: &[u8],
    ) -> Result<Line> {
        translator::write_characteristic_bytes(&mut self.channel, uuid.into(), data)
    }

    /// Lines the module sent on its own (connection events, writes from the
    /// central), without waiting.
    pub fn drain_lines(&mut self) -> Result<Vec<Line>> {
        self.channel.drain_all()
    }

    /// Get a mutable reference to the command channel.
    pub fn channel_mut(&mut self) -> &mut CommandChannel<T, C> {
        &mut self.channel
    }

    /// Consume the handle, returning the command channel.
    pub fn into_channel(self) -> CommandChannel<T, C> {
        self.channel
    }
}
