//! Command channel: one command out, one response line back.
//!
//! The module answers every command with exactly one line. The channel
//! writes a command, then polls the transport and the [`LineFramer`] until a
//! line appears. It holds at most one outstanding command:
//!
//! ```text
//! Idle ──send──► AwaitingResponse ──line / timeout / error──► Idle
//! ```
//!
//! The response is simply the next line to arrive after the command was
//! written. If the module may have emitted unsolicited lines (connection
//! notifications and the like), call [`CommandChannel::reset_input`] first.
//!
//! Waiting can be driven two ways:
//! - [`CommandChannel::send_and_wait`] polls until the line arrives or the
//!   configured deadline passes.
//! - [`CommandChannel::send`] + [`CommandChannel::poll_response`] lets an
//!   outer scheduler run one non-blocking step at a time with its own clock.
//!
//! # Example
//!
//! ```
//! use rn4020_client::channel::CommandChannel;
//! use rn4020_client::transport::MemoryTransport;
//!
//! let mut transport = MemoryTransport::new();
//! transport.push_empty_polls(3).push_line("AOK");
//!
//! let mut channel = CommandChannel::new(transport);
//! let response = channel.send_and_wait("SR,20006000").unwrap();
//!
//! assert!(response.is_ack());
//! assert_eq!(channel.transport().written(), b"SR,20006000\n");
//! ```

use std::time::{Duration, Instant};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, Rn4020Error};
use crate::protocol::{Command, Line, LineFramer, COMMAND_TERMINATOR, DEFAULT_CAPACITY};
use crate::transport::Transport;

/// Default time to wait for a response line.
pub const DEFAULT_RESPONSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Default number of bytes requested per transport read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 256;

/// Configuration for a command channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Deadline for a response after the command is written.
    /// `None` waits forever.
    pub response_timeout: Option<Duration>,
    /// Sleep between empty polls. Zero busy-polls.
    pub poll_interval: Duration,
    /// Bytes requested per transport read.
    pub read_chunk_size: usize,
    /// Initial capacity of the line buffer.
    pub initial_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            response_timeout: Some(DEFAULT_RESPONSE_TIMEOUT),
            poll_interval: Duration::ZERO,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
            initial_capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Observable channel state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Idle,
    AwaitingResponse,
}

/// The command currently waiting for its response.
#[derive(Debug)]
struct Pending {
    command: String,
    sent_at: Instant,
    deadline: Option<Instant>,
}

/// Synchronous command/response channel over a non-blocking transport.
pub struct CommandChannel<T, C = SystemClock> {
    transport: T,
    clock: C,
    framer: LineFramer,
    /// Read buffer handed to the transport.
    scratch: Vec<u8>,
    config: ChannelConfig,
    pending: Option<Pending>,
}

impl<T: Transport> CommandChannel<T> {
    /// Create a channel with default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ChannelConfig::default())
    }

    /// Create a channel with custom configuration.
    pub fn with_config(transport: T, config: ChannelConfig) -> Self {
        Self::with_clock(transport, config, SystemClock)
    }
}

impl<T: Transport, C: Clock> CommandChannel<T, C> {
    /// Create a channel with custom configuration and time source.
    pub fn with_clock(transport: T, config: ChannelConfig, clock: C) -> Self {
        Self {
            transport,
            clock,
            framer: LineFramer::with_capacity(config.initial_capacity),
            scratch: vec![0u8; config.read_chunk_size.max(1)],
            config,
            pending: None,
        }
    }

    pub fn state(&self) -> ChannelState {
        if self.pending.is_some() {
            ChannelState::AwaitingResponse
        } else {
            ChannelState::Idle
        }
    }

    pub fn config(&self) -> &ChannelConfig {
        &self.config
    }

    /// Number of received bytes not yet returned as lines.
    pub fn buffered_len(&self) -> usize {
        self.framer.len()
    }

    /// Write `command` and enter `AwaitingResponse`.
    ///
    /// Fails with [`Rn4020Error::InvalidState`] if a command is already
    /// outstanding.
    pub fn send(&mut self, command: &str) -> Result<()> {
        if let Some(pending) = &self.pending {
            return Err(Rn4020Error::InvalidState(format!(
                "cannot send `{}` while `{}` awaits its response",
                command, pending.command
            )));
        }

        let mut line = Vec::with_capacity(command.len() + COMMAND_TERMINATOR.len());
        line.extend_from_slice(command.as_bytes());
        line.extend_from_slice(COMMAND_TERMINATOR);

        tracing::debug!(">{}", command);
        self.transport.write_all(&line)?;

        let sent_at = self.clock.now();
        self.pending = Some(Pending {
            command: command.to_string(),
            sent_at,
            deadline: self.config.response_timeout.map(|t| sent_at + t),
        });
        Ok(())
    }

    /// Run one non-blocking step of the response wait.
    ///
    /// Reads whatever the transport has, then tries to extract a line.
    /// Returns `Ok(None)` if the caller should poll again. Fails with
    /// [`Rn4020Error::Timeout`] once `now` reaches the deadline without a
    /// line. The channel is `Idle` again after a line, a timeout or an
    /// error.
    pub fn poll_response(&mut self, now: Instant) -> Result<Option<Line>> {
        let deadline = match &self.pending {
            Some(pending) => pending.deadline,
            None => {
                return Err(Rn4020Error::InvalidState(
                    "no command awaiting a response".to_string(),
                ))
            }
        };

        if let Err(e) = self.fill() {
            self.pending = None;
            return Err(e);
        }

        if let Some(line) = self.framer.try_extract_line() {
            return Ok(Some(self.complete(line)));
        }

        if matches!(deadline, Some(d) if now >= d) {
            if let Some(pending) = self.pending.take() {
                let waited = now.saturating_duration_since(pending.sent_at);
                tracing::warn!("No response to `{}` after {:?}", pending.command, waited);
                return Err(Rn4020Error::Timeout {
                    command: pending.command,
                    waited,
                });
            }
        }

        Ok(None)
    }

    /// Send `command` and wait for its response line.
    pub fn send_and_wait(&mut self, command: &str) -> Result<Line> {
        self.send(command)?;

        loop {
            let now = self.clock.now();
            if let Some(line) = self.poll_response(now)? {
                return Ok(line);
            }

            if self.config.poll_interval.is_zero() {
                std::hint::spin_loop();
            } else {
                std::thread::sleep(self.config.poll_interval);
            }
        }
    }

    /// Encode and send a typed command, then wait for its response.
    pub fn execute(&mut self, command: &Command) -> Result<Line> {
        self.send_and_wait(&command.encode())
    }

    /// Return every line available right now, without sending anything.
    ///
    /// Stops as soon as a read yields no bytes and no complete line is
    /// buffered. A trailing partial line stays buffered.
    pub fn drain_all(&mut self) -> Result<Vec<Line>> {
        if let Some(pending) = &self.pending {
            return Err(Rn4020Error::InvalidState(format!(
                "cannot drain while `{}` awaits its response",
                pending.command
            )));
        }

        let mut lines = Vec::new();
        loop {
            if let Some(line) = self.framer.try_extract_line() {
                tracing::debug!("<{}", line);
                lines.push(line);
                continue;
            }
            if self.fill()? == 0 {
                break;
            }
        }
        Ok(lines)
    }

    /// Drop buffered input and whatever the transport has pending.
    ///
    /// An outstanding command is abandoned and the channel returns to
    /// `Idle`.
    pub fn reset_input(&mut self) -> Result<()> {
        if let Some(pending) = self.pending.take() {
            tracing::warn!("Abandoning `{}` without a response", pending.command);
        }

        self.framer.discard();
        self.transport.discard_input()?;
        Ok(())
    }

    /// Get a reference to the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Get a mutable reference to the transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the channel, returning the transport. Buffered input is lost.
    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Read once from the transport into the framer.
    fn fill(&mut self) -> Result<usize> {
        let n = self.transport.read_available(&mut self.scratch)?;
        if n > 0 {
            tracing::trace!("Read {} bytes", n);
            self.framer.append(&self.scratch[..n]);
        }
        Ok(n)
    }

    fn complete(&mut self, line: Line) -> Line {
        tracing::debug!("<{}", line);
        if let Some(pending) = self.pending.take() {
            if line.is_error() {
                tracing::warn!("Module rejected `{}`", pending.command);
            }
        }
        line
    }
}

impl<T, C> std::fmt::Debug for CommandChannel<T, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandChannel")
            .field("pending", &self.pending)
            .field("buffered", &self.framer.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
