//! Adapter for non-blocking `Read + Write` streams.
//!
//! Useful for serial-over-TCP bridges (`ser2net` and friends) or any stream
//! put into non-blocking mode by its owner. Reads that would block or time
//! out count as "nothing available".

use std::io::{self, Read, Write};

use super::Transport;

/// Wraps a non-blocking stream as a [`Transport`].
#[derive(Debug)]
pub struct StreamTransport<S> {
    stream: S,
}

impl<S: Read + Write> StreamTransport<S> {
    /// Wrap `stream`. The caller is responsible for making it non-blocking.
    pub fn new(stream: S) -> Self {
        Self { stream }
    }

    /// Get a reference to the underlying stream.
    pub fn inner(&self) -> &S {
        &self.stream
    }

    /// Get a mutable reference to the underlying stream.
    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.stream
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

impl StreamTransport<std::net::TcpStream> {
    /// Connect to a TCP serial bridge and switch the socket to non-blocking.
    pub fn connect_tcp<A: std::net::ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let stream = std::net::TcpStream::connect(addr)?;
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(Self::new(stream))
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn read_available(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stream.read(buf) {
            Ok(0) if !buf.is_empty() => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream closed",
            )),
            Ok(n) => Ok(n),
            Err(e) if is_nothing_available(&e) => Ok(0),
            Err(e) => Err(e),
        }
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        let mut remaining = data;
        while !remaining.is_empty() {
            match self.stream.write(remaining) {
                Ok(0) => {
                    return Err(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "failed to write command",
                    ))
                }
                Ok(n) => remaining = &remaining[n..],
                // Non-blocking sockets can refuse a write while the kernel
                // buffer is full.
                Err(e) if is_nothing_available(&e) => std::thread::yield_now(),
                Err(e) => return Err(e),
            }
        }
        self.stream.flush()
    }
}

fn is_nothing_available(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stream that replays a list of read results.
    struct Scripted {
        reads: Vec<io::Result<Vec<u8>>>,
        written: Vec<u8>,
    }

    impl Read for Scripted {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.reads.is_empty() {
                return Err(io::ErrorKind::WouldBlock.into());
            }
            let data = self.reads.remove(0)?;
            buf[..data.len()].copy_from_slice(&data);
            Ok(data.len())
        }
    }

    impl Write for Scripted {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_would_block_reads_as_empty() {
        let mut t = StreamTransport::new(Scripted {
            reads: vec![
                Err(io::ErrorKind::WouldBlock.into()),
                Err(io::ErrorKind::TimedOut.into()),
                Ok(b"AOK\r\n".to_vec()),
            ],
            written: Vec::new(),
        });

        let mut buf = [0u8; 16];
        assert_eq!(t.read_available(&mut buf).unwrap(), 0);
        assert_eq!(t.read_available(&mut buf).unwrap(), 0);
        assert_eq!(t.read_available(&mut buf).unwrap(), 5);
        assert_eq!(t.read_available(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_closed_stream_is_an_error() {
        let mut t = StreamTransport::new(Scripted {
            reads: vec![Ok(Vec::new())],
            written: Vec::new(),
        });

        let mut buf = [0u8; 16];
        let err = t.read_available(&mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_other_errors_propagate() {
        let mut t = StreamTransport::new(Scripted {
            reads: vec![Err(io::ErrorKind::ConnectionReset.into())],
            written: Vec::new(),
        });

        let mut buf = [0u8; 16];
        assert!(t.read_available(&mut buf).is_err());
    }

    #[test]
    fn test_write_all() {
        let mut t = StreamTransport::new(Scripted {
            reads: Vec::new(),
            written: Vec::new(),
        });

        t.write_all(b"V\n").unwrap();
        assert_eq!(t.into_inner().written, b"V\n");
    }
}
