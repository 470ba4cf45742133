use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use crate::error::{BoltError, BoltResult};

/// A duplex byte stream a [`Wire`] can run on: a real TCP socket in production, or (in tests)
/// an in-memory double. Generalizing over this trait instead of hardcoding `TcpStream` is what
/// lets session-level tests run deterministically against an in-memory double rather than a
/// live socket.
pub(crate) trait Transport: Read + Write {
    /// Shuts the transport down. A no-op on a double that has nothing to shut down.
    fn shutdown(&mut self) -> std::io::Result<()>;
}

impl Transport for TcpStream {
    fn shutdown(&mut self) -> std::io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// A buffered byte-stream facade over a connected, duplex transport.
///
/// `Wire` is the only layer in this crate that touches raw bytes in and out. Everything above
/// it (PackStream, chunking, messages, the session) works exclusively with in-memory buffers
/// and calls down to `write`/`send`/`read` at well-defined boundaries.
pub struct Wire<S: Transport = TcpStream> {
    stream: S,
    out_buf: Vec<u8>,
    closed: bool,
    broken: bool,
}

impl<S: Transport> std::fmt::Debug for Wire<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wire")
            .field("closed", &self.closed)
            .field("broken", &self.broken)
            .finish()
    }
}

impl Wire<TcpStream> {
    /// Connects to `addr` and returns an initialized, empty `Wire`.
    pub fn connect<A: ToSocketAddrs>(addr: A) -> BoltResult<Self> {
        let stream = TcpStream::connect(addr).map_err(BoltError::from)?;
        Ok(Self::from_stream(stream))
    }
}

impl<S: Transport> Wire<S> {
    /// Wraps an already-connected transport. Used by [`Wire::connect`] and, in tests, to wrap
    /// an in-memory double.
    pub(crate) fn from_stream(stream: S) -> Self {
        Self {
            stream,
            out_buf: Vec::new(),
            closed: false,
            broken: false,
        }
    }

    /// Accumulates `bytes` into the write buffer; nothing is sent until [`Wire::send`].
    pub fn write(&mut self, bytes: &[u8]) {
        self.out_buf.extend_from_slice(bytes);
    }

    /// Flushes the accumulated write buffer in one `write_all`, returning the number of bytes
    /// sent.
    pub fn send(&mut self) -> BoltResult<usize> {
        if self.out_buf.is_empty() {
            return Ok(0);
        }
        trace!(
            "TO THE WIRE: {} bytes |{}|",
            self.out_buf.len(),
            self.out_buf
                .iter()
                .take(10)
                .map(|b| format!("{b:02x} "))
                .collect::<String>()
        );
        let sent = self.out_buf.len();
        if let Err(e) = self.stream.write_all(&self.out_buf) {
            self.broken = true;
            return Err(e.into());
        }
        if let Err(e) = self.stream.flush() {
            self.broken = true;
            return Err(e.into());
        }
        self.out_buf.clear();
        Ok(sent)
    }

    /// Blockingly reads exactly `n` bytes. A short read (EOF before `n` bytes) fails with
    /// [`BoltError::Truncated`] and marks the wire broken.
    pub fn read(&mut self, n: usize) -> BoltResult<Vec<u8>> {
        let mut buf = vec![0_u8; n];
        if let Err(e) = self.stream.read_exact(&mut buf) {
            self.broken = true;
            return Err(if e.kind() == std::io::ErrorKind::UnexpectedEof {
                BoltError::Truncated {
                    what: "wire read",
                    expected: n,
                }
            } else {
                e.into()
            });
        }
        trace!(
            "FROM THE WIRE: {} bytes |{}|",
            buf.len(),
            buf.iter()
                .take(10)
                .map(|b| format!("{b:02x} "))
                .collect::<String>()
        );
        Ok(buf)
    }

    /// Shuts down the transport. Idempotent; safe to call on an already-closed or broken wire.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        // A broken transport may already be gone; shutdown errors are not actionable here.
        let _ = self.stream.shutdown();
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    pub fn broken(&self) -> bool {
        self.broken
    }
}

/// An in-memory double standing in for a real transport, used by this crate's own tests so that
/// session-level and end-to-end scenarios run deterministically, without a live socket.
#[cfg(test)]
pub(crate) mod mock {
    use super::Transport;
    use std::collections::VecDeque;
    use std::io::{Read, Write};

    /// Bytes pushed with [`MockStream::push_inbound`] are what subsequent `read` calls hand
    /// back, in order; everything written is captured in `outbound` so a test can inspect
    /// exactly what the code under test put on the wire.
    #[derive(Debug, Default)]
    pub(crate) struct MockStream {
        inbound: VecDeque<u8>,
        pub(crate) outbound: Vec<u8>,
    }

    impl MockStream {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn push_inbound(&mut self, bytes: &[u8]) {
            self.inbound.extend(bytes);
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf.len().min(self.inbound.len());
            for slot in buf.iter_mut().take(n) {
                *slot = self.inbound.pop_front().expect("n bounded by inbound.len() above");
            }
            Ok(n)
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.outbound.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Transport for MockStream {
        fn shutdown(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}

#[cfg(test)]
impl<S: Transport> Wire<S> {
    /// Test-only: consumes the `Wire` and returns its transport, so a test can inspect what was
    /// written to a [`mock::MockStream`].
    pub(crate) fn into_stream(self) -> S {
        self.stream
    }
}
