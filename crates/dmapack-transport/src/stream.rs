use std::io::{self, ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use bytes::BytesMut;
use tracing::{trace, warn};

use crate::error::{Result, TransportError};
use crate::traits::{deadline_after, time_left, WordFifo};
use crate::wire::{decode_words, encode_words, WORD_SIZE};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// A byte stream whose blocking reads and writes can be bounded.
pub trait DeadlineStream: Read + Write {
    /// Apply a read timeout to subsequent reads.
    fn set_read_deadline(&self, timeout: Option<Duration>) -> io::Result<()>;

    /// Apply a write timeout to subsequent writes.
    fn set_write_deadline(&self, timeout: Option<Duration>) -> io::Result<()>;
}

#[cfg(unix)]
impl DeadlineStream for std::os::unix::net::UnixStream {
    fn set_read_deadline(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_read_timeout(timeout)
    }

    fn set_write_deadline(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_write_timeout(timeout)
    }
}

impl DeadlineStream for std::net::TcpStream {
    fn set_read_deadline(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_read_timeout(timeout)
    }

    fn set_write_deadline(&self, timeout: Option<Duration>) -> io::Result<()> {
        self.set_write_timeout(timeout)
    }
}

/// FIFO words carried over a byte stream, 8 big-endian bytes per word.
///
/// Handles partial reads internally. Bytes of an incomplete word received
/// before a timeout stay buffered and complete the next read.
///
/// A write that fails after some of its bytes went out leaves the device
/// mid-transfer. The FIFO reports [`TransportError::Desynchronized`] for that
/// write and [`TransportError::Closed`] for every later call.
pub struct StreamFifo<T> {
    inner: T,
    read_buf: BytesMut,
    write_buf: BytesMut,
    desynchronized: bool,
}

impl<T: DeadlineStream> StreamFifo<T> {
    /// Wrap a connected stream.
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            read_buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            write_buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            desynchronized: false,
        }
    }

    /// Complete words currently buffered and not yet returned.
    pub fn buffered_words(&self) -> usize {
        self.read_buf.len() / WORD_SIZE
    }

    /// True once a write failed part-way through a transfer.
    pub fn is_desynchronized(&self) -> bool {
        self.desynchronized
    }
}

impl<T: DeadlineStream> WordFifo for StreamFifo<T> {
    fn read_words(&mut self, count: usize, timeout: Duration) -> Result<Vec<u64>> {
        if self.desynchronized {
            return Err(TransportError::Closed);
        }

        let deadline = deadline_after(timeout);
        loop {
            if let Some(words) = decode_words(&mut self.read_buf, count) {
                trace!(count, "stream read");
                return Ok(words);
            }

            let remaining = time_left(deadline, timeout)?;
            self.inner.set_read_deadline(remaining)?;

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => return Err(TransportError::Timeout(timeout)),
                Err(err) => return Err(TransportError::Io(err)),
            };

            if read == 0 {
                return Err(TransportError::Closed);
            }

            self.read_buf.extend_from_slice(&chunk[..read]);
        }
    }

    fn write_words(&mut self, words: &[u64], timeout: Duration) -> Result<()> {
        if self.desynchronized {
            return Err(TransportError::Closed);
        }

        let deadline = deadline_after(timeout);
        self.write_buf.clear();
        encode_words(words, &mut self.write_buf);

        let mut offset = 0usize;
        while offset < self.write_buf.len() {
            if let Err(err) = self.write_some(&mut offset, deadline, timeout) {
                if offset == 0 {
                    return Err(err);
                }
                self.desynchronized = true;
                let total = self.write_buf.len();
                warn!(sent = offset, total, error = %err, "FIFO write failed mid-transfer");
                return Err(TransportError::Desynchronized { sent: offset, total });
            }
        }

        loop {
            match self.inner.flush() {
                Ok(()) => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        trace!(count = words.len(), "stream write");
        Ok(())
    }
}

impl<T: DeadlineStream> StreamFifo<T> {
    fn write_some(
        &mut self,
        offset: &mut usize,
        deadline: Option<Instant>,
        timeout: Duration,
    ) -> Result<()> {
        let remaining = time_left(deadline, timeout)?;
        self.inner.set_write_deadline(remaining)?;

        loop {
            match self.inner.write(&self.write_buf[*offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => {
                    *offset += n;
                    return Ok(());
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => return Err(TransportError::Timeout(timeout)),
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<T> std::fmt::Debug for StreamFifo<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamFifo")
            .field("buffered_bytes", &self.read_buf.len())
            .field("desynchronized", &self.desynchronized)
            .finish()
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
