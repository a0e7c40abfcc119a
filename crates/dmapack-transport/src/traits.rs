use std::time::{Duration, Instant};

use crate::error::{Result, TransportError};

/// Default timeout for blocking FIFO reads and writes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

/// A blocking DMA FIFO moving 64-bit words.
///
/// Reads are all-or-nothing per call: a read that fails (timeout, closed
/// FIFO, I/O error) hands back no words.
///
/// A write that fails before any word leaves the host applied nothing. A
/// stream transport can fail after part of a transfer already reached the
/// device; it then reports [`TransportError::Desynchronized`] and refuses
/// further transfers, since the device is mid-transfer.
pub trait WordFifo {
    /// Read exactly `count` words, waiting at most `timeout`.
    fn read_words(&mut self, count: usize, timeout: Duration) -> Result<Vec<u64>>;

    /// Write all of `words`, waiting at most `timeout`.
    fn write_words(&mut self, words: &[u64], timeout: Duration) -> Result<()>;
}

impl<F: WordFifo + ?Sized> WordFifo for &mut F {
    fn read_words(&mut self, count: usize, timeout: Duration) -> Result<Vec<u64>> {
        (**self).read_words(count, timeout)
    }

    fn write_words(&mut self, words: &[u64], timeout: Duration) -> Result<()> {
        (**self).write_words(words, timeout)
    }
}

impl<F: WordFifo + ?Sized> WordFifo for Box<F> {
    fn read_words(&mut self, count: usize, timeout: Duration) -> Result<Vec<u64>> {
        (**self).read_words(count, timeout)
    }

    fn write_words(&mut self, words: &[u64], timeout: Duration) -> Result<()> {
        (**self).write_words(words, timeout)
    }
}

/// Timeouts applied to FIFO transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FifoConfig {
    /// Maximum time a read may block.
    pub read_timeout: Duration,
    /// Maximum time a write may block.
    pub write_timeout: Duration,
}

impl Default for FifoConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_TIMEOUT,
            write_timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Deadline for a call starting now. `None` when `timeout` does not fit in an
/// [`Instant`], meaning the call waits without a deadline.
pub(crate) fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}

/// Time left before `deadline`, or `None` when there is no deadline.
pub(crate) fn time_left(deadline: Option<Instant>, timeout: Duration) -> Result<Option<Duration>> {
    let Some(deadline) = deadline else {
        return Ok(None);
    };
    let remaining = deadline.saturating_duration_since(Instant::now());
    if remaining.is_zero() {
        return Err(TransportError::Timeout(timeout));
    }
    Ok(Some(remaining))
}
