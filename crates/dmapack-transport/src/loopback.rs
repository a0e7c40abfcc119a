use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::{deadline_after, time_left, WordFifo};

/// Default depth of each loopback queue, in words.
pub const DEFAULT_DEPTH: usize = 1023;

struct Queue {
    words: VecDeque<u64>,
    closed: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    changed: Condvar,
    depth: usize,
}

impl Shared {
    fn new(depth: usize) -> Arc<Self> {
        Arc::new(Self {
            queue: Mutex::new(Queue {
                words: VecDeque::new(),
                closed: false,
            }),
            changed: Condvar::new(),
            depth,
        })
    }

    fn lock(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until the queue changes or `remaining` elapses. `None` waits
    /// without a bound.
    fn wait<'a>(
        &self,
        queue: MutexGuard<'a, Queue>,
        remaining: Option<Duration>,
    ) -> MutexGuard<'a, Queue> {
        match remaining {
            Some(remaining) => {
                self.changed
                    .wait_timeout(queue, remaining)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0
            }
            None => self
                .changed
                .wait(queue)
                .unwrap_or_else(PoisonError::into_inner),
        }
    }

    fn close(&self) {
        self.lock().closed = true;
        self.changed.notify_all();
    }
}

/// In-memory FIFO pair standing in for a host/device DMA channel.
///
/// Words written at one end are read at the other. Each direction is a
/// bounded queue; a write that does not fit waits for room until its timeout.
pub struct LoopbackFifo {
    rx: Arc<Shared>,
    tx: Arc<Shared>,
}

impl LoopbackFifo {
    /// Create connected host and device ends with the default depth.
    pub fn pair() -> (Self, Self) {
        Self::pair_with_depth(DEFAULT_DEPTH)
    }

    /// Create connected host and device ends with an explicit queue depth.
    pub fn pair_with_depth(depth: usize) -> (Self, Self) {
        let to_device = Shared::new(depth);
        let to_host = Shared::new(depth);
        let host = Self {
            rx: to_host.clone(),
            tx: to_device.clone(),
        };
        let device = Self {
            rx: to_device,
            tx: to_host,
        };
        (host, device)
    }

    /// Number of words waiting to be read at this end.
    pub fn pending(&self) -> usize {
        self.rx.lock().words.len()
    }

    /// Close both directions. Blocked calls at either end return `Closed`.
    pub fn close(&self) {
        self.rx.close();
        self.tx.close();
    }
}

impl WordFifo for LoopbackFifo {
    fn read_words(&mut self, count: usize, timeout: Duration) -> Result<Vec<u64>> {
        let deadline = deadline_after(timeout);
        let mut queue = self.rx.lock();
        loop {
            if queue.words.len() >= count {
                let words: Vec<u64> = queue.words.drain(..count).collect();
                self.rx.changed.notify_all();
                trace!(count, "loopback read");
                return Ok(words);
            }
            if queue.closed {
                return Err(TransportError::Closed);
            }
            queue = self.rx.wait(queue, time_left(deadline, timeout)?);
        }
    }

    fn write_words(&mut self, words: &[u64], timeout: Duration) -> Result<()> {
        if words.len() > self.tx.depth {
            return Err(TransportError::Io(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!(
                    "{} words exceed FIFO depth {}",
                    words.len(),
                    self.tx.depth
                ),
            )));
        }

        let deadline = deadline_after(timeout);
        let mut queue = self.tx.lock();
        loop {
            if queue.closed {
                return Err(TransportError::Closed);
            }
            if self.tx.depth - queue.words.len() >= words.len() {
                queue.words.extend(words.iter().copied());
                self.tx.changed.notify_all();
                trace!(count = words.len(), "loopback write");
                return Ok(());
            }
            queue = self.tx.wait(queue, time_left(deadline, timeout)?);
        }
    }
}

impl Drop for LoopbackFifo {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for LoopbackFifo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackFifo")
            .field("pending", &self.pending())
            .field("depth", &self.rx.depth)
            .finish()
    }
}
