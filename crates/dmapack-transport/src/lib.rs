//! DMA FIFO word transport.
//!
//! A FIFO moves 64-bit words between host and device. This crate provides
//! the [`WordFifo`] abstraction plus concrete ends for it:
//! - [`LoopbackFifo`]: in-memory host/device pair for simulation and tests
//! - [`StreamFifo`]: words over any blocking byte stream
//! - [`FifoSocket`]: Unix domain socket bridge to a device process

pub mod error;
pub mod loopback;
pub mod stream;
pub mod traits;
pub mod wire;

#[cfg(unix)]
pub mod uds;

pub use error::{Result, TransportError};
pub use loopback::LoopbackFifo;
pub use stream::{DeadlineStream, StreamFifo};
pub use traits::{FifoConfig, WordFifo, DEFAULT_TIMEOUT};

#[cfg(unix)]
pub use uds::FifoSocket;
