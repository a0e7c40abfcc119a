use std::path::PathBuf;
use std::time::Duration;

/// Errors that can occur while moving words through a FIFO.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The FIFO did not complete the transfer within the timeout.
    #[error("FIFO transfer timed out after {0:?}")]
    Timeout(Duration),

    /// The other end of the FIFO is gone.
    #[error("FIFO closed")]
    Closed,

    /// A write failed after part of the transfer reached the device.
    #[error("FIFO desynchronised: {sent} of {total} bytes written before failure")]
    Desynchronized { sent: usize, total: usize },

    /// Failed to bind to the specified address.
    #[error("failed to bind to {path}: {source}")]
    Bind {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to accept an incoming FIFO connection.
    #[error("failed to accept FIFO connection: {0}")]
    Accept(std::io::Error),

    /// Failed to connect to the specified address.
    #[error("failed to connect to {path}: {source}")]
    Connect {
        path: PathBuf,
        source: std::io::Error,
    },

    /// An I/O error occurred on the underlying stream.
    #[error("FIFO I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The socket path is too long for the platform.
    #[error("socket path too long ({len} bytes, max {max}): {path}")]
    PathTooLong {
        path: PathBuf,
        len: usize,
        max: usize,
    },
}

impl TransportError {
    /// Returns true when the error is a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

pub type Result<T> = std::result::Result<T, TransportError>;
