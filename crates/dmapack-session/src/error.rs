use dmapack_codec::PacketCodecError;
use dmapack_transport::TransportError;

/// Errors that can occur during a transfer session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A word could not be packed or unpacked.
    #[error("codec error: {0}")]
    Codec(#[from] PacketCodecError),

    /// The FIFO failed to move the words.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The schema has no channel with this name.
    #[error("unknown channel '{0}'")]
    UnknownChannel(String),
}

impl SessionError {
    /// Returns true when the FIFO timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, SessionError::Transport(err) if err.is_timeout())
    }
}

pub type Result<T> = std::result::Result<T, SessionError>;
