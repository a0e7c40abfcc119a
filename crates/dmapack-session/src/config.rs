use dmapack_codec::CodecConfig;
use dmapack_transport::FifoConfig;

/// Settings for a [`TransferSession`](crate::TransferSession).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SessionConfig {
    pub codec: CodecConfig,
    /// FIFO read and write timeouts.
    pub fifo: FifoConfig,
    /// Leave write channels unset until the application assigns them.
    /// Packing an unset channel fails with `MissingChannel`.
    pub unset_outputs: bool,
}
