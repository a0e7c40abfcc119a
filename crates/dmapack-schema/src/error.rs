use dmapack_codec::PacketCodecError;

/// Errors that can occur while loading or building a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The layout file could not be read.
    #[error("failed to load layout: {0}")]
    LoadFailed(String),

    /// The layout document is not valid JSON for the expected shape.
    #[error("layout is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The layout describes packets the codec cannot handle.
    #[error("invalid layout: {0}")]
    Invalid(#[from] PacketCodecError),
}

impl SchemaError {
    /// The codec error behind an invalid layout, if that is the cause.
    pub fn codec_error(&self) -> Option<&PacketCodecError> {
        match self {
            SchemaError::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SchemaError>;
