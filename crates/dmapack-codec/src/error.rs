/// Errors that can occur while packing or unpacking channel words.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PacketCodecError {
    /// A descriptor parameter or layout cannot describe a valid word.
    #[error("invalid configuration for {context}: {reason}")]
    InvalidConfiguration { context: String, reason: String },

    /// The descriptor names a channel type outside the supported set.
    #[error("unsupported channel type '{type_name}' for channel '{channel}'")]
    UnsupportedType { channel: String, type_name: String },

    /// A pack input cannot be represented in the channel's width.
    #[error("value {value} out of range for channel '{channel}' (allowed {min}..={max})")]
    OutOfRange {
        channel: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A textual word contained a character other than `0` or `1`.
    #[error("non-binary digit {found:?} at bit {position}")]
    NonBinaryDigit { position: usize, found: char },

    /// Pack was called without a value for a channel in the packet.
    #[error("no value for channel '{0}'")]
    MissingChannel(String),

    /// A transfer supplied a different number of words than the schema expects.
    #[error("{direction} transfer expected {expected} words, got {actual}")]
    WordCountMismatch {
        direction: String,
        expected: usize,
        actual: usize,
    },
}

impl PacketCodecError {
    /// Create an invalid configuration error.
    pub fn invalid_configuration(context: impl Into<String>, reason: impl Into<String>) -> Self {
        PacketCodecError::InvalidConfiguration {
            context: context.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported type error.
    pub fn unsupported_type(channel: impl Into<String>, type_name: impl Into<String>) -> Self {
        PacketCodecError::UnsupportedType {
            channel: channel.into(),
            type_name: type_name.into(),
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            PacketCodecError::InvalidConfiguration { context, reason } => {
                vec![("context", context.clone()), ("reason", reason.clone())]
            }
            PacketCodecError::UnsupportedType { channel, type_name } => {
                vec![("channel", channel.clone()), ("type", type_name.clone())]
            }
            PacketCodecError::OutOfRange {
                channel,
                value,
                min,
                max,
            } => vec![
                ("channel", channel.clone()),
                ("value", value.to_string()),
                ("min", min.to_string()),
                ("max", max.to_string()),
            ],
            PacketCodecError::NonBinaryDigit { position, found } => vec![
                ("position", position.to_string()),
                ("found", found.to_string()),
            ],
            PacketCodecError::MissingChannel(name) => vec![("channel", name.clone())],
            PacketCodecError::WordCountMismatch {
                direction,
                expected,
                actual,
            } => vec![
                ("direction", direction.clone()),
                ("expected", expected.to_string()),
                ("actual", actual.to_string()),
            ],
        }
    }
}

pub type Result<T> = std::result::Result<T, PacketCodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_configuration_display() {
        let err = PacketCodecError::invalid_configuration("channel 'Duty'", "period must be > 0");
        assert_eq!(
            err.to_string(),
            "invalid configuration for channel 'Duty': period must be > 0"
        );
    }

    #[test]
    fn word_count_mismatch_display() {
        let err = PacketCodecError::WordCountMismatch {
            direction: "read".to_string(),
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "read transfer expected 3 words, got 2");
    }

    #[test]
    fn log_fields_out_of_range() {
        let err = PacketCodecError::OutOfRange {
            channel: "fx".to_string(),
            value: 300.0,
            min: -128.0,
            max: 127.99,
        };
        let fields = err.log_fields();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0], ("channel", "fx".to_string()));
        assert_eq!(fields[1], ("value", "300".to_string()));
    }

    #[test]
    fn log_fields_non_binary_digit() {
        let err = PacketCodecError::NonBinaryDigit {
            position: 7,
            found: '2',
        };
        assert_eq!(
            err.log_fields(),
            vec![("position", "7".to_string()), ("found", "2".to_string())]
        );
    }
}
