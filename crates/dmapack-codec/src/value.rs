use std::fmt;
use std::str::FromStr;

/// An engineering-unit value held by one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelValue {
    /// Boolean flag.
    Bool(bool),
    /// Real-valued sample (duty cycle percent, fixed-point, scaled analog).
    Real(f64),
}

impl ChannelValue {
    /// Real view of the value. `true` maps to 1.0.
    pub fn as_f64(&self) -> f64 {
        match *self {
            ChannelValue::Bool(true) => 1.0,
            ChannelValue::Bool(false) => 0.0,
            ChannelValue::Real(v) => v,
        }
    }

    /// Boolean view of the value. Any non-zero real is `true`.
    pub fn as_bool(&self) -> bool {
        match *self {
            ChannelValue::Bool(b) => b,
            ChannelValue::Real(v) => v != 0.0,
        }
    }
}

impl From<bool> for ChannelValue {
    fn from(value: bool) -> Self {
        ChannelValue::Bool(value)
    }
}

impl From<f64> for ChannelValue {
    fn from(value: f64) -> Self {
        ChannelValue::Real(value)
    }
}

impl fmt::Display for ChannelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelValue::Bool(b) => write!(f, "{b}"),
            ChannelValue::Real(v) => write!(f, "{v}"),
        }
    }
}

/// Error returned when parsing a `ChannelValue` from text fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid channel value '{input}', expected true, false, or a number")]
pub struct ParseValueError {
    input: String,
}

impl FromStr for ChannelValue {
    type Err = ParseValueError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "true" | "on" => return Ok(ChannelValue::Bool(true)),
            "false" | "off" => return Ok(ChannelValue::Bool(false)),
            _ => {}
        }
        trimmed
            .parse::<f64>()
            .map(ChannelValue::Real)
            .map_err(|_| ParseValueError {
                input: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_and_real_views() {
        assert_eq!(ChannelValue::Bool(true).as_f64(), 1.0);
        assert!(!ChannelValue::Real(0.0).as_bool());
        assert!(ChannelValue::Real(-0.5).as_bool());
    }

    #[test]
    fn parse_values() {
        assert_eq!("true".parse::<ChannelValue>(), Ok(ChannelValue::Bool(true)));
        assert_eq!(" OFF ".parse::<ChannelValue>(), Ok(ChannelValue::Bool(false)));
        assert_eq!("-3.25".parse::<ChannelValue>(), Ok(ChannelValue::Real(-3.25)));
        assert!("volts".parse::<ChannelValue>().is_err());
    }

    #[test]
    fn parse_error_names_input() {
        let err = "volts".parse::<ChannelValue>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid channel value 'volts', expected true, false, or a number"
        );
        let source: &dyn std::error::Error = &err;
        assert!(source.source().is_none());
    }
}
