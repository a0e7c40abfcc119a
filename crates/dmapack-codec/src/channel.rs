//! Per-channel pack/unpack.
//!
//! Every channel occupies a lane of the 64-bit word determined by its type and
//! ordinal lane index:
//!
//! ```text
//! Boolean      bit  lane                     1 bit
//! FixedPoint   bits [lane*32, lane*32 + 32)  32 bits, low word_length bits significant
//! ScaledInt16  bits [lane*16, lane*16 + 16)  16 bits, sign + 15-bit magnitude
//! PWM          bits [0, 32) high ticks, [32, 64) low ticks
//! ```
//!
//! Bit 0 is the most significant bit of the word.

use std::fmt;
use std::ops::{Range, RangeInclusive};

use crate::bits::{self, WORD_BITS};
use crate::config::CodecConfig;
use crate::error::{PacketCodecError, Result};
use crate::value::ChannelValue;

/// Largest fixed-point word length that fits a 32-bit lane.
pub const MAX_FIXED_WORD_LENGTH: u8 = 32;

/// Accepted binary point positions for fixed-point channels.
pub const INTEGER_WORD_LENGTH_RANGE: RangeInclusive<i16> = -1024..=1024;

const SCALED_POSITIVE_FULL_SCALE: f64 = 32767.0;
const SCALED_NEGATIVE_FULL_SCALE: f64 = 32768.0;
const SCALED_SIGN_BIT: u64 = 0x8000;
const SCALED_MAGNITUDE_MASK: u64 = 0x7FFF;
const PWM_TICK_MASK: u64 = 0xFFFF_FFFF;

/// The closed set of channel types, each carrying only its own parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChannelKind {
    /// Single digital line.
    Boolean,
    /// Pulse-width modulated output or measurement, reported as duty cycle percent.
    Pwm {
        /// Total tick count of one cycle. Required for pack only.
        period: u32,
    },
    /// Signed two's-complement fixed-point value.
    FixedPoint {
        /// Number of significant bits (1..=32).
        word_length: u8,
        /// Position of the binary point relative to the sign bit.
        integer_word_length: i16,
    },
    /// Signed 16-bit analog sample scaled to engineering units.
    ScaledInt16 {
        /// Engineering-unit value corresponding to full-scale raw magnitude.
        scale: f64,
    },
}

/// Optional type parameters as they appear in a layout document.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct KindParams {
    pub period: Option<u32>,
    pub word_length: Option<u8>,
    pub integer_word_length: Option<i16>,
    pub scale: Option<f64>,
}

impl ChannelKind {
    /// Resolve a document type name and its parameters into a kind.
    ///
    /// Type names are matched case-insensitively. `FXPI32` and `I16` are
    /// accepted as aliases for `FixedPoint` and `ScaledInt16`.
    pub fn from_type_name(channel: &str, type_name: &str, params: &KindParams) -> Result<Self> {
        let missing = |param: &str| {
            PacketCodecError::invalid_configuration(
                format!("channel '{channel}'"),
                format!("{type_name} requires '{param}'"),
            )
        };

        let kind = match type_name.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => ChannelKind::Boolean,
            "pwm" => ChannelKind::Pwm {
                period: params.period.ok_or_else(|| missing("period"))?,
            },
            "fixedpoint" | "fxpi32" => ChannelKind::FixedPoint {
                word_length: params.word_length.ok_or_else(|| missing("word_length"))?,
                integer_word_length: params
                    .integer_word_length
                    .ok_or_else(|| missing("integer_word_length"))?,
            },
            "scaledint16" | "i16" => ChannelKind::ScaledInt16 {
                scale: params.scale.ok_or_else(|| missing("scale"))?,
            },
            _ => return Err(PacketCodecError::unsupported_type(channel, type_name)),
        };
        kind.validate(channel)?;
        Ok(kind)
    }

    /// Width of the channel's lane in bits.
    pub fn bit_width(&self) -> u32 {
        match self {
            ChannelKind::Boolean => 1,
            ChannelKind::Pwm { .. } => WORD_BITS,
            ChannelKind::FixedPoint { .. } => 32,
            ChannelKind::ScaledInt16 { .. } => 16,
        }
    }

    /// Canonical type name.
    pub fn type_name(&self) -> &'static str {
        match self {
            ChannelKind::Boolean => "Boolean",
            ChannelKind::Pwm { .. } => "PWM",
            ChannelKind::FixedPoint { .. } => "FixedPoint",
            ChannelKind::ScaledInt16 { .. } => "ScaledInt16",
        }
    }

    /// Check the kind's parameters.
    ///
    /// PWM period is not checked here; a read-direction PWM never needs it.
    pub fn validate(&self, channel: &str) -> Result<()> {
        match *self {
            ChannelKind::Boolean | ChannelKind::Pwm { .. } => Ok(()),
            ChannelKind::FixedPoint {
                word_length,
                integer_word_length,
            } => {
                if word_length == 0 || word_length > MAX_FIXED_WORD_LENGTH {
                    return Err(PacketCodecError::invalid_configuration(
                        format!("channel '{channel}'"),
                        format!(
                            "word_length must be 1..={MAX_FIXED_WORD_LENGTH}, got {word_length}"
                        ),
                    ));
                }
                if !INTEGER_WORD_LENGTH_RANGE.contains(&integer_word_length) {
                    return Err(PacketCodecError::invalid_configuration(
                        format!("channel '{channel}'"),
                        format!(
                            "integer_word_length must be within {}..={}, got {integer_word_length}",
                            INTEGER_WORD_LENGTH_RANGE.start(),
                            INTEGER_WORD_LENGTH_RANGE.end()
                        ),
                    ));
                }
                Ok(())
            }
            ChannelKind::ScaledInt16 { scale } => {
                if !scale.is_finite() || scale <= 0.0 {
                    return Err(PacketCodecError::invalid_configuration(
                        format!("channel '{channel}'"),
                        format!("scale must be finite and > 0, got {scale}"),
                    ));
                }
                Ok(())
            }
        }
    }

    /// Smallest engineering-unit step the channel can represent.
    pub fn resolution(&self) -> f64 {
        match *self {
            ChannelKind::Boolean => 1.0,
            ChannelKind::Pwm { period } if period > 0 => 100.0 / f64::from(period),
            ChannelKind::Pwm { .. } => 100.0,
            ChannelKind::FixedPoint {
                word_length,
                integer_word_length,
            } => fixed_step(word_length, integer_word_length),
            ChannelKind::ScaledInt16 { scale } => scale / SCALED_POSITIVE_FULL_SCALE,
        }
    }

    /// Engineering-unit range accepted by pack without clamping.
    pub fn value_range(&self) -> (f64, f64) {
        match *self {
            ChannelKind::Boolean => (0.0, 1.0),
            ChannelKind::Pwm { .. } => (0.0, 100.0),
            ChannelKind::FixedPoint {
                word_length,
                integer_word_length,
            } => {
                let (min, max) = fixed_raw_range(word_length);
                let step = fixed_step(word_length, integer_word_length);
                (min * step, max * step)
            }
            ChannelKind::ScaledInt16 { scale } => (-scale, scale),
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelKind::Boolean => write!(f, "Boolean"),
            ChannelKind::Pwm { period } => write!(f, "PWM(period={period})"),
            ChannelKind::FixedPoint {
                word_length,
                integer_word_length,
            } => write!(
                f,
                "FixedPoint(word_length={word_length}, integer_word_length={integer_word_length})"
            ),
            ChannelKind::ScaledInt16 { scale } => write!(f, "ScaledInt16(scale={scale})"),
        }
    }
}

/// One named channel and its lane within a packet.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDescriptor {
    /// Channel name, unique across the whole schema.
    pub name: String,
    /// Channel type and parameters.
    pub kind: ChannelKind,
    /// Ordinal lane index selecting the bit range.
    pub lane: u8,
}

impl ChannelDescriptor {
    /// Create a descriptor at an explicit lane.
    pub fn new(name: impl Into<String>, kind: ChannelKind, lane: u8) -> Self {
        Self {
            name: name.into(),
            kind,
            lane,
        }
    }

    /// Bit range of this channel within the word.
    pub fn bit_range(&self) -> Result<Range<u32>> {
        let width = self.kind.bit_width();
        let start = match self.kind {
            ChannelKind::Pwm { .. } => 0,
            _ => u32::from(self.lane) * width,
        };
        let end = start + width;
        if end > WORD_BITS {
            return Err(PacketCodecError::invalid_configuration(
                format!("channel '{}'", self.name),
                format!(
                    "lane {} of {} places bits {start}..{end} outside the {WORD_BITS}-bit word",
                    self.lane,
                    self.kind.type_name()
                ),
            ));
        }
        Ok(start..end)
    }
}

/// Decode one channel's value from a word.
pub fn decode_channel(desc: &ChannelDescriptor, word: u64) -> Result<ChannelValue> {
    desc.kind.validate(&desc.name)?;
    let range = desc.bit_range()?;
    let field = bits::extract(word, range);

    let value = match desc.kind {
        ChannelKind::Boolean => ChannelValue::Bool(field == 1),
        ChannelKind::Pwm { .. } => {
            let hi_time = field >> 32;
            let low_time = field & PWM_TICK_MASK;
            let total = hi_time + low_time;
            if total == 0 {
                ChannelValue::Real(0.0)
            } else {
                ChannelValue::Real(hi_time as f64 / total as f64 * 100.0)
            }
        }
        ChannelKind::FixedPoint {
            word_length,
            integer_word_length,
        } => {
            let raw = sign_extend(field & bits::mask(u32::from(word_length)), word_length);
            ChannelValue::Real(raw as f64 * fixed_step(word_length, integer_word_length))
        }
        ChannelKind::ScaledInt16 { scale } => {
            if field & SCALED_SIGN_BIT == 0 {
                let magnitude = field & SCALED_MAGNITUDE_MASK;
                ChannelValue::Real(scale * magnitude as f64 / SCALED_POSITIVE_FULL_SCALE)
            } else {
                let magnitude = !field & SCALED_MAGNITUDE_MASK;
                ChannelValue::Real(-scale * magnitude as f64 / SCALED_NEGATIVE_FULL_SCALE)
            }
        }
    };
    Ok(value)
}

/// Encode one channel's value into its right-justified lane bits.
///
/// The result is exactly `desc.kind.bit_width()` bits wide.
pub fn encode_channel(
    desc: &ChannelDescriptor,
    value: ChannelValue,
    config: &CodecConfig,
) -> Result<u64> {
    desc.kind.validate(&desc.name)?;
    if let ChannelValue::Real(v) = value {
        if !v.is_finite() {
            let (min, max) = desc.kind.value_range();
            return Err(PacketCodecError::OutOfRange {
                channel: desc.name.clone(),
                value: v,
                min,
                max,
            });
        }
    }

    let field = match desc.kind {
        ChannelKind::Boolean => u64::from(value.as_bool()),
        ChannelKind::Pwm { period } => {
            if period == 0 {
                return Err(PacketCodecError::invalid_configuration(
                    format!("channel '{}'", desc.name),
                    "PWM period must be > 0",
                ));
            }
            let duty = limit(desc, value.as_f64(), 0.0, 100.0, config)?;
            let period = u64::from(period);
            let hi_time = ((duty / 100.0 * period as f64).round() as u64).min(period);
            let low_time = period - hi_time;
            (hi_time << 32) | low_time
        }
        ChannelKind::FixedPoint {
            word_length,
            integer_word_length,
        } => {
            let step = fixed_step(word_length, integer_word_length);
            let (min_raw, max_raw) = fixed_raw_range(word_length);
            let x = value.as_f64();
            let mut raw = (x / step).round();
            if raw < min_raw || raw > max_raw {
                if config.strict_range {
                    return Err(PacketCodecError::OutOfRange {
                        channel: desc.name.clone(),
                        value: x,
                        min: min_raw * step,
                        max: max_raw * step,
                    });
                }
                raw = raw.clamp(min_raw, max_raw);
            }
            // Two's complement truncated to the lane; bits above word_length
            // carry the sign extension.
            (raw as i64 as u64) & bits::mask(32)
        }
        ChannelKind::ScaledInt16 { scale } => {
            let x = limit(desc, value.as_f64(), -scale, scale, config)?;
            if x >= 0.0 {
                let raw = (SCALED_POSITIVE_FULL_SCALE * x / scale).round() as u64;
                raw.min(SCALED_MAGNITUDE_MASK)
            } else {
                let magnitude = ((-SCALED_NEGATIVE_FULL_SCALE * x / scale).round() as u64)
                    .min(SCALED_MAGNITUDE_MASK);
                if magnitude == 0 {
                    0
                } else {
                    SCALED_SIGN_BIT | (!magnitude & SCALED_MAGNITUDE_MASK)
                }
            }
        }
    };

    debug_assert!(field <= bits::mask(desc.kind.bit_width()));
    Ok(field)
}

fn limit(desc: &ChannelDescriptor, x: f64, min: f64, max: f64, config: &CodecConfig) -> Result<f64> {
    if (min..=max).contains(&x) {
        return Ok(x);
    }
    if config.strict_range {
        return Err(PacketCodecError::OutOfRange {
            channel: desc.name.clone(),
            value: x,
            min,
            max,
        });
    }
    Ok(x.clamp(min, max))
}

fn fixed_step(word_length: u8, integer_word_length: i16) -> f64 {
    2f64.powi(i32::from(integer_word_length) - i32::from(word_length))
}

fn fixed_raw_range(word_length: u8) -> (f64, f64) {
    let half = 2f64.powi(i32::from(word_length) - 1);
    (-half, half - 1.0)
}

fn sign_extend(field: u64, word_length: u8) -> i64 {
    let shift = 64 - u32::from(word_length);
    ((field << shift) as i64) >> shift
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lenient() -> CodecConfig {
        CodecConfig::default()
    }

    fn fxp(word_length: u8, integer_word_length: i16) -> ChannelKind {
        ChannelKind::FixedPoint {
            word_length,
            integer_word_length,
        }
    }

    fn roundtrip(desc: &ChannelDescriptor, value: f64) -> f64 {
        let field = encode_channel(desc, ChannelValue::Real(value), &lenient()).unwrap();
        let word = bits::insert(0, desc.bit_range().unwrap(), field);
        decode_channel(desc, word).unwrap().as_f64()
    }

    #[test]
    fn boolean_lane_is_counted_from_msb() {
        let desc = ChannelDescriptor::new("DIO3", ChannelKind::Boolean, 3);
        assert_eq!(desc.bit_range().unwrap(), 3..4);
        assert_eq!(
            decode_channel(&desc, 1 << 60).unwrap(),
            ChannelValue::Bool(true)
        );
        assert_eq!(
            decode_channel(&desc, !(1 << 60)).unwrap(),
            ChannelValue::Bool(false)
        );
    }

    #[test]
    fn boolean_roundtrip() {
        let desc = ChannelDescriptor::new("Start", ChannelKind::Boolean, 0);
        for v in [true, false] {
            let field = encode_channel(&desc, v.into(), &lenient()).unwrap();
            let word = bits::insert(0, 0..1, field);
            assert_eq!(decode_channel(&desc, word).unwrap(), ChannelValue::Bool(v));
        }
    }

    #[test]
    fn boolean_accepts_real_input() {
        let desc = ChannelDescriptor::new("Start", ChannelKind::Boolean, 0);
        assert_eq!(encode_channel(&desc, 1.0.into(), &lenient()).unwrap(), 1);
        assert_eq!(encode_channel(&desc, 0.0.into(), &lenient()).unwrap(), 0);
    }

    #[test]
    fn pwm_unpack_duty_cycle() {
        let desc = ChannelDescriptor::new("Pulse", ChannelKind::Pwm { period: 0 }, 0);
        let word = (25u64 << 32) | 75;
        assert_eq!(decode_channel(&desc, word).unwrap(), ChannelValue::Real(25.0));
    }

    #[test]
    fn pwm_unpack_zero_ticks_is_zero_duty() {
        let desc = ChannelDescriptor::new("Pulse", ChannelKind::Pwm { period: 0 }, 0);
        assert_eq!(decode_channel(&desc, 0).unwrap(), ChannelValue::Real(0.0));
    }

    #[test]
    fn pwm_pack_endpoints() {
        let desc = ChannelDescriptor::new("Pulse", ChannelKind::Pwm { period: 1000 }, 0);
        let off = encode_channel(&desc, 0.0.into(), &lenient()).unwrap();
        assert_eq!(off >> 32, 0);
        assert_eq!(off & PWM_TICK_MASK, 1000);

        let on = encode_channel(&desc, 100.0.into(), &lenient()).unwrap();
        assert_eq!(on >> 32, 1000);
        assert_eq!(on & PWM_TICK_MASK, 0);
    }

    #[test]
    fn pwm_roundtrip_within_one_tick() {
        for period in [1u32, 7, 100, 4096, 40_000] {
            let desc = ChannelDescriptor::new("Pulse", ChannelKind::Pwm { period }, 0);
            for duty in [0.0, 0.4, 12.5, 33.3, 50.0, 66.7, 99.9, 100.0] {
                let got = roundtrip(&desc, duty);
                assert!(
                    (got - duty).abs() <= 100.0 / f64::from(period),
                    "period {period} duty {duty} got {got}"
                );
            }
        }
    }

    #[test]
    fn pwm_zero_period_rejected_on_pack() {
        let desc = ChannelDescriptor::new("Pulse", ChannelKind::Pwm { period: 0 }, 0);
        let err = encode_channel(&desc, 50.0.into(), &lenient()).unwrap_err();
        assert!(matches!(err, PacketCodecError::InvalidConfiguration { .. }));
    }

    #[test]
    fn pwm_duty_above_100_clamps_or_fails() {
        let desc = ChannelDescriptor::new("Pulse", ChannelKind::Pwm { period: 100 }, 0);
        let clamped = encode_channel(&desc, 120.0.into(), &lenient()).unwrap();
        assert_eq!(clamped >> 32, 100);
        let err = encode_channel(&desc, 120.0.into(), &CodecConfig::strict()).unwrap_err();
        assert!(matches!(err, PacketCodecError::OutOfRange { .. }));
    }

    #[test]
    fn fixed_point_unpack_two_complement() {
        // word_length 16, integer_word_length 8: step 2^-8.
        let desc = ChannelDescriptor::new("fx", fxp(16, 8), 1);
        // 12.5 * 256 = 3200 = 0x0C80
        assert_eq!(decode_channel(&desc, 0x0C80).unwrap(), ChannelValue::Real(12.5));
        // -1.0 * 256 = -256 = 0xFF00 in 16 bits, sign-extended lane 0xFFFF_FF00
        assert_eq!(
            decode_channel(&desc, 0xFFFF_FF00).unwrap(),
            ChannelValue::Real(-1.0)
        );
    }

    #[test]
    fn fixed_point_unpack_ignores_padding() {
        let desc = ChannelDescriptor::new("fx", fxp(16, 8), 1);
        // Padding bits disagree with the sign bit; only the low 16 bits count.
        assert_eq!(
            decode_channel(&desc, 0x1234_0C80).unwrap(),
            ChannelValue::Real(12.5)
        );
        assert_eq!(
            decode_channel(&desc, 0x0000_FF00).unwrap(),
            ChannelValue::Real(-1.0)
        );
    }

    #[test]
    fn fixed_point_pack_sign_extends() {
        let desc = ChannelDescriptor::new("fx", fxp(16, 8), 0);
        assert_eq!(
            encode_channel(&desc, (-1.0).into(), &lenient()).unwrap(),
            0xFFFF_FF00
        );
        assert_eq!(encode_channel(&desc, 12.5.into(), &lenient()).unwrap(), 0x0C80);
    }

    #[test]
    fn fixed_point_roundtrip_within_one_step() {
        for (wl, iwl) in [(1u8, 1i16), (8, 4), (16, 8), (24, 2), (32, 16), (12, -2), (10, 14)] {
            let desc = ChannelDescriptor::new("fx", fxp(wl, iwl), 0);
            let (min, max) = desc.kind.value_range();
            let step = desc.kind.resolution();
            for fraction in [0.0, 0.1, 0.25, 0.5, 0.77, 1.0] {
                for x in [min * fraction, max * fraction] {
                    let got = roundtrip(&desc, x);
                    assert!(
                        (got - x).abs() <= step,
                        "wl {wl} iwl {iwl} x {x} got {got}"
                    );
                }
            }
        }
    }

    #[test]
    fn fixed_point_extremes_do_not_fail_in_strict_mode() {
        for wl in 1..=32u8 {
            let desc = ChannelDescriptor::new("fx", fxp(wl, 4), 0);
            let (min, max) = desc.kind.value_range();
            let strict = CodecConfig::strict();
            assert!(encode_channel(&desc, min.into(), &strict).is_ok(), "wl {wl}");
            assert!(encode_channel(&desc, max.into(), &strict).is_ok(), "wl {wl}");
            assert_eq!(roundtrip(&desc, min), min);
            assert_eq!(roundtrip(&desc, max), max);
        }
    }

    #[test]
    fn fixed_point_overflow_clamps_or_fails() {
        let desc = ChannelDescriptor::new("fx", fxp(8, 4), 0);
        let (_, max) = desc.kind.value_range();
        assert_eq!(roundtrip(&desc, 100.0), max);
        let err = encode_channel(&desc, 100.0.into(), &CodecConfig::strict()).unwrap_err();
        assert!(matches!(err, PacketCodecError::OutOfRange { .. }));
    }

    #[test]
    fn fixed_point_invalid_word_length() {
        let desc = ChannelDescriptor::new("fx", fxp(0, 4), 0);
        assert!(matches!(
            decode_channel(&desc, 0),
            Err(PacketCodecError::InvalidConfiguration { .. })
        ));
        let desc = ChannelDescriptor::new("fx", fxp(33, 4), 0);
        assert!(matches!(
            encode_channel(&desc, 1.0.into(), &lenient()),
            Err(PacketCodecError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn scaled_int16_positive_encoding() {
        let desc = ChannelDescriptor::new("Setpoint", ChannelKind::ScaledInt16 { scale: 10.0 }, 1);
        assert_eq!(desc.bit_range().unwrap(), 16..32);
        assert_eq!(encode_channel(&desc, 5.0.into(), &lenient()).unwrap(), 16384);
        assert_eq!(encode_channel(&desc, 10.0.into(), &lenient()).unwrap(), 0x7FFF);
    }

    #[test]
    fn scaled_int16_negative_stores_inverted_magnitude() {
        let desc = ChannelDescriptor::new("analog", ChannelKind::ScaledInt16 { scale: 10.0 }, 0);
        // magnitude round(32768 * 3 / 10) = 9830, stored inverted under the sign bit.
        let field = encode_channel(&desc, (-3.0).into(), &lenient()).unwrap();
        assert_eq!(field, 0x8000 | (!9830u64 & 0x7FFF));
        let decoded = decode_channel(&desc, field << 48).unwrap().as_f64();
        assert!((decoded + 10.0 * 9830.0 / 32768.0).abs() < 1e-12);
    }

    #[test]
    fn scaled_int16_zero_has_positive_sign() {
        let desc = ChannelDescriptor::new("analog", ChannelKind::ScaledInt16 { scale: 5.0 }, 0);
        assert_eq!(encode_channel(&desc, 0.0.into(), &lenient()).unwrap(), 0);
        assert_eq!(encode_channel(&desc, (-0.0).into(), &lenient()).unwrap(), 0);
        assert_eq!(encode_channel(&desc, (-1e-9).into(), &lenient()).unwrap(), 0);
    }

    #[test]
    fn scaled_int16_roundtrip_within_one_count() {
        for scale in [0.5, 1.0, 10.0, 250.0] {
            let desc = ChannelDescriptor::new("analog", ChannelKind::ScaledInt16 { scale }, 2);
            let resolution = scale / SCALED_POSITIVE_FULL_SCALE;
            for fraction in [-1.0, -0.75, -0.3, -0.001, 0.0, 0.001, 0.3, 0.5, 1.0] {
                let x = scale * fraction;
                let got = roundtrip(&desc, x);
                assert!(
                    (got - x).abs() <= resolution,
                    "scale {scale} x {x} got {got}"
                );
            }
        }
    }

    #[test]
    fn scaled_int16_beyond_scale_clamps_or_fails() {
        let desc = ChannelDescriptor::new("analog", ChannelKind::ScaledInt16 { scale: 10.0 }, 0);
        assert_eq!(encode_channel(&desc, 12.0.into(), &lenient()).unwrap(), 0x7FFF);
        let err = encode_channel(&desc, (-10.5).into(), &CodecConfig::strict()).unwrap_err();
        assert!(matches!(err, PacketCodecError::OutOfRange { .. }));
    }

    #[test]
    fn non_finite_input_is_out_of_range() {
        let desc = ChannelDescriptor::new("analog", ChannelKind::ScaledInt16 { scale: 10.0 }, 0);
        for v in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = encode_channel(&desc, v.into(), &lenient()).unwrap_err();
            assert!(matches!(err, PacketCodecError::OutOfRange { .. }));
        }
    }

    #[test]
    fn lane_past_word_end_rejected() {
        let desc = ChannelDescriptor::new("fx", fxp(16, 8), 2);
        assert!(matches!(
            desc.bit_range(),
            Err(PacketCodecError::InvalidConfiguration { .. })
        ));
        let desc = ChannelDescriptor::new("DIO64", ChannelKind::Boolean, 64);
        assert!(desc.bit_range().is_err());
    }

    #[test]
    fn from_type_name_aliases() {
        let params = KindParams {
            word_length: Some(20),
            integer_word_length: Some(5),
            ..KindParams::default()
        };
        assert_eq!(
            ChannelKind::from_type_name("fx", "FXPI32", &params).unwrap(),
            fxp(20, 5)
        );
        let params = KindParams {
            scale: Some(10.0),
            ..KindParams::default()
        };
        assert_eq!(
            ChannelKind::from_type_name("ai", "i16", &params).unwrap(),
            ChannelKind::ScaledInt16 { scale: 10.0 }
        );
    }

    #[test]
    fn from_type_name_unsupported() {
        let err = ChannelKind::from_type_name("x", "U64", &KindParams::default()).unwrap_err();
        assert_eq!(
            err,
            PacketCodecError::UnsupportedType {
                channel: "x".to_string(),
                type_name: "U64".to_string()
            }
        );
    }

    #[test]
    fn from_type_name_missing_parameter() {
        let err = ChannelKind::from_type_name("fx", "FixedPoint", &KindParams::default())
            .unwrap_err();
        assert!(matches!(err, PacketCodecError::InvalidConfiguration { .. }));
    }
}
