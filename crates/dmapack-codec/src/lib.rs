//! Bit-exact codec between 64-bit DMA FIFO words and engineering-unit values.
//!
//! A word is a big-endian bit string (bit 0 = MSB). Each packet maps exactly
//! one word to a set of named channels:
//! - **Boolean**: one bit per lane
//! - **FixedPoint**: 32-bit lanes, two's complement in the low `word_length` bits
//! - **ScaledInt16**: 16-bit lanes, sign plus inverted-when-negative magnitude
//! - **PWM**: the whole word, high ticks then low ticks
//!
//! [`PacketCodec`] composes the per-channel codecs in [`channel`] and is the
//! unit the transfer layer works with.

pub mod bits;
pub mod channel;
pub mod config;
pub mod error;
pub mod packet;
pub mod value;

pub use bits::{format_bits, parse_bits, WORD_BITS};
pub use channel::{decode_channel, encode_channel, ChannelDescriptor, ChannelKind, KindParams};
pub use config::CodecConfig;
pub use error::{PacketCodecError, Result};
pub use packet::{ChannelSource, Direction, PacketCodec, PacketDescriptor, PacketRecord};
pub use value::{ChannelValue, ParseValueError};
