use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use tracing::trace;

use crate::bits::{self, WORD_BITS};
use crate::channel::{decode_channel, encode_channel, ChannelDescriptor, ChannelKind};
use crate::config::CodecConfig;
use crate::error::{PacketCodecError, Result};
use crate::value::ChannelValue;

/// Transfer direction, seen from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Words read from the hardware FIFO.
    Read,
    /// Words written to the hardware FIFO.
    Write,
}

impl Direction {
    /// Lowercase name used in diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Read => "read",
            Direction::Write => "write",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The channels carried by one word in one direction.
#[derive(Debug, Clone, PartialEq)]
pub struct PacketDescriptor {
    pub direction: Direction,
    /// 1-based position within its direction. Diagnostics only.
    pub index: usize,
    pub channels: Vec<ChannelDescriptor>,
}

impl PacketDescriptor {
    /// Create a packet from descriptors with explicit lanes.
    pub fn new(direction: Direction, index: usize, channels: Vec<ChannelDescriptor>) -> Self {
        Self {
            direction,
            index,
            channels,
        }
    }

    /// Create a packet whose lanes follow the channels' ordinal positions.
    pub fn with_ordinal_lanes<N: Into<String>>(
        direction: Direction,
        index: usize,
        channels: impl IntoIterator<Item = (N, ChannelKind)>,
    ) -> Self {
        let channels = channels
            .into_iter()
            .enumerate()
            .map(|(lane, (name, kind))| {
                ChannelDescriptor::new(name, kind, u8::try_from(lane).unwrap_or(u8::MAX))
            })
            .collect();
        Self::new(direction, index, channels)
    }

    /// Human-readable label, e.g. `read packet 2`.
    pub fn label(&self) -> String {
        format!("{} packet {}", self.direction, self.index)
    }

    /// Sum of the channels' lane widths.
    pub fn bit_width(&self) -> u32 {
        self.channels.iter().map(|c| c.kind.bit_width()).sum()
    }
}

/// Anything pack can read channel values from.
pub trait ChannelSource {
    /// Current value of the named channel, if present.
    fn channel_value(&self, name: &str) -> Option<ChannelValue>;
}

impl ChannelSource for HashMap<String, ChannelValue> {
    fn channel_value(&self, name: &str) -> Option<ChannelValue> {
        self.get(name).copied()
    }
}

/// Decoded values of one word, in lane order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PacketRecord {
    entries: Vec<(String, ChannelValue)>,
}

impl PacketRecord {
    /// Value of the named channel.
    pub fn get(&self, name: &str) -> Option<ChannelValue> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Entries in lane order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ChannelValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the record and return its entries.
    pub fn into_entries(self) -> Vec<(String, ChannelValue)> {
        self.entries
    }
}

impl ChannelSource for PacketRecord {
    fn channel_value(&self, name: &str) -> Option<ChannelValue> {
        self.get(name)
    }
}

impl<N: Into<String>> FromIterator<(N, ChannelValue)> for PacketRecord {
    fn from_iter<I: IntoIterator<Item = (N, ChannelValue)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(n, v)| (n.into(), v)).collect(),
        }
    }
}

/// Converts one 64-bit word to and from the values of one packet.
///
/// The layout is validated once at construction; the codec is immutable
/// afterwards.
#[derive(Debug, Clone)]
pub struct PacketCodec {
    descriptor: PacketDescriptor,
    ranges: Vec<Range<u32>>,
}

impl PacketCodec {
    /// Validate a packet layout and build its codec.
    pub fn new(descriptor: PacketDescriptor) -> Result<Self> {
        let label = descriptor.label();
        let has_pwm = descriptor
            .channels
            .iter()
            .any(|c| matches!(c.kind, ChannelKind::Pwm { .. }));
        if has_pwm && descriptor.channels.len() > 1 {
            return Err(PacketCodecError::invalid_configuration(
                label,
                "a PWM channel occupies the whole word and must be the only channel",
            ));
        }

        let total = descriptor.bit_width();
        if total > WORD_BITS {
            return Err(PacketCodecError::invalid_configuration(
                label,
                format!("channels need {total} bits, a word holds {WORD_BITS}"),
            ));
        }

        let mut ranges = Vec::with_capacity(descriptor.channels.len());
        let mut occupied = 0u64;
        for (i, channel) in descriptor.channels.iter().enumerate() {
            if descriptor.channels[..i].iter().any(|c| c.name == channel.name) {
                return Err(PacketCodecError::invalid_configuration(
                    label,
                    format!("duplicate channel '{}'", channel.name),
                ));
            }
            channel.kind.validate(&channel.name)?;
            let range = channel.bit_range()?;
            let lane_mask = bits::insert(0, range.clone(), u64::MAX);
            if occupied & lane_mask != 0 {
                return Err(PacketCodecError::invalid_configuration(
                    label,
                    format!(
                        "channel '{}' bits {}..{} overlap another channel",
                        channel.name, range.start, range.end
                    ),
                ));
            }
            occupied |= lane_mask;
            ranges.push(range);
        }

        Ok(Self { descriptor, ranges })
    }

    pub fn descriptor(&self) -> &PacketDescriptor {
        &self.descriptor
    }

    /// Channels with their bit ranges, in lane order.
    pub fn layout(&self) -> impl Iterator<Item = (&ChannelDescriptor, Range<u32>)> {
        self.descriptor
            .channels
            .iter()
            .zip(self.ranges.iter().cloned())
    }

    /// Decode every channel of the packet from `word`.
    ///
    /// Either all channels decode or none do.
    pub fn unpack_word(&self, word: u64) -> Result<PacketRecord> {
        let mut entries = Vec::with_capacity(self.descriptor.channels.len());
        for channel in &self.descriptor.channels {
            entries.push((channel.name.clone(), decode_channel(channel, word)?));
        }
        trace!(packet = %self.descriptor.label(), word, "unpacked word");
        Ok(PacketRecord { entries })
    }

    /// Decode a word given in its 64-character binary text form.
    pub fn unpack_bits(&self, text: &str) -> Result<PacketRecord> {
        self.unpack_word(bits::parse_bits(text)?)
    }

    /// Encode the packet's channels, read from `source`, into one word.
    ///
    /// Bits not covered by any channel are zero.
    pub fn pack_word<S: ChannelSource + ?Sized>(
        &self,
        source: &S,
        config: &CodecConfig,
    ) -> Result<u64> {
        let mut word = 0u64;
        for (channel, range) in self.layout() {
            let value = source
                .channel_value(&channel.name)
                .ok_or_else(|| PacketCodecError::MissingChannel(channel.name.clone()))?;
            let field = encode_channel(channel, value, config)?;
            word = bits::insert(word, range, field);
        }
        trace!(packet = %self.descriptor.label(), word, "packed word");
        Ok(word)
    }
}
