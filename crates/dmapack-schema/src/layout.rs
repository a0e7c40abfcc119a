//! JSON layout documents.
//!
//! ```json
//! {
//!   "bitfile": "controller.lvbitx",
//!   "read": [
//!     { "channels": [ { "name": "Ready", "type": "Boolean" } ] }
//!   ],
//!   "write": [
//!     { "channels": [
//!       { "name": "Start", "type": "Boolean" },
//!       { "name": "Setpoint", "type": "ScaledInt16", "scale": 10.0 }
//!     ] },
//!     { "channels": [ { "name": "Fan", "type": "PWM", "period": 200 } ] }
//!   ]
//! }
//! ```
//!
//! A channel without `lane` takes its ordinal position in the packet.

use serde::{Deserialize, Serialize};
use tracing::debug;

use dmapack_codec::{ChannelDescriptor, ChannelKind, Direction, KindParams, PacketDescriptor};

use crate::error::Result;
use crate::schema::Schema;

/// PWM period used when a PWM channel does not name one.
pub const DEFAULT_PWM_PERIOD: u32 = 100;

fn default_pwm_period() -> u32 {
    DEFAULT_PWM_PERIOD
}

/// Top-level layout document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayoutDocument {
    /// FPGA bitfile the layout belongs to. Informational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bitfile: Option<String>,
    #[serde(default = "default_pwm_period")]
    pub default_pwm_period: u32,
    #[serde(default)]
    pub read: Vec<PacketLayout>,
    #[serde(default)]
    pub write: Vec<PacketLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PacketLayout {
    pub channels: Vec<ChannelLayout>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChannelLayout {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lane: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub period: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_length: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integer_word_length: Option<i16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>,
}

impl LayoutDocument {
    /// Parse a layout document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Resolve type names and parameters into packet descriptors.
    pub fn packets(&self, direction: Direction) -> Result<Vec<PacketDescriptor>> {
        let layouts = match direction {
            Direction::Read => &self.read,
            Direction::Write => &self.write,
        };

        let mut packets = Vec::with_capacity(layouts.len());
        for (i, packet) in layouts.iter().enumerate() {
            let mut channels = Vec::with_capacity(packet.channels.len());
            for (ordinal, channel) in packet.channels.iter().enumerate() {
                channels.push(self.resolve_channel(channel, ordinal)?);
            }
            packets.push(PacketDescriptor::new(direction, i + 1, channels));
        }
        Ok(packets)
    }

    /// Build the schema this document describes.
    pub fn to_schema(&self) -> Result<Schema> {
        let schema = Schema::new(self.packets(Direction::Read)?, self.packets(Direction::Write)?)?;
        debug!(
            read_packets = self.read.len(),
            write_packets = self.write.len(),
            "layout resolved"
        );
        Ok(match &self.bitfile {
            Some(bitfile) => schema.with_bitfile(bitfile.clone()),
            None => schema,
        })
    }

    fn resolve_channel(&self, channel: &ChannelLayout, ordinal: usize) -> Result<ChannelDescriptor> {
        let params = KindParams {
            period: channel.period.or(Some(self.default_pwm_period)),
            word_length: channel.word_length,
            integer_word_length: channel.integer_word_length,
            scale: channel.scale,
        };
        let kind = ChannelKind::from_type_name(&channel.name, &channel.type_name, &params)?;
        let lane = channel
            .lane
            .unwrap_or_else(|| u8::try_from(ordinal).unwrap_or(u8::MAX));
        Ok(ChannelDescriptor::new(channel.name.clone(), kind, lane))
    }
}
