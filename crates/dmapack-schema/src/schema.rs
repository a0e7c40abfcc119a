use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use tracing::debug;

use dmapack_codec::{ChannelDescriptor, Direction, PacketCodec, PacketCodecError, PacketDescriptor};

use crate::config::LoadConfig;
use crate::error::{Result, SchemaError};
use crate::layout::LayoutDocument;

/// Ordered read and write packets with their codecs.
///
/// Word `i` of a transfer in either direction belongs to packet `i` of that
/// direction. Channel names are unique across both directions.
#[derive(Debug, Clone)]
pub struct Schema {
    read: Vec<PacketCodec>,
    write: Vec<PacketCodec>,
    bitfile: Option<String>,
}

impl Schema {
    /// Validate packet descriptors and derive their codecs.
    pub fn new(
        read: Vec<PacketDescriptor>,
        write: Vec<PacketDescriptor>,
    ) -> dmapack_codec::Result<Self> {
        let mut names = HashSet::new();
        let read = build_codecs(Direction::Read, read, &mut names)?;
        let write = build_codecs(Direction::Write, write, &mut names)?;
        Ok(Self {
            read,
            write,
            bitfile: None,
        })
    }

    /// Parse a JSON layout document and build its schema.
    pub fn from_json_str(json: &str) -> Result<Self> {
        LayoutDocument::from_json_str(json)?.to_schema()
    }

    /// Load a layout file with default limits.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_file_with_config(path, LoadConfig::default())
    }

    /// Load a layout file, reading at most `config.max_layout_file_size` bytes.
    pub fn from_file_with_config(path: impl AsRef<Path>, config: LoadConfig) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|err| {
            SchemaError::LoadFailed(format!("failed opening layout {}: {err}", path.display()))
        })?;
        let metadata = file
            .metadata()
            .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
        if !metadata.is_file() {
            return Err(SchemaError::LoadFailed(format!(
                "layout path is not a regular file: {}",
                path.display()
            )));
        }

        let max_bytes = config.max_layout_file_size;
        if metadata.len() > max_bytes as u64 {
            return Err(SchemaError::LoadFailed(format!(
                "layout file too large ({} bytes, max {max_bytes}): {}",
                metadata.len(),
                path.display()
            )));
        }

        let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
        let mut content = String::new();
        file.take(read_limit)
            .read_to_string(&mut content)
            .map_err(|err| {
                SchemaError::LoadFailed(format!("failed reading layout {}: {err}", path.display()))
            })?;
        if content.len() > max_bytes {
            return Err(SchemaError::LoadFailed(format!(
                "layout file too large while reading: {}",
                path.display()
            )));
        }

        debug!(path = %path.display(), bytes = content.len(), "loaded layout file");
        Self::from_json_str(&content)
    }

    /// Attach the name of the bitfile this layout belongs to.
    pub fn with_bitfile(mut self, bitfile: impl Into<String>) -> Self {
        self.bitfile = Some(bitfile.into());
        self
    }

    pub fn bitfile(&self) -> Option<&str> {
        self.bitfile.as_deref()
    }

    /// Packet codecs of one direction, in transfer order.
    pub fn codecs(&self, direction: Direction) -> &[PacketCodec] {
        match direction {
            Direction::Read => &self.read,
            Direction::Write => &self.write,
        }
    }

    pub fn read_codecs(&self) -> &[PacketCodec] {
        &self.read
    }

    pub fn write_codecs(&self) -> &[PacketCodec] {
        &self.write
    }

    /// Words per transfer in `direction`.
    pub fn word_count(&self, direction: Direction) -> usize {
        self.codecs(direction).len()
    }

    /// Every channel with its direction: read packets first, then write.
    pub fn channels(&self) -> impl Iterator<Item = (Direction, &ChannelDescriptor)> {
        self.read
            .iter()
            .chain(self.write.iter())
            .flat_map(|codec| {
                let direction = codec.descriptor().direction;
                codec.descriptor().channels.iter().map(move |c| (direction, c))
            })
    }

    /// Look up a channel by name.
    pub fn channel(&self, name: &str) -> Option<(Direction, &ChannelDescriptor)> {
        self.channels().find(|(_, c)| c.name == name)
    }

    pub fn channel_count(&self) -> usize {
        self.channels().count()
    }
}

fn build_codecs(
    direction: Direction,
    packets: Vec<PacketDescriptor>,
    names: &mut HashSet<String>,
) -> dmapack_codec::Result<Vec<PacketCodec>> {
    let mut codecs = Vec::with_capacity(packets.len());
    for (i, packet) in packets.into_iter().enumerate() {
        let label = packet.label();
        if packet.direction != direction {
            return Err(PacketCodecError::invalid_configuration(
                label,
                format!("listed under {direction} packets"),
            ));
        }
        if packet.index != i + 1 {
            return Err(PacketCodecError::invalid_configuration(
                label,
                format!("expected index {} for position {}", i + 1, i + 1),
            ));
        }
        for channel in &packet.channels {
            if !names.insert(channel.name.clone()) {
                return Err(PacketCodecError::invalid_configuration(
                    label,
                    format!("channel name '{}' is already used", channel.name),
                ));
            }
        }
        codecs.push(PacketCodec::new(packet)?);
    }
    Ok(codecs)
}
