use std::collections::HashMap;

use dmapack_codec::{ChannelKind, ChannelSource, ChannelValue, Direction, PacketRecord};
use dmapack_schema::Schema;

use crate::error::{Result, SessionError};

/// Current engineering-unit value of every channel in a schema.
///
/// Entries are keyed by channel name and kept in schema order (read
/// channels, then write channels). The set of names is fixed when the table
/// is built; entries are never removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelTable {
    entries: Vec<(String, Option<ChannelValue>)>,
    index: HashMap<String, usize>,
}

impl ChannelTable {
    /// Table with every channel at zero (`false` for Boolean channels).
    pub fn for_schema(schema: &Schema) -> Self {
        Self::build(schema, |_| true)
    }

    /// Like [`for_schema`](Self::for_schema), but write channels start unset.
    pub fn for_schema_unset_outputs(schema: &Schema) -> Self {
        Self::build(schema, |direction| direction == Direction::Read)
    }

    fn build(schema: &Schema, initialized: impl Fn(Direction) -> bool) -> Self {
        let mut entries = Vec::with_capacity(schema.channel_count());
        let mut index = HashMap::with_capacity(schema.channel_count());
        for (direction, channel) in schema.channels() {
            let value = initialized(direction).then(|| zero_value(&channel.kind));
            index.insert(channel.name.clone(), entries.len());
            entries.push((channel.name.clone(), value));
        }
        Self { entries, index }
    }

    /// Current value, or `None` if the channel is unknown or unset.
    pub fn get(&self, name: &str) -> Option<ChannelValue> {
        self.index.get(name).and_then(|&i| self.entries[i].1)
    }

    /// Assign a channel, returning its previous value.
    pub fn set(
        &mut self,
        name: &str,
        value: impl Into<ChannelValue>,
    ) -> Result<Option<ChannelValue>> {
        let i = *self
            .index
            .get(name)
            .ok_or_else(|| SessionError::UnknownChannel(name.to_string()))?;
        Ok(self.entries[i].1.replace(value.into()))
    }

    /// Whether the schema names this channel.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Channels in schema order with their value, `None` when unset.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<ChannelValue>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Number of channels, set or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Overwrite the channels of decoded packets.
    ///
    /// Records come from the schema's own codecs, so every name is known.
    pub(crate) fn merge(&mut self, records: Vec<PacketRecord>) {
        for record in records {
            for (name, value) in record.into_entries() {
                if let Some(&i) = self.index.get(&name) {
                    self.entries[i].1 = Some(value);
                }
            }
        }
    }
}

impl ChannelSource for ChannelTable {
    fn channel_value(&self, name: &str) -> Option<ChannelValue> {
        self.get(name)
    }
}

fn zero_value(kind: &ChannelKind) -> ChannelValue {
    match kind {
        ChannelKind::Boolean => ChannelValue::Bool(false),
        ChannelKind::Pwm { .. }
        | ChannelKind::FixedPoint { .. }
        | ChannelKind::ScaledInt16 { .. } => ChannelValue::Real(0.0),
    }
}
