use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use dmapack_codec::{format_bits, ChannelValue, Direction};
use dmapack_schema::Schema;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// One channel value as shown to the user.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelRow {
    pub name: String,
    pub direction: &'static str,
    pub value: serde_json::Value,
}

impl ChannelRow {
    pub fn new(name: &str, direction: Direction, value: Option<ChannelValue>) -> Self {
        Self {
            name: name.to_string(),
            direction: direction.as_str(),
            value: value.map(json_value).unwrap_or(serde_json::Value::Null),
        }
    }

    fn value_text(&self) -> String {
        match &self.value {
            serde_json::Value::Null => "unset".to_string(),
            other => other.to_string(),
        }
    }
}

fn json_value(value: ChannelValue) -> serde_json::Value {
    match value {
        ChannelValue::Bool(b) => serde_json::Value::Bool(b),
        ChannelValue::Real(x) => serde_json::Number::from_f64(x)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
    }
}

#[derive(Serialize)]
struct ChannelsOutput<'a> {
    cycle: Option<u64>,
    channels: &'a [ChannelRow],
}

/// Print channel values. `cycle` tags rows produced by a transfer loop.
pub fn print_channels(rows: &[ChannelRow], cycle: Option<u64>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(&ChannelsOutput {
            cycle,
            channels: rows,
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["CHANNEL", "DIRECTION", "VALUE"]);
            for row in rows {
                table.add_row(vec![row.name.clone(), row.direction.to_string(), row.value_text()]);
            }
            if let Some(cycle) = cycle {
                println!("cycle {cycle}");
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            if let Some(cycle) = cycle {
                println!("cycle {cycle}");
            }
            for row in rows {
                println!("{} ({}) = {}", row.name, row.direction, row.value_text());
            }
        }
        OutputFormat::Raw => {
            for row in rows {
                println!("{}={}", row.name, row.value_text());
            }
        }
    }
}

#[derive(Serialize)]
struct WordOutput {
    packet: usize,
    hex: String,
    bits: String,
}

pub fn print_words(words: &[u64], format: OutputFormat) {
    let out: Vec<WordOutput> = words
        .iter()
        .enumerate()
        .map(|(i, word)| WordOutput {
            packet: i + 1,
            hex: format!("0x{word:016X}"),
            bits: format_bits(*word),
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&serde_json::json!({ "words": out })),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PACKET", "HEX", "BITS"]);
            for word in &out {
                table.add_row(vec![word.packet.to_string(), word.hex.clone(), word.bits.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for word in &out {
                println!("packet {}: {} {}", word.packet, word.hex, word.bits);
            }
        }
        OutputFormat::Raw => {
            for word in &out {
                println!("{}", word.hex);
            }
        }
    }
}

#[derive(Serialize)]
struct LayoutChannel {
    direction: &'static str,
    packet: usize,
    name: String,
    #[serde(rename = "type")]
    type_name: &'static str,
    params: String,
    bits: String,
}

#[derive(Serialize)]
struct LayoutOutput {
    bitfile: Option<String>,
    read_words: usize,
    write_words: usize,
    channels: Vec<LayoutChannel>,
}

pub fn print_layout(schema: &Schema, format: OutputFormat) {
    let channels: Vec<LayoutChannel> = [Direction::Read, Direction::Write]
        .into_iter()
        .flat_map(|direction| schema.codecs(direction).iter())
        .flat_map(|codec| {
            let descriptor = codec.descriptor();
            codec.layout().map(move |(channel, range)| LayoutChannel {
                direction: descriptor.direction.as_str(),
                packet: descriptor.index,
                name: channel.name.clone(),
                type_name: channel.kind.type_name(),
                params: channel.kind.to_string(),
                bits: format!("{}..{}", range.start, range.end),
            })
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&LayoutOutput {
            bitfile: schema.bitfile().map(str::to_string),
            read_words: schema.word_count(Direction::Read),
            write_words: schema.word_count(Direction::Write),
            channels,
        }),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DIRECTION", "PACKET", "CHANNEL", "TYPE", "BITS"]);
            for channel in &channels {
                table.add_row(vec![
                    channel.direction.to_string(),
                    channel.packet.to_string(),
                    channel.name.clone(),
                    channel.params.clone(),
                    channel.bits.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            if let Some(bitfile) = schema.bitfile() {
                println!("bitfile: {bitfile}");
            }
            for channel in &channels {
                println!(
                    "{} packet {} {} {} bits {}",
                    channel.direction, channel.packet, channel.name, channel.params, channel.bits
                );
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}
