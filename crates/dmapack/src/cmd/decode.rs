use dmapack_codec::{parse_bits, Direction, PacketCodecError, WORD_BITS};
use tracing::debug;

use crate::cmd::{load_schema, DecodeArgs};
use crate::exit::{codec_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_channels, ChannelRow, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = load_schema(&args.layout)?;
    let direction = Direction::from(args.direction);
    let codecs = schema.codecs(direction);

    if args.words.len() != codecs.len() {
        return Err(codec_error(
            "decode failed",
            PacketCodecError::WordCountMismatch {
                direction: direction.to_string(),
                expected: codecs.len(),
                actual: args.words.len(),
            },
        ));
    }

    let mut rows = Vec::new();
    for (codec, text) in codecs.iter().zip(&args.words) {
        let word = parse_word(text)?;
        let record = codec
            .unpack_word(word)
            .map_err(|err| codec_error("decode failed", err))?;
        debug!(packet = %codec.descriptor().label(), word, "decoded");
        rows.extend(
            record
                .iter()
                .map(|(name, value)| ChannelRow::new(name, direction, Some(value))),
        );
    }

    print_channels(&rows, None, format);
    Ok(SUCCESS)
}

/// Accepts `0x` hex, `0b` or bare 64-digit binary, or decimal.
fn parse_word(text: &str) -> CliResult<u64> {
    let text = text.trim();
    if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        return u64::from_str_radix(&hex.replace('_', ""), 16)
            .map_err(|err| CliError::new(USAGE, format!("invalid hex word '{text}': {err}")));
    }

    let binary = text.strip_prefix("0b").unwrap_or(text);
    let digits = binary.chars().filter(|c| *c != '_').count();
    if text.starts_with("0b") || digits == WORD_BITS as usize {
        return parse_bits(binary).map_err(|err| codec_error(&format!("word '{text}'"), err));
    }

    text.parse::<u64>()
        .map_err(|err| CliError::new(USAGE, format!("invalid word '{text}': {err}")))
}
