use dmapack_codec::CodecConfig;
use dmapack_session::{SessionConfig, TransferSession};

use crate::cmd::{load_schema, parse_assignments, EncodeArgs};
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_words, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = load_schema(&args.layout)?;
    let assignments = parse_assignments(&args.set)?;

    let config = SessionConfig {
        codec: CodecConfig {
            strict_range: args.strict,
        },
        unset_outputs: args.require_all,
        ..SessionConfig::default()
    };
    let mut session = TransferSession::new(schema, config);
    for (name, value) in assignments {
        session
            .set_channel(&name, value)
            .map_err(|err| session_error("encode failed", err))?;
    }

    let words = session
        .pack_transfer()
        .map_err(|err| session_error("encode failed", err))?;
    print_words(&words, format);
    Ok(SUCCESS)
}
