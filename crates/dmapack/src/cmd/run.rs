use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use dmapack_codec::CodecConfig;
use dmapack_session::{SessionConfig, TransferSession};
use dmapack_transport::{FifoConfig, WordFifo};
use tracing::info;

use crate::cmd::{load_schema, parse_assignments, parse_duration, RunArgs};
use crate::exit::{session_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_channels, ChannelRow, OutputFormat};

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = load_schema(&args.layout)?;
    let assignments = parse_assignments(&args.set)?;
    let timeout = parse_duration(&args.timeout)?;

    let config = SessionConfig {
        codec: CodecConfig {
            strict_range: args.strict,
        },
        fifo: FifoConfig {
            read_timeout: timeout,
            write_timeout: timeout,
        },
        ..SessionConfig::default()
    };
    let mut session = TransferSession::new(schema, config);
    let mut fifo = connect(&args)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut cycle = 0u64;
    while running.load(Ordering::SeqCst) && (args.count == 0 || cycle < args.count) {
        cycle += 1;
        session
            .cycle(&mut fifo, |table| {
                for (name, value) in &assignments {
                    table.set(name, *value)?;
                }
                Ok(())
            })
            .map_err(|err| session_error(&format!("cycle {cycle} failed"), err))?;

        let rows = table_rows(&session);
        print_channels(&rows, Some(cycle), format);
    }

    info!(cycles = cycle, "transfer loop finished");
    Ok(SUCCESS)
}

fn table_rows(session: &TransferSession) -> Vec<ChannelRow> {
    session
        .schema()
        .channels()
        .map(|(direction, channel)| {
            ChannelRow::new(&channel.name, direction, session.table().get(&channel.name))
        })
        .collect()
}

#[cfg(unix)]
fn connect(args: &RunArgs) -> CliResult<impl WordFifo> {
    dmapack_transport::FifoSocket::connect(&args.socket)
        .map_err(|err| crate::exit::transport_error("connect failed", err))
}

#[cfg(not(unix))]
fn connect(args: &RunArgs) -> CliResult<dmapack_transport::LoopbackFifo> {
    Err(CliError::new(
        crate::exit::FAILURE,
        format!(
            "FIFO bridge sockets require Unix domain sockets: {}",
            args.socket.display()
        ),
    ))
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
