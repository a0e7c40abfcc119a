use tracing::{debug, warn};

use dmapack_codec::{ChannelValue, Direction, PacketCodec, PacketCodecError, PacketRecord};
use dmapack_schema::Schema;
use dmapack_transport::WordFifo;

use crate::config::SessionConfig;
use crate::error::{Result, SessionError};
use crate::table::ChannelTable;

/// One hardware session: a schema, its channel table and transfer settings.
///
/// Transfers are atomic with respect to the table. A read transfer decodes
/// every word before any entry is overwritten, so a failed transfer (wrong
/// word count, undecodable word, FIFO error) leaves the table as it was.
#[derive(Debug, Clone)]
pub struct TransferSession {
    schema: Schema,
    table: ChannelTable,
    config: SessionConfig,
    transfers: u64,
}

impl TransferSession {
    pub fn new(schema: Schema, config: SessionConfig) -> Self {
        let table = if config.unset_outputs {
            ChannelTable::for_schema_unset_outputs(&schema)
        } else {
            ChannelTable::for_schema(&schema)
        };
        debug!(
            channels = table.len(),
            read_words = schema.word_count(Direction::Read),
            write_words = schema.word_count(Direction::Write),
            "transfer session created"
        );
        Self {
            schema,
            table,
            config,
            transfers: 0,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn table(&self) -> &ChannelTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ChannelTable {
        &mut self.table
    }

    /// Completed read and write transfers.
    pub fn transfers(&self) -> u64 {
        self.transfers
    }

    /// Decode a read transfer into the table.
    pub fn unpack_transfer(&mut self, words: &[u64]) -> Result<()> {
        let records = self.decode_all(words.len(), |codec, i| codec.unpack_word(words[i]))?;
        self.commit(records);
        Ok(())
    }

    /// Decode a read transfer given as 64-character binary strings.
    pub fn unpack_transfer_bits<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<()> {
        let records =
            self.decode_all(lines.len(), |codec, i| codec.unpack_bits(lines[i].as_ref()))?;
        self.commit(records);
        Ok(())
    }

    /// Encode the write channels into one word per write packet.
    pub fn pack_transfer(&self) -> Result<Vec<u64>> {
        let words = self
            .schema
            .write_codecs()
            .iter()
            .map(|codec| codec.pack_word(&self.table, &self.config.codec))
            .collect::<dmapack_codec::Result<Vec<_>>>()
            .map_err(|err| {
                warn!(error = %err, "write transfer rejected");
                err
            })?;
        Ok(words)
    }

    /// Current value of a channel.
    ///
    /// Fails with `UnknownChannel` for names outside the schema and with
    /// `MissingChannel` for a write channel that was never assigned.
    pub fn get_channel(&self, name: &str) -> Result<ChannelValue> {
        if !self.table.contains(name) {
            return Err(SessionError::UnknownChannel(name.to_string()));
        }
        self.table
            .get(name)
            .ok_or_else(|| PacketCodecError::MissingChannel(name.to_string()).into())
    }

    /// Assign a channel.
    pub fn set_channel(&mut self, name: &str, value: impl Into<ChannelValue>) -> Result<()> {
        self.table.set(name, value)?;
        Ok(())
    }

    /// Read one transfer from `fifo` and decode it into the table.
    pub fn read_fifo<F: WordFifo + ?Sized>(&mut self, fifo: &mut F) -> Result<()> {
        let count = self.schema.word_count(Direction::Read);
        if count == 0 {
            return Ok(());
        }
        let words = fifo
            .read_words(count, self.config.fifo.read_timeout)
            .map_err(|err| {
                warn!(error = %err, count, "FIFO read failed");
                err
            })?;
        self.unpack_transfer(&words)
    }

    /// Encode the write channels and write them to `fifo`.
    pub fn write_fifo<F: WordFifo + ?Sized>(&mut self, fifo: &mut F) -> Result<()> {
        let words = self.pack_transfer()?;
        if words.is_empty() {
            return Ok(());
        }
        fifo.write_words(&words, self.config.fifo.write_timeout)
            .map_err(|err| {
                warn!(error = %err, count = words.len(), "FIFO write failed");
                err
            })?;
        self.transfers += 1;
        debug!(direction = "write", words = words.len(), "transfer complete");
        Ok(())
    }

    /// One control cycle: read inputs, let `app` update the table, write outputs.
    pub fn cycle<F, A>(&mut self, fifo: &mut F, app: A) -> Result<()>
    where
        F: WordFifo + ?Sized,
        A: FnOnce(&mut ChannelTable) -> Result<()>,
    {
        self.read_fifo(fifo)?;
        app(&mut self.table)?;
        self.write_fifo(fifo)
    }

    fn decode_all(
        &self,
        actual: usize,
        decode: impl Fn(&PacketCodec, usize) -> dmapack_codec::Result<PacketRecord>,
    ) -> Result<Vec<PacketRecord>> {
        let codecs = self.schema.read_codecs();
        if actual != codecs.len() {
            let err = PacketCodecError::WordCountMismatch {
                direction: Direction::Read.to_string(),
                expected: codecs.len(),
                actual,
            };
            warn!(error = %err, "read transfer rejected");
            return Err(err.into());
        }

        codecs
            .iter()
            .enumerate()
            .map(|(i, codec)| decode(codec, i))
            .collect::<dmapack_codec::Result<Vec<_>>>()
            .map_err(|err| {
                warn!(error = %err, "read transfer rejected");
                err.into()
            })
    }

    fn commit(&mut self, records: Vec<PacketRecord>) {
        let words = records.len();
        self.table.merge(records);
        self.transfers += 1;
        debug!(direction = "read", words, "transfer complete");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use dmapack_codec::{format_bits, ChannelKind, CodecConfig, PacketDescriptor};
    use dmapack_transport::{FifoConfig, LoopbackFifo, TransportError};

    use super::*;

    fn schema() -> Schema {
        Schema::new(
            vec![
                PacketDescriptor::with_ordinal_lanes(
                    Direction::Read,
                    1,
                    [
                        ("Ready", ChannelKind::Boolean),
                        ("Temp", ChannelKind::ScaledInt16 { scale: 100.0 }),
                    ],
                ),
                PacketDescriptor::with_ordinal_lanes(
                    Direction::Read,
                    2,
                    [("Duty", ChannelKind::Pwm { period: 100 })],
                ),
            ],
            vec![PacketDescriptor::with_ordinal_lanes(
                Direction::Write,
                1,
                [
                    ("Start", ChannelKind::Boolean),
                    ("Setpoint", ChannelKind::ScaledInt16 { scale: 10.0 }),
                ],
            )],
        )
        .unwrap()
    }

    fn short_timeouts() -> SessionConfig {
        SessionConfig {
            fifo: FifoConfig {
                read_timeout: Duration::from_millis(50),
                write_timeout: Duration::from_millis(50),
            },
            ..SessionConfig::default()
        }
    }

    // Ready = 1, Temp = +50.0 (16384 of 32767 at scale 100); Duty 25 of 100 ticks.
    const READ_WORDS: [u64; 2] = [0x8000_4000_0000_0000, (25u64 << 32) | 75];

    #[test]
    fn start_setpoint_transfer_word() {
        let mut session = TransferSession::new(schema(), SessionConfig::default());
        session.set_channel("Start", true).unwrap();
        session.set_channel("Setpoint", 5.0).unwrap();
        assert_eq!(session.pack_transfer().unwrap(), vec![0x8000_4000_0000_0000]);
    }

    #[test]
    fn unpack_transfer_updates_read_channels() {
        let mut session = TransferSession::new(schema(), SessionConfig::default());
        let words = [0x8000_4000_0000_0000, (25u64 << 32) | 75];
        session.unpack_transfer(&words).unwrap();

        assert_eq!(session.get_channel("Ready").unwrap(), ChannelValue::Bool(true));
        let temp = session.get_channel("Temp").unwrap().as_f64();
        assert!((temp - 50.0).abs() < 0.01);
        assert_eq!(session.get_channel("Duty").unwrap(), ChannelValue::Real(25.0));
        assert_eq!(session.transfers(), 1);
    }

    #[test]
    fn word_count_mismatch_leaves_table_unchanged() {
        let mut session = TransferSession::new(schema(), SessionConfig::default());
        let before = session.table().clone();
        let err = session.unpack_transfer(&[0]).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Codec(PacketCodecError::WordCountMismatch {
                expected: 2,
                actual: 1,
                ..
            })
        ));
        assert_eq!(session.table(), &before);
        assert_eq!(session.transfers(), 0);
    }

    #[test]
    fn non_binary_digit_leaves_table_unchanged() {
        let mut session = TransferSession::new(schema(), SessionConfig::default());
        let before = session.table().clone();
        let good = format_bits(0x8000_0000_0000_0000);
        let mut bad = format_bits(0);
        bad.replace_range(5..6, "x");

        let err = session.unpack_transfer_bits(&[good, bad]).unwrap_err();
        assert!(matches!(
            err,
            SessionError::Codec(PacketCodecError::NonBinaryDigit {
                position: 5,
                found: 'x'
            })
        ));
        assert_eq!(session.table(), &before);
    }

    #[test]
    fn unpack_transfer_bits_decodes() {
        let mut session = TransferSession::new(schema(), SessionConfig::default());
        let lines = [format_bits(0x8000_0000_0000_0000), format_bits(100)];
        session.unpack_transfer_bits(&lines).unwrap();
        assert_eq!(session.get_channel("Ready").unwrap(), ChannelValue::Bool(true));
        assert_eq!(session.get_channel("Duty").unwrap(), ChannelValue::Real(0.0));
    }

    #[test]
    fn unset_output_is_missing_channel() {
        let config = SessionConfig {
            unset_outputs: true,
            ..SessionConfig::default()
        };
        let mut session = TransferSession::new(schema(), config);
        session.set_channel("Start", true).unwrap();

        let err = session.pack_transfer().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Codec(PacketCodecError::MissingChannel(ref name)) if name == "Setpoint"
        ));
        assert!(matches!(
            session.get_channel("Setpoint"),
            Err(SessionError::Codec(PacketCodecError::MissingChannel(_)))
        ));
    }

    #[test]
    fn unknown_channel_rejected() {
        let mut session = TransferSession::new(schema(), SessionConfig::default());
        assert!(matches!(
            session.set_channel("Nope", 1.0),
            Err(SessionError::UnknownChannel(_))
        ));
        assert!(matches!(
            session.get_channel("Nope"),
            Err(SessionError::UnknownChannel(_))
        ));
    }

    #[test]
    fn strict_mode_rejects_out_of_range_output() {
        let config = SessionConfig {
            codec: CodecConfig::strict(),
            ..SessionConfig::default()
        };
        let mut session = TransferSession::new(schema(), config);
        session.set_channel("Setpoint", 11.0).unwrap();
        assert!(matches!(
            session.pack_transfer(),
            Err(SessionError::Codec(PacketCodecError::OutOfRange { .. }))
        ));

        let mut lenient = TransferSession::new(schema(), SessionConfig::default());
        lenient.set_channel("Setpoint", 11.0).unwrap();
        assert_eq!(lenient.pack_transfer().unwrap(), vec![0x7FFF_0000_0000]);
    }

    #[test]
    fn fifo_cycle_over_loopback() {
        let (mut host, mut device) = LoopbackFifo::pair();
        let mut session = TransferSession::new(schema(), short_timeouts());

        device
            .write_words(&READ_WORDS, Duration::from_secs(1))
            .unwrap();
        session
            .cycle(&mut host, |table| {
                let ready = table.get("Ready").map(|v| v.as_bool()).unwrap_or(false);
                table.set("Start", ready)?;
                table.set("Setpoint", 5.0)?;
                Ok(())
            })
            .unwrap();

        let written = device.read_words(1, Duration::from_secs(1)).unwrap();
        assert_eq!(written, vec![0x8000_4000_0000_0000]);
        assert_eq!(session.transfers(), 2);
    }

    #[test]
    fn read_timeout_surfaces_and_keeps_table() {
        let (mut host, _device) = LoopbackFifo::pair();
        let mut session = TransferSession::new(schema(), short_timeouts());
        let before = session.table().clone();

        let err = session.read_fifo(&mut host).unwrap_err();
        assert!(err.is_timeout());
        assert!(matches!(
            err,
            SessionError::Transport(TransportError::Timeout(_))
        ));
        assert_eq!(session.table(), &before);
    }

    #[test]
    fn shared_session_across_threads() {
        let session = Arc::new(Mutex::new(TransferSession::new(
            schema(),
            short_timeouts(),
        )));
        let (mut host, mut device) = LoopbackFifo::pair();

        let app = {
            let session = Arc::clone(&session);
            std::thread::spawn(move || {
                let mut session = session.lock().unwrap();
                session.set_channel("Start", true).unwrap();
                session.set_channel("Setpoint", -10.0).unwrap();
            })
        };
        app.join().unwrap();

        session.lock().unwrap().write_fifo(&mut host).unwrap();
        let written = device.read_words(1, Duration::from_secs(1)).unwrap();
        assert_eq!(written[0] >> 63, 1);
        // -10.0 at scale 10 is the full negative magnitude: sign set, magnitude bits clear.
        assert_eq!((written[0] >> 32) & 0xFFFF, 0x8000);
    }
}
