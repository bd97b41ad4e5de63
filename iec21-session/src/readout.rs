//! Mode C readout session
//!
//! Drives one complete exchange with a meter: identification handshake,
//! readout select, block consumption and trailer verification. The
//! session owns its transport and closes it on every exit path.

use bytes::{Bytes, BytesMut};
use tokio::sync::mpsc;

use iec21_core::{ChecksumStatus, DatasetRecord, Reading, SessionEvent};
use iec21_transport::{StopToken, TransportLayer};

use crate::bcc;
use crate::dataset::parse_line;
use crate::error::{Iec21Error, Iec21Result};
use crate::framer::LineFramer;
use crate::ident::Identification;
use crate::state::ReadoutState;
use crate::statistics::ReadoutStatistics;

/// Identification request message: `/?!<CR><LF>`
pub const REQUEST_MESSAGE: [u8; 5] = [0x2f, 0x3f, 0x21, 0x0d, 0x0a];

/// Start-of-text byte opening a checksummed block
pub const STX: u8 = 0x02;

/// Block terminator line: `!<CR><LF>`
pub const TERMINATOR_LINE: [u8; 3] = [0x21, 0x0d, 0x0a];

/// Default capacity of the session event channel
const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Capacity of the event channel handed out by `subscribe`
    pub event_capacity: usize,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self {
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One mode C readout session over any transport
///
/// A session runs exactly one readout. After [`read_meter`] returns the
/// transport is closed; collected datasets and statistics stay
/// accessible, which matters after a checksum failure where the dataset
/// list is complete but unverified.
///
/// [`read_meter`]: ReadoutSession::read_meter
pub struct ReadoutSession<T: TransportLayer> {
    transport: T,
    config: SessionConfig,
    state: ReadoutState,
    framer: LineFramer,
    /// Raw block capture: STX, every block line, trailer
    capture: BytesMut,
    datasets: Vec<DatasetRecord>,
    identification: Option<Identification>,
    with_checksum: bool,
    checksum_status: ChecksumStatus,
    statistics: ReadoutStatistics,
    events: Option<mpsc::Sender<SessionEvent>>,
    stop: StopToken,
}

impl<T: TransportLayer> ReadoutSession<T> {
    /// Create a session over the given transport
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Create a session with explicit configuration
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        let stop = transport.stop_token();
        Self {
            transport,
            config,
            state: ReadoutState::default(),
            framer: LineFramer::new(),
            capture: BytesMut::new(),
            datasets: Vec::new(),
            identification: None,
            with_checksum: false,
            checksum_status: ChecksumStatus::NotPresent,
            statistics: ReadoutStatistics::new(),
            events: None,
            stop,
        }
    }

    /// Subscribe to session progress events
    ///
    /// Single consumer: a later call replaces the previous receiver.
    pub fn subscribe(&mut self) -> mpsc::Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel(self.config.event_capacity);
        self.events = Some(tx);
        rx
    }

    /// Stop handle for cancelling this session from another task
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Request cancellation of the running session
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Current session state
    pub fn state(&self) -> ReadoutState {
        self.state
    }

    /// Session statistics collected so far
    pub fn statistics(&self) -> &ReadoutStatistics {
        &self.statistics
    }

    /// Identification reply, once parsed
    pub fn identification(&self) -> Option<&Identification> {
        self.identification.as_ref()
    }

    /// Dataset records collected so far
    ///
    /// Complete after a checksum failure: the block was fully consumed
    /// before verification failed.
    pub fn datasets(&self) -> &[DatasetRecord] {
        &self.datasets
    }

    /// Reading assembled from whatever the session has collected
    ///
    /// `None` before the meter identified itself. After a checksum
    /// failure this carries the full dataset list with
    /// [`ChecksumStatus::Failed`].
    pub fn partial_reading(&self) -> Option<Reading> {
        let identification = self.identification.as_ref()?;
        Some(Reading::new(
            identification.meter_type.clone(),
            self.datasets.clone(),
            self.checksum_status,
        ))
    }

    /// Run one complete readout
    ///
    /// The transport is closed before this returns, success or not.
    pub async fn read_meter(&mut self) -> Iec21Result<Reading> {
        let result = self.run().await;

        if let Err(e) = self.transport.close().await {
            log::error!("Failed to close transport: {}", e);
        }

        if let Err(e) = &result {
            // A finished session keeps its state on later misuse
            if self.state != ReadoutState::Done {
                self.fail();
                self.emit(SessionEvent::Failed(e.to_string())).await;
            }
        }
        result
    }

    async fn run(&mut self) -> Iec21Result<Reading> {
        if self.state != ReadoutState::Idle {
            return Err(Iec21Error::Protocol(format!(
                "Session already ran (state {})",
                self.state.as_str()
            )));
        }

        self.transport.open().await?;

        self.send_command(&REQUEST_MESSAGE).await?;
        self.transition(ReadoutState::HandshakeSent)?;

        // Exactly one line answers the request
        let reply = match self.read_line().await? {
            Some(line) => line,
            None => {
                self.check_cancelled()?;
                Bytes::new()
            }
        };
        let identification = Identification::parse(&reply)?;
        log::info!(
            "Meter identified: type {}, baud hint {}",
            identification.meter_type,
            identification.baud_hint as char
        );

        self.send_command(&identification.select_command()).await?;
        self.identification = Some(identification);
        self.transition(ReadoutState::Identified)?;

        self.consume_block().await?;

        let checksum_status = if self.with_checksum {
            self.drain_trailer().await?;
            match bcc::verify_capture(&self.capture) {
                Ok(value) => {
                    log::info!("Checksum OK (0x{:02X})", value);
                    ChecksumStatus::Ok
                }
                Err(Iec21Error::Checksum { expected, actual }) => {
                    self.checksum_status = ChecksumStatus::Failed { expected, actual };
                    return Err(Iec21Error::Checksum { expected, actual });
                }
                Err(e) => return Err(e),
            }
        } else {
            log::info!("No checksum trailer to check");
            ChecksumStatus::NotPresent
        };
        self.checksum_status = checksum_status;

        let meter_type = match &self.identification {
            Some(identification) => identification.meter_type.clone(),
            None => return Err(Iec21Error::Protocol("Identification lost".to_string())),
        };
        let reading = Reading::new(meter_type, self.datasets.clone(), self.checksum_status);

        self.transition(ReadoutState::Done)?;
        log::info!(
            "Readout complete: {} datasets, meter id {:?}",
            reading.datasets.len(),
            reading.meter_id
        );
        self.emit(SessionEvent::Finished(reading.clone())).await;

        Ok(reading)
    }

    /// Consume block lines until the terminator
    async fn consume_block(&mut self) -> Iec21Result<()> {
        self.transition(ReadoutState::ReadingDatasets)?;

        loop {
            let line = match self.read_line().await? {
                Some(line) => line,
                None => {
                    self.check_cancelled()?;
                    return Err(Iec21Error::TruncatedBlock);
                }
            };

            // A block opening with STX carries an ETX/BCC trailer. The
            // marker stays in the raw capture but is stripped from the
            // parse view.
            let first_line = self.capture.is_empty();
            self.capture.extend_from_slice(&line);
            self.statistics.add_bytes_captured(line.len());

            let parse_view = if first_line && line.first() == Some(&STX) {
                self.with_checksum = true;
                line.slice(1..)
            } else {
                line
            };

            if parse_view.as_ref() == TERMINATOR_LINE {
                if self.with_checksum {
                    self.transition(ReadoutState::ChecksumPending)?;
                }
                return Ok(());
            }

            let record = parse_line(&parse_view);
            if record.is_parse_error() {
                self.statistics.increment_parse_errors();
            } else {
                self.statistics.increment_datasets_parsed();
            }
            self.datasets.push(record.clone());
            self.emit(SessionEvent::DatasetAdded(record)).await;
        }
    }

    /// Drain the ETX/BCC trailer into the capture
    ///
    /// The trailer carries no line terminator, so it never comes out of
    /// the framer as a line. Read raw chunks until two trailer bytes are
    /// buffered, then append the entire residue. A stream that ends
    /// early still proceeds to verification with what arrived.
    async fn drain_trailer(&mut self) -> Iec21Result<()> {
        while self.framer.residue().len() < 2 {
            match self.transport.read_chunk().await? {
                Some(chunk) => {
                    self.statistics.increment_chunks_received();
                    self.framer.push(&chunk);
                }
                None => {
                    self.check_cancelled()?;
                    break;
                }
            }
        }

        let residue = self.framer.take_residue();
        log::debug!("Trailer drained: {} residual bytes", residue.len());
        self.capture.extend_from_slice(&residue);
        self.statistics.add_bytes_captured(residue.len());
        Ok(())
    }

    /// Take the next complete line, reading chunks as needed
    ///
    /// `Ok(None)` means the stream ended (or was stopped) before another
    /// line completed.
    async fn read_line(&mut self) -> Iec21Result<Option<Bytes>> {
        loop {
            if let Some(line) = self.framer.next_line() {
                self.statistics.increment_lines_read();
                log::trace!("<<< {:?}", String::from_utf8_lossy(&line));
                return Ok(Some(line));
            }
            match self.transport.read_chunk().await? {
                Some(chunk) => {
                    self.statistics.increment_chunks_received();
                    self.framer.push(&chunk);
                }
                None => return Ok(None),
            }
        }
    }

    async fn send_command(&mut self, command: &[u8]) -> Iec21Result<()> {
        self.check_cancelled()?;
        log::debug!(">>> {}", hex_dump(command));
        self.transport.write_all(command).await?;
        self.transport.flush().await?;
        self.statistics.increment_commands_sent();
        Ok(())
    }

    fn transition(&mut self, new_state: ReadoutState) -> Iec21Result<()> {
        self.state.validate_transition(new_state)?;
        log::debug!(
            "Session state: {} -> {}",
            self.state.as_str(),
            new_state.as_str()
        );
        self.state = new_state;
        Ok(())
    }

    /// Move to `Errored`, valid from any state
    fn fail(&mut self) {
        if self.state != ReadoutState::Errored {
            log::debug!("Session state: {} -> Errored", self.state.as_str());
            self.state = ReadoutState::Errored;
        }
    }

    fn check_cancelled(&self) -> Iec21Result<()> {
        if self.stop.is_stopped() {
            Err(Iec21Error::Cancelled)
        } else {
            Ok(())
        }
    }

    async fn emit(&mut self, event: SessionEvent) {
        let Some(tx) = self.events.clone() else {
            return;
        };
        if tx.send(event).await.is_err() {
            // Receiver dropped; stop emitting for the rest of the session
            self.events = None;
        }
    }
}

/// Space-separated lowercase hex rendering of a wire command
fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect::<Vec<_>>()
        .join(" ")
}
