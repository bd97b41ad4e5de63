//! Readout session state machine

use crate::error::{Iec21Error, Iec21Result};

/// Readout session state
///
/// Tracks where a mode C session is in its exchange so operations are
/// only performed in the right order.
///
/// # State Transitions
/// ```text
/// Idle -> HandshakeSent (request message written)
/// HandshakeSent -> Identified (identification parsed, readout select written)
/// Identified -> ReadingDatasets (block consumption started)
/// ReadingDatasets -> ChecksumPending (terminator seen, checksummed block)
/// ReadingDatasets -> Done (terminator seen, plain block)
/// ChecksumPending -> Done (trailer drained and verified)
/// any -> Errored (failure or cancellation)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadoutState {
    /// No exchange has started yet (initial state)
    ///
    /// In this state:
    /// - Transport may still be unopened
    /// - Nothing has been written to the meter
    Idle,
    /// Identification request has been written
    ///
    /// In this state:
    /// - `/?!<CR><LF>` is on the wire
    /// - Waiting for exactly one identification line
    HandshakeSent,
    /// Identification parsed and readout select written
    ///
    /// In this state:
    /// - Meter type and baud hint are known
    /// - The acknowledgement selecting data readout is on the wire
    /// - Waiting for the first block line
    Identified,
    /// Consuming dataset lines
    ///
    /// In this state:
    /// - Every received line is appended to the raw capture
    /// - Lines are parsed into dataset records until the terminator
    ReadingDatasets,
    /// Terminator seen on a checksummed block
    ///
    /// In this state:
    /// - The trailer (ETX and check character) is being drained
    /// - No further lines are expected
    ChecksumPending,
    /// Session finished and the reading was handed over
    Done,
    /// Session failed or was cancelled
    Errored,
}

impl ReadoutState {
    /// Check if the session has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReadoutState::Done | ReadoutState::Errored)
    }

    /// Check if the session is consuming block data
    pub fn is_reading(&self) -> bool {
        matches!(
            self,
            ReadoutState::ReadingDatasets | ReadoutState::ChecksumPending
        )
    }

    /// Validate state transition
    ///
    /// # Arguments
    /// * `new_state` - The target state
    ///
    /// # Returns
    /// `Ok(())` if transition is valid, `Err` otherwise
    pub fn validate_transition(&self, new_state: ReadoutState) -> Iec21Result<()> {
        let valid = match (*self, new_state) {
            // Normal transitions
            (ReadoutState::Idle, ReadoutState::HandshakeSent) => true,
            (ReadoutState::HandshakeSent, ReadoutState::Identified) => true,
            (ReadoutState::Identified, ReadoutState::ReadingDatasets) => true,
            (ReadoutState::ReadingDatasets, ReadoutState::ChecksumPending) => true,
            (ReadoutState::ReadingDatasets, ReadoutState::Done) => true, // Plain block
            (ReadoutState::ChecksumPending, ReadoutState::Done) => true,
            // Failure and cancellation can strike anywhere
            (_, ReadoutState::Errored) => true,
            // Self-transitions (idempotent operations)
            (ReadoutState::Done, ReadoutState::Done) => true,
            // Invalid transitions
            _ => false,
        };

        if valid {
            Ok(())
        } else {
            Err(Iec21Error::Protocol(format!(
                "Invalid state transition: {:?} -> {:?}",
                self, new_state
            )))
        }
    }

    /// Get human-readable state name
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadoutState::Idle => "Idle",
            ReadoutState::HandshakeSent => "HandshakeSent",
            ReadoutState::Identified => "Identified",
            ReadoutState::ReadingDatasets => "ReadingDatasets",
            ReadoutState::ChecksumPending => "ChecksumPending",
            ReadoutState::Done => "Done",
            ReadoutState::Errored => "Errored",
        }
    }
}

impl Default for ReadoutState {
    fn default() -> Self {
        ReadoutState::Idle
    }
}
