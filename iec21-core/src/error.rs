use thiserror::Error;

/// Main error type for mode C readout operations
#[derive(Error, Debug)]
pub enum Iec21Error {
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    #[error("Cannot identify meter: {line:?}")]
    Identification { line: String },

    #[error("Stream ended before the block terminator")]
    TruncatedBlock,

    #[error("Checksum error: BCC from meter 0x{actual:02X}, calculated 0x{expected:02X}")]
    Checksum { expected: u8, actual: u8 },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Session cancelled")]
    Cancelled,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

/// Result type alias for mode C readout operations
pub type Iec21Result<T> = Result<T, Iec21Error>;
