//! Serial port transport implementation

use crate::error::{Iec21Error, Iec21Result};
use crate::stop::StopToken;
use crate::stream::{ChunkStream, TransportLayer};
use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::ops::{Deref, DerefMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio_serial::SerialStream;

/// Read granularity of the pull stream
const READ_BUFFER_SIZE: usize = 256;

/// Wrapper for SerialStream that implements Debug
struct DebugSerialStream(SerialStream);

impl fmt::Debug for DebugSerialStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialStream").finish()
    }
}

impl Deref for DebugSerialStream {
    type Target = SerialStream;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for DebugSerialStream {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Serial port transport layer settings
///
/// Mode C negotiates a baud class in-band, but this engine keeps the line
/// at the configured rate for the whole session; the meter's hint is only
/// echoed back in the readout-select command.
#[derive(Debug, Clone)]
pub struct SerialSettings {
    pub port_name: String,
    pub baud_rate: u32,
    pub data_bits: tokio_serial::DataBits,
    pub stop_bits: tokio_serial::StopBits,
    pub parity: tokio_serial::Parity,
    pub flow_control: tokio_serial::FlowControl,
}

impl SerialSettings {
    /// Create new serial settings with 8N1 framing
    pub fn new(port_name: String, baud_rate: u32) -> Self {
        Self {
            port_name,
            baud_rate,
            data_bits: tokio_serial::DataBits::Eight,
            stop_bits: tokio_serial::StopBits::One,
            parity: tokio_serial::Parity::None,
            flow_control: tokio_serial::FlowControl::None,
        }
    }
}

/// Serial port transport layer implementation
#[derive(Debug)]
pub struct SerialTransport {
    stream: Option<DebugSerialStream>,
    settings: SerialSettings,
    stop: StopToken,
    closed: bool,
}

impl SerialTransport {
    /// Create a new serial transport layer
    pub fn new(settings: SerialSettings) -> Self {
        Self {
            stream: None,
            settings,
            stop: StopToken::new(),
            closed: true,
        }
    }

    /// Create serial transport with port name and baud rate
    pub fn new_simple(port_name: String, baud_rate: u32) -> Self {
        Self::new(SerialSettings::new(port_name, baud_rate))
    }
}

#[async_trait]
impl TransportLayer for SerialTransport {
    async fn open(&mut self) -> Iec21Result<()> {
        if !self.closed {
            return Err(Iec21Error::Connection(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Connection has already been opened",
            )));
        }

        let builder = tokio_serial::new(&self.settings.port_name, self.settings.baud_rate)
            .data_bits(self.settings.data_bits)
            .stop_bits(self.settings.stop_bits)
            .parity(self.settings.parity)
            .flow_control(self.settings.flow_control);

        let stream = SerialStream::open(&builder).map_err(|e| {
            Iec21Error::Connection(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open serial port: {}", e),
            ))
        })?;

        self.stream = Some(DebugSerialStream(stream));
        self.closed = false;
        Ok(())
    }
}

#[async_trait]
impl ChunkStream for SerialTransport {
    async fn read_chunk(&mut self) -> Iec21Result<Option<Bytes>> {
        if self.stop.is_stopped() {
            return Ok(None);
        }

        let stream = self.stream.as_mut().ok_or_else(|| {
            Iec21Error::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Serial stream not connected",
            ))
        })?;

        let stop = self.stop.clone();
        let mut buf = [0u8; READ_BUFFER_SIZE];
        let result = tokio::select! {
            _ = stop.stopped() => return Ok(None),
            result = stream.read(&mut buf) => result,
        };

        match result {
            Ok(0) => {
                self.closed = true;
                Ok(None)
            }
            Ok(n) => Ok(Some(Bytes::copy_from_slice(&buf[..n]))),
            Err(e) => {
                self.closed = true;
                Err(Iec21Error::Connection(e))
            }
        }
    }

    async fn write(&mut self, buf: &[u8]) -> Iec21Result<usize> {
        let stream = self.stream.as_mut().ok_or_else(|| {
            Iec21Error::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Serial stream not connected",
            ))
        })?;

        stream.write(buf).await.map_err(|e| Iec21Error::Connection(e))
    }

    async fn flush(&mut self) -> Iec21Result<()> {
        let stream = self.stream.as_mut().ok_or_else(|| {
            Iec21Error::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Serial stream not connected",
            ))
        })?;

        stream.flush().await.map_err(|e| Iec21Error::Connection(e))
    }

    fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> Iec21Result<()> {
        self.stop.stop();
        if let Some(mut stream) = self.stream.take() {
            let _ = stream.flush().await;
        }
        self.closed = true;
        Ok(())
    }
}
