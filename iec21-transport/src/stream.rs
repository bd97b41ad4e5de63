//! Chunk stream traits for the transport layer

use crate::error::{Iec21Error, Iec21Result};
use crate::stop::StopToken;
use async_trait::async_trait;
use bytes::Bytes;

/// Chunk-oriented access to a physical link with a meter
///
/// The readout protocol never needs byte-exact reads: the session consumes
/// whatever chunk the link produces and reframes it into lines itself, so
/// the read side hands over chunks of transport-chosen size. `Ok(None)`
/// signals end-of-stream and is also what a read resolves to after the
/// stop token fires or the stream was closed, never an error.
#[async_trait]
pub trait ChunkStream: Send + Sync {
    /// Read the next chunk from the stream
    ///
    /// Suspends until data arrives, the stream ends, or the stop token
    /// fires. `Ok(None)` means end-of-stream.
    async fn read_chunk(&mut self) -> Iec21Result<Option<Bytes>>;

    /// Write data to the stream
    ///
    /// # Returns
    ///
    /// Number of bytes accepted; may be less than `buf.len()` for
    /// transports with a bounded payload size
    async fn write(&mut self, buf: &[u8]) -> Iec21Result<usize>;

    /// Write all data to the stream
    ///
    /// Issues as many sequential writes as the transport's payload bound
    /// requires, preserving submission order.
    async fn write_all(&mut self, buf: &[u8]) -> Iec21Result<()> {
        let mut written = 0;
        while written < buf.len() {
            let n = self.write(&buf[written..]).await?;
            if n == 0 {
                return Err(Iec21Error::Connection(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "Failed to write all data",
                )));
            }
            written += n;
        }
        Ok(())
    }

    /// Flush any buffered data
    async fn flush(&mut self) -> Iec21Result<()>;

    /// Stop token governing this stream
    ///
    /// Clone-able; firing it from any task resolves a pending
    /// `read_chunk` with end-of-stream.
    fn stop_token(&self) -> StopToken;

    /// Check if the stream is closed
    fn is_closed(&self) -> bool;

    /// Close the stream
    ///
    /// Releases the read and write side together; idempotent.
    async fn close(&mut self) -> Iec21Result<()>;
}

/// Transport layer trait that extends ChunkStream
#[async_trait]
pub trait TransportLayer: ChunkStream {
    /// Open the physical layer connection
    async fn open(&mut self) -> Iec21Result<()>;
}
