//! Push-to-pull bridge for notification transports
//!
//! Wireless optical probes deliver meter bytes as discrete notification
//! events (GATT-style characteristics) and accept writes only in small
//! payloads. This transport adapts that push model to the pull-oriented
//! [`ChunkStream`] interface the session expects.

use crate::error::{Iec21Error, Iec21Result};
use crate::stop::StopToken;
use crate::stream::{ChunkStream, TransportLayer};
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

/// Maximum notification payload size
pub const MAX_NOTIFY_PAYLOAD: usize = 20;

/// Notification transport settings
#[derive(Debug, Clone)]
pub struct NotifySettings {
    /// Upper bound for one outgoing write chunk
    pub max_payload: usize,
}

impl NotifySettings {
    /// Create new notification settings with the default payload bound
    pub fn new() -> Self {
        Self {
            max_payload: MAX_NOTIFY_PAYLOAD,
        }
    }

    /// Create notification settings with a custom payload bound
    pub fn with_max_payload(max_payload: usize) -> Self {
        Self { max_payload }
    }
}

impl Default for NotifySettings {
    fn default() -> Self {
        Self::new()
    }
}

/// Link-side handle that drives a [`NotifyTransport`]
///
/// The owner of the physical link pushes incoming notification chunks in
/// with [`notify`](NotifyHandle::notify) and drains outgoing write chunks
/// with [`next_write`](NotifyHandle::next_write). Dropping the handle
/// models a link disconnect: pending and future reads on the transport
/// resolve with end-of-stream.
#[derive(Debug)]
pub struct NotifyHandle {
    notify_tx: mpsc::Sender<Bytes>,
    write_rx: mpsc::Receiver<Bytes>,
}

impl NotifyHandle {
    /// Deliver one incoming notification chunk
    ///
    /// The mailbox holds a single chunk; this call suspends until the
    /// previous one has been taken, so chunks are never dropped,
    /// reordered, or delivered twice.
    pub async fn notify(&self, chunk: Bytes) -> Iec21Result<()> {
        self.notify_tx.send(chunk).await.map_err(|_| {
            Iec21Error::Connection(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "Notification receiver dropped",
            ))
        })
    }

    /// Next outgoing write chunk
    ///
    /// Chunks arrive in submission order, each no larger than the
    /// configured payload bound. Returns `None` once the transport side
    /// has closed.
    pub async fn next_write(&mut self) -> Option<Bytes> {
        self.write_rx.recv().await
    }
}

/// Transport that adapts push notifications to the pull interface
///
/// Incoming chunks pass through a single-slot mailbox: one pending chunk
/// at most, replaced only after the session has taken it. The protocol is
/// strictly request/response, so a deeper queue would only hide lost
/// synchronization.
#[derive(Debug)]
pub struct NotifyTransport {
    notify_rx: mpsc::Receiver<Bytes>,
    write_tx: Option<mpsc::Sender<Bytes>>,
    settings: NotifySettings,
    stop: StopToken,
    closed: bool,
}

impl NotifyTransport {
    /// Create a transport and the link-side handle driving it
    pub fn pair(settings: NotifySettings) -> (Self, NotifyHandle) {
        let (notify_tx, notify_rx) = mpsc::channel(1);
        let (write_tx, write_rx) = mpsc::channel(1);
        let transport = Self {
            notify_rx,
            write_tx: Some(write_tx),
            settings,
            stop: StopToken::new(),
            closed: true,
        };
        let handle = NotifyHandle {
            notify_tx,
            write_rx,
        };
        (transport, handle)
    }
}

#[async_trait]
impl TransportLayer for NotifyTransport {
    async fn open(&mut self) -> Iec21Result<()> {
        if !self.closed {
            return Err(Iec21Error::Connection(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Connection has already been opened",
            )));
        }
        if self.write_tx.is_none() {
            return Err(Iec21Error::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Notification link already torn down",
            )));
        }
        self.closed = false;
        Ok(())
    }
}

#[async_trait]
impl ChunkStream for NotifyTransport {
    async fn read_chunk(&mut self) -> Iec21Result<Option<Bytes>> {
        if self.stop.is_stopped() {
            return Ok(None);
        }
        if self.closed {
            return Err(Iec21Error::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Notification transport not opened",
            )));
        }

        let stop = self.stop.clone();
        let chunk = tokio::select! {
            _ = stop.stopped() => return Ok(None),
            chunk = self.notify_rx.recv() => chunk,
        };

        match chunk {
            Some(chunk) => Ok(Some(chunk)),
            None => {
                log::warn!("Notification link disconnected");
                self.closed = true;
                Ok(None)
            }
        }
    }

    async fn write(&mut self, buf: &[u8]) -> Iec21Result<usize> {
        if self.closed {
            return Err(Iec21Error::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Notification transport not opened",
            )));
        }
        let tx = self.write_tx.as_ref().ok_or_else(|| {
            Iec21Error::Connection(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "Notification link already torn down",
            ))
        })?;

        let n = buf.len().min(self.settings.max_payload);
        if n == 0 {
            return Ok(0);
        }
        tx.send(Bytes::copy_from_slice(&buf[..n]))
            .await
            .map_err(|_| {
                Iec21Error::Connection(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "Notification link disconnected",
                ))
            })?;
        Ok(n)
    }

    async fn flush(&mut self) -> Iec21Result<()> {
        Ok(())
    }

    fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> Iec21Result<()> {
        self.stop.stop();
        self.write_tx = None;
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_chunks_arrive_in_order() {
        let (mut transport, handle) = NotifyTransport::pair(NotifySettings::new());
        transport.open().await.unwrap();

        let pusher = tokio::spawn(async move {
            handle.notify(Bytes::from_static(b"/ISK5")).await.unwrap();
            handle
                .notify(Bytes::from_static(b"MT382-1000\r\n"))
                .await
                .unwrap();
            handle
        });

        assert_eq!(
            transport.read_chunk().await.unwrap().unwrap().as_ref(),
            b"/ISK5"
        );
        assert_eq!(
            transport.read_chunk().await.unwrap().unwrap().as_ref(),
            b"MT382-1000\r\n"
        );
        pusher.await.unwrap();
    }

    #[tokio::test]
    async fn test_writes_are_chunked_to_payload_bound() {
        let (mut transport, mut handle) = NotifyTransport::pair(NotifySettings::new());
        transport.open().await.unwrap();

        let drain = tokio::spawn(async move {
            let mut chunks = Vec::new();
            while let Some(chunk) = handle.next_write().await {
                chunks.push(chunk);
            }
            chunks
        });

        let payload = vec![0x41u8; 45];
        transport.write_all(&payload).await.unwrap();
        transport.close().await.unwrap();

        let chunks = tokio::time::timeout(Duration::from_secs(1), drain)
            .await
            .unwrap()
            .unwrap();
        let lengths: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
        assert_eq!(lengths, vec![20, 20, 5]);
        let rejoined: Vec<u8> = chunks.concat();
        assert_eq!(rejoined, payload);
    }

    #[tokio::test]
    async fn test_stop_resolves_pending_read() {
        let (mut transport, handle) = NotifyTransport::pair(NotifySettings::new());
        transport.open().await.unwrap();
        let stop = transport.stop_token();

        let reader = tokio::spawn(async move { transport.read_chunk().await });
        tokio::task::yield_now().await;
        stop.stop();

        let result = tokio::time::timeout(Duration::from_secs(1), reader)
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        assert!(result.is_none());
        drop(handle);
    }

    #[tokio::test]
    async fn test_disconnect_resolves_pending_read() {
        let (mut transport, handle) = NotifyTransport::pair(NotifySettings::new());
        transport.open().await.unwrap();

        let reader = tokio::spawn(async move {
            let chunk = transport.read_chunk().await;
            (chunk, transport)
        });
        tokio::task::yield_now().await;
        drop(handle);

        let (chunk, transport) = tokio::time::timeout(Duration::from_secs(1), reader)
            .await
            .unwrap()
            .unwrap();
        assert!(chunk.unwrap().is_none());
        assert!(transport.is_closed());
    }

    #[tokio::test]
    async fn test_read_after_close_is_end_of_stream() {
        let (mut transport, _handle) = NotifyTransport::pair(NotifySettings::new());
        transport.open().await.unwrap();
        transport.close().await.unwrap();
        transport.close().await.unwrap();
        assert!(matches!(transport.read_chunk().await, Ok(None)));
    }

    #[tokio::test]
    async fn test_write_after_disconnect_fails() {
        let (mut transport, handle) = NotifyTransport::pair(NotifySettings::new());
        transport.open().await.unwrap();
        drop(handle);
        assert!(transport.write_all(b"/?!\r\n").await.is_err());
    }
}
