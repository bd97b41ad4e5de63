//! Meter readout client
//!
//! Wraps one readout session and wires its outcome into the known-meter
//! directory and an optional reading store.

use std::sync::Arc;

use tokio::sync::mpsc;

use iec21_core::{Reading, SessionEvent};
use iec21_session::{ReadoutSession, ReadoutState, ReadoutStatistics, SessionConfig};
use iec21_transport::{StopToken, TransportLayer};

use crate::directory::MeterDirectory;
use crate::error::Iec21Result;
use crate::store::ReadingStore;

/// Client for one meter readout
///
/// Like the session it wraps, a client runs exactly one readout; create
/// a fresh one per exchange. The directory persists per client, so keep
/// the client around when only the directory matters, or share a
/// [`ReadingStore`] across clients for history.
pub struct MeterClient<T: TransportLayer> {
    session: ReadoutSession<T>,
    store: Option<Arc<dyn ReadingStore>>,
    directory: MeterDirectory,
}

impl<T: TransportLayer> MeterClient<T> {
    /// Create a client over the given transport
    pub fn new(transport: T) -> Self {
        Self::with_parts(transport, SessionConfig::default(), None)
    }

    pub(crate) fn with_parts(
        transport: T,
        config: SessionConfig,
        store: Option<Arc<dyn ReadingStore>>,
    ) -> Self {
        Self {
            session: ReadoutSession::with_config(transport, config),
            store,
            directory: MeterDirectory::new(),
        }
    }

    /// Subscribe to session progress events
    pub fn subscribe(&mut self) -> mpsc::Receiver<SessionEvent> {
        self.session.subscribe()
    }

    /// Stop handle for cancelling the readout from another task
    pub fn stop_token(&self) -> StopToken {
        self.session.stop_token()
    }

    /// Request cancellation of the running readout
    pub fn stop(&self) {
        self.session.stop();
    }

    /// Run one complete readout
    ///
    /// On success the reading is recorded in the known-meter directory
    /// and, when configured, appended to the store before it is
    /// returned. Verification failures propagate without touching the
    /// store; the unverified datasets stay reachable through
    /// [`partial_reading`](MeterClient::partial_reading).
    pub async fn read_meter(&mut self) -> Iec21Result<Reading> {
        let reading = self.session.read_meter().await?;

        self.directory.record(&reading);
        if let Some(store) = &self.store {
            store.put(&reading).await?;
            log::info!("Reading stored for meter {:?}", reading.meter_id);
        }

        Ok(reading)
    }

    /// Known-meter directory
    pub fn directory(&self) -> &MeterDirectory {
        &self.directory
    }

    /// Mutable access for naming meters
    pub fn directory_mut(&mut self) -> &mut MeterDirectory {
        &mut self.directory
    }

    /// Session statistics collected so far
    pub fn statistics(&self) -> &ReadoutStatistics {
        self.session.statistics()
    }

    /// Current session state
    pub fn state(&self) -> ReadoutState {
        self.session.state()
    }

    /// Reading assembled from whatever the session has collected
    pub fn partial_reading(&self) -> Option<Reading> {
        self.session.partial_reading()
    }
}
