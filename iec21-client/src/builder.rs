//! Readout client builder
//!
//! This module provides a builder pattern for assembling meter readout
//! clients over either transport.
//!
//! # Usage Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use iec21_client::{MemoryStore, ReadoutBuilder};
//! use iec21_transport::SerialSettings;
//!
//! # async fn demo() -> iec21_core::Iec21Result<()> {
//! let mut client = ReadoutBuilder::new()
//!     .event_capacity(128)
//!     .store(Arc::new(MemoryStore::new()))
//!     .build_serial(SerialSettings::new("/dev/ttyUSB0".to_string(), 9600));
//!
//! let reading = client.read_meter().await?;
//! println!("{} datasets", reading.datasets.len());
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use iec21_session::SessionConfig;
use iec21_transport::{
    NotifyHandle, NotifySettings, NotifyTransport, SerialSettings, SerialTransport,
    TransportLayer,
};

use crate::client::MeterClient;
use crate::store::ReadingStore;

/// Builder for meter readout clients
///
/// Collects session configuration and an optional store, then binds
/// them to a transport. Every `build_*` method consumes the builder.
#[derive(Default)]
pub struct ReadoutBuilder {
    session_config: SessionConfig,
    store: Option<Arc<dyn ReadingStore>>,
}

impl ReadoutBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the capacity of the session event channel
    ///
    /// # Arguments
    /// * `capacity` - Buffered events before emission awaits the consumer
    ///
    /// # Returns
    /// Self for method chaining
    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.session_config.event_capacity = capacity;
        self
    }

    /// Record completed readings in the given store
    ///
    /// # Arguments
    /// * `store` - Shared store; one store can serve many clients
    ///
    /// # Returns
    /// Self for method chaining
    pub fn store(mut self, store: Arc<dyn ReadingStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build a client over a serial port
    ///
    /// The port is not opened here; that happens when the readout runs.
    pub fn build_serial(self, settings: SerialSettings) -> MeterClient<SerialTransport> {
        self.build(SerialTransport::new(settings))
    }

    /// Build a client over a notification link
    ///
    /// Returns the client plus the handle the link integration feeds
    /// incoming chunks through.
    pub fn build_notify(
        self,
        settings: NotifySettings,
    ) -> (MeterClient<NotifyTransport>, NotifyHandle) {
        let (transport, handle) = NotifyTransport::pair(settings);
        (self.build(transport), handle)
    }

    /// Build a client over any transport
    pub fn build<T: TransportLayer>(self, transport: T) -> MeterClient<T> {
        MeterClient::with_parts(transport, self.session_config, self.store)
    }
}
