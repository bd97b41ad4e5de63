//! Reading persistence
//!
//! Completed readings can be recorded in a store. Two implementations
//! ship with the crate: an in-memory log and a JSON file that survives
//! restarts. Anything else (a database, an MQTT bridge) implements
//! [`ReadingStore`].

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;

use iec21_core::Reading;

use crate::error::{Iec21Error, Iec21Result};

/// Persistent log of completed readings
#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Append one completed reading
    async fn put(&self, reading: &Reading) -> Iec21Result<()>;

    /// All stored readings in insertion order
    async fn readings(&self) -> Iec21Result<Vec<Reading>>;

    /// Most recent reading for the given meter id
    async fn latest(&self, meter_id: &str) -> Iec21Result<Option<Reading>>;

    /// Drop all stored readings
    async fn clear(&self) -> Iec21Result<()>;

    /// Render the full log as pretty-printed JSON
    async fn export_json(&self) -> Iec21Result<String> {
        let readings = self.readings().await?;
        serde_json::to_string_pretty(&readings)
            .map_err(|e| Iec21Error::Storage(format!("Failed to serialize readings: {}", e)))
    }
}

/// In-memory reading log
#[derive(Debug, Default)]
pub struct MemoryStore {
    readings: Mutex<Vec<Reading>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReadingStore for MemoryStore {
    async fn put(&self, reading: &Reading) -> Iec21Result<()> {
        self.readings.lock().await.push(reading.clone());
        Ok(())
    }

    async fn readings(&self) -> Iec21Result<Vec<Reading>> {
        Ok(self.readings.lock().await.clone())
    }

    async fn latest(&self, meter_id: &str) -> Iec21Result<Option<Reading>> {
        Ok(self
            .readings
            .lock()
            .await
            .iter()
            .rev()
            .find(|reading| reading.meter_id.as_deref() == Some(meter_id))
            .cloned())
    }

    async fn clear(&self) -> Iec21Result<()> {
        self.readings.lock().await.clear();
        Ok(())
    }
}

/// Reading log backed by a JSON file
///
/// The whole log is rewritten on every `put`. Fine for the intended
/// scale of manual readouts; not a time-series database.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    readings: Mutex<Vec<Reading>>,
}

impl JsonFileStore {
    /// Open a store at `path`, loading any readings already there
    pub fn open(path: impl Into<PathBuf>) -> Iec21Result<Self> {
        let path = path.into();
        let readings = if path.exists() {
            let json = std::fs::read_to_string(&path).map_err(|e| {
                Iec21Error::Storage(format!("Failed to read {}: {}", path.display(), e))
            })?;
            serde_json::from_str(&json).map_err(|e| {
                Iec21Error::Storage(format!("Failed to parse {}: {}", path.display(), e))
            })?
        } else {
            Vec::new()
        };
        Ok(Self {
            path,
            readings: Mutex::new(readings),
        })
    }

    async fn persist(&self, readings: &[Reading]) -> Iec21Result<()> {
        let json = serde_json::to_string_pretty(readings)
            .map_err(|e| Iec21Error::Storage(format!("Failed to serialize readings: {}", e)))?;
        tokio::fs::write(&self.path, json).await.map_err(|e| {
            Iec21Error::Storage(format!("Failed to write {}: {}", self.path.display(), e))
        })
    }
}

#[async_trait]
impl ReadingStore for JsonFileStore {
    async fn put(&self, reading: &Reading) -> Iec21Result<()> {
        let mut readings = self.readings.lock().await;
        readings.push(reading.clone());
        self.persist(&readings).await
    }

    async fn readings(&self) -> Iec21Result<Vec<Reading>> {
        Ok(self.readings.lock().await.clone())
    }

    async fn latest(&self, meter_id: &str) -> Iec21Result<Option<Reading>> {
        Ok(self
            .readings
            .lock()
            .await
            .iter()
            .rev()
            .find(|reading| reading.meter_id.as_deref() == Some(meter_id))
            .cloned())
    }

    async fn clear(&self) -> Iec21Result<()> {
        let mut readings = self.readings.lock().await;
        readings.clear();
        self.persist(&readings).await
    }
}
