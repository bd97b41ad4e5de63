//! Known-meter directory

use iec21_core::Reading;

/// One meter the client has read or been told about
#[derive(Debug, Clone, PartialEq)]
pub struct KnownMeter {
    /// Identity derived from the meter's own datasets, when present
    pub meter_id: Option<String>,
    /// Operator-assigned display name
    pub pretty_name: Option<String>,
    /// Most recent reading from this meter
    pub last_reading: Option<Reading>,
}

/// Directory of meters keyed by their derived identity
///
/// Readings from a meter that reports no identity all land on one
/// anonymous entry; they cannot be told apart.
#[derive(Debug, Default)]
pub struct MeterDirectory {
    meters: Vec<KnownMeter>,
}

impl MeterDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a completed reading against its meter
    ///
    /// Creates the entry on first contact, updates `last_reading`
    /// afterwards.
    pub fn record(&mut self, reading: &Reading) {
        match self
            .meters
            .iter_mut()
            .find(|meter| meter.meter_id == reading.meter_id)
        {
            Some(meter) => meter.last_reading = Some(reading.clone()),
            None => self.meters.push(KnownMeter {
                meter_id: reading.meter_id.clone(),
                pretty_name: None,
                last_reading: Some(reading.clone()),
            }),
        }
    }

    /// Register a meter or assign its display name
    pub fn set_pretty_name(&mut self, meter_id: &str, pretty_name: impl Into<String>) {
        let pretty_name = pretty_name.into();
        match self
            .meters
            .iter_mut()
            .find(|meter| meter.meter_id.as_deref() == Some(meter_id))
        {
            Some(meter) => meter.pretty_name = Some(pretty_name),
            None => self.meters.push(KnownMeter {
                meter_id: Some(meter_id.to_string()),
                pretty_name: Some(pretty_name),
                last_reading: None,
            }),
        }
    }

    /// Look up one meter by id
    pub fn get(&self, meter_id: &str) -> Option<&KnownMeter> {
        self.meters
            .iter()
            .find(|meter| meter.meter_id.as_deref() == Some(meter_id))
    }

    /// All known meters in first-seen order
    pub fn meters(&self) -> &[KnownMeter] {
        &self.meters
    }

    pub fn len(&self) -> usize {
        self.meters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iec21_core::{ChecksumStatus, Dataset, DatasetRecord};

    fn reading_with_id(meter_id: Option<&str>, energy: &str) -> Reading {
        let mut datasets = Vec::new();
        if let Some(id) = meter_id {
            datasets.push(DatasetRecord::Parsed(Dataset::new("0.0.0", id, None)));
        }
        datasets.push(DatasetRecord::Parsed(Dataset::new(
            "1.8.0",
            energy,
            Some("kWh".to_string()),
        )));
        Reading::new("MT382-1000", datasets, ChecksumStatus::NotPresent)
    }

    #[test]
    fn test_record_creates_then_updates() {
        let mut directory = MeterDirectory::new();
        directory.record(&reading_with_id(Some("12345678"), "001234.567"));
        directory.record(&reading_with_id(Some("12345678"), "001250.001"));

        assert_eq!(directory.len(), 1);
        let meter = directory.get("12345678").unwrap();
        let last = meter.last_reading.as_ref().unwrap();
        assert_eq!(
            last.dataset("1.8.0").map(|d| d.value.as_str()),
            Some("001250.001")
        );
    }

    #[test]
    fn test_anonymous_meters_share_one_entry() {
        let mut directory = MeterDirectory::new();
        directory.record(&reading_with_id(None, "001.0"));
        directory.record(&reading_with_id(None, "002.0"));

        assert_eq!(directory.len(), 1);
        assert!(directory.meters()[0].meter_id.is_none());
    }

    #[test]
    fn test_pretty_name_before_first_reading() {
        let mut directory = MeterDirectory::new();
        directory.set_pretty_name("12345678", "Basement main");
        assert_eq!(directory.len(), 1);
        assert!(directory.get("12345678").unwrap().last_reading.is_none());

        directory.record(&reading_with_id(Some("12345678"), "001234.567"));
        assert_eq!(directory.len(), 1);
        let meter = directory.get("12345678").unwrap();
        assert_eq!(meter.pretty_name.as_deref(), Some("Basement main"));
        assert!(meter.last_reading.is_some());
    }

    #[test]
    fn test_pretty_name_after_reading() {
        let mut directory = MeterDirectory::new();
        directory.record(&reading_with_id(Some("12345678"), "001234.567"));
        directory.set_pretty_name("12345678", "Garage");

        let meter = directory.get("12345678").unwrap();
        assert_eq!(meter.pretty_name.as_deref(), Some("Garage"));
        assert!(meter.last_reading.is_some());
    }
}
