use crate::dataset::{Dataset, DatasetRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Verdict on the optional STX/ETX/BCC trailer of a readout block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChecksumStatus {
    /// The block carried no STX, so there was nothing to verify
    NotPresent,
    /// Trailer present and the block check character matched
    Ok,
    /// Trailer present but the block check character did not match
    Failed {
        /// Locally computed check character
        expected: u8,
        /// Check character the meter actually sent
        actual: u8,
    },
}

impl ChecksumStatus {
    /// True when a trailer was present and verified successfully
    pub fn is_ok(&self) -> bool {
        matches!(self, ChecksumStatus::Ok)
    }

    /// True when a trailer was present and verification failed
    pub fn is_failed(&self) -> bool {
        matches!(self, ChecksumStatus::Failed { .. })
    }
}

/// One complete meter readout
///
/// Produced at the end of a successful session and handed to the caller;
/// the engine keeps no reference to it afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// When the readout completed
    pub timestamp: DateTime<Utc>,
    /// Meter type from the identification reply
    pub meter_type: String,
    /// Derived meter identity, when the block carried one
    pub meter_id: Option<String>,
    /// Block lines in arrival order, parse errors included
    pub datasets: Vec<DatasetRecord>,
    /// Trailer verification verdict
    pub checksum_status: ChecksumStatus,
}

impl Reading {
    /// Assemble a reading from a finished block
    ///
    /// The meter id is derived from the dataset list (see
    /// [`derive_meter_id`]) and the timestamp is taken at construction.
    pub fn new(
        meter_type: impl Into<String>,
        datasets: Vec<DatasetRecord>,
        checksum_status: ChecksumStatus,
    ) -> Self {
        let meter_id = derive_meter_id(&datasets);
        Self {
            timestamp: Utc::now(),
            meter_type: meter_type.into(),
            meter_id,
            datasets,
            checksum_status,
        }
    }

    /// First parsed dataset carrying the given OBIS code
    pub fn dataset(&self, obis: &str) -> Option<&Dataset> {
        self.datasets
            .iter()
            .filter_map(DatasetRecord::dataset)
            .find(|dataset| dataset.obis == obis)
    }

    /// Number of lines that failed to parse
    pub fn parse_error_count(&self) -> usize {
        self.datasets
            .iter()
            .filter(|record| record.is_parse_error())
            .count()
    }
}

/// Derive the meter identity from an ordered dataset list
///
/// Takes the value of the first dataset whose OBIS code is `0.0.0`, falling
/// back to the first whose code is `0.0`. Neither code is mandated by the
/// protocol; this matches what deployed meter firmware emits.
pub fn derive_meter_id(datasets: &[DatasetRecord]) -> Option<String> {
    let first_value = |obis: &str| {
        datasets
            .iter()
            .filter_map(DatasetRecord::dataset)
            .find(|dataset| dataset.obis == obis)
            .map(|dataset| dataset.value.clone())
    };
    first_value("0.0.0").or_else(|| first_value("0.0"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parsed(obis: &str, value: &str) -> DatasetRecord {
        DatasetRecord::Parsed(Dataset::new(obis, value, None))
    }

    #[test]
    fn test_meter_id_prefers_specific_code() {
        let datasets = vec![
            parsed("0.0", "SHORT"),
            parsed("0.0.0", "FULL"),
            parsed("1.8.0", "0036486"),
        ];
        assert_eq!(derive_meter_id(&datasets), Some("FULL".to_string()));
    }

    #[test]
    fn test_meter_id_falls_back() {
        let datasets = vec![parsed("0.1", "80005ED02E"), parsed("0.0", "SHORT")];
        assert_eq!(derive_meter_id(&datasets), Some("SHORT".to_string()));
    }

    #[test]
    fn test_meter_id_absent() {
        let datasets = vec![parsed("1.8.0", "0036486")];
        assert_eq!(derive_meter_id(&datasets), None);
    }

    #[test]
    fn test_reading_lookup() {
        let reading = Reading::new(
            "AM363801C0269",
            vec![
                parsed("0.0.0", "T690100"),
                DatasetRecord::ParseError {
                    raw_line: "garbage\r\n".to_string(),
                },
                parsed("1.8.1", "0036483"),
            ],
            ChecksumStatus::Ok,
        );
        assert_eq!(reading.meter_id.as_deref(), Some("T690100"));
        assert_eq!(reading.dataset("1.8.1").map(|d| d.value.as_str()), Some("0036483"));
        assert_eq!(reading.parse_error_count(), 1);
        assert!(reading.checksum_status.is_ok());
    }
}
