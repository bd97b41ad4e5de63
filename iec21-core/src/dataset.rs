use serde::{Deserialize, Serialize};
use std::fmt;

/// One parsed dataset line from a mode C readout block
///
/// A dataset line carries an OBIS code (kept as the string the meter sent,
/// reduced ID codes like `C.8.1` or `1.6.0,5` included), a value, and an
/// optional unit: `1.8.0(001234.567*kWh)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    /// OBIS code as transmitted (up to 16 characters)
    pub obis: String,
    /// Value field (up to 32 characters)
    pub value: String,
    /// Unit field, absent when the line carries none (up to 16 characters)
    pub unit: Option<String>,
}

impl Dataset {
    /// Create a new dataset record
    pub fn new(
        obis: impl Into<String>,
        value: impl Into<String>,
        unit: Option<String>,
    ) -> Self {
        Self {
            obis: obis.into(),
            value: value.into(),
            unit,
        }
    }

    /// Reassemble the protocol line content (without the trailing `\r\n`)
    pub fn to_line(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{}({}*{})", self.obis, self.value, unit),
            None => format!("{}({})", self.obis, self.value),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_line())
    }
}

/// Outcome of parsing one block line
///
/// Malformed lines never abort a readout; they are recorded in place so the
/// caller can see exactly what the meter sent and where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatasetRecord {
    /// Line matched the dataset grammar
    Parsed(Dataset),
    /// Line did not match; the raw line is kept for diagnostics
    ParseError { raw_line: String },
}

impl DatasetRecord {
    /// The parsed dataset, if this record holds one
    pub fn dataset(&self) -> Option<&Dataset> {
        match self {
            DatasetRecord::Parsed(dataset) => Some(dataset),
            DatasetRecord::ParseError { .. } => None,
        }
    }

    /// True if this record marks an unparsable line
    pub fn is_parse_error(&self) -> bool {
        matches!(self, DatasetRecord::ParseError { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_to_line_with_unit() {
        let dataset = Dataset::new("1.8.0", "001234.567", Some("kWh".to_string()));
        assert_eq!(dataset.to_line(), "1.8.0(001234.567*kWh)");
    }

    #[test]
    fn test_dataset_to_line_without_unit() {
        let dataset = Dataset::new("0.0.0", "T690100", None);
        assert_eq!(dataset.to_line(), "0.0.0(T690100)");
    }

    #[test]
    fn test_record_accessors() {
        let parsed = DatasetRecord::Parsed(Dataset::new("F.F", "00000000", None));
        assert!(!parsed.is_parse_error());
        assert_eq!(parsed.dataset().map(|d| d.obis.as_str()), Some("F.F"));

        let error = DatasetRecord::ParseError {
            raw_line: "NOT-A-VALID-LINE\r\n".to_string(),
        };
        assert!(error.is_parse_error());
        assert!(error.dataset().is_none());
    }
}
