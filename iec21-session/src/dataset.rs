//! Dataset line parsing

use iec21_core::{Dataset, DatasetRecord};
use once_cell::sync::Lazy;
use regex::bytes::Regex;

/// Dataset line grammar
///
/// Address (up to 16 bytes), parenthesised value (up to 32), optional
/// `*unit` (up to 16), CR LF terminated. The unit class admits `/`:
/// deployed meters report rate units such as `imp/kWh` even though the
/// standard reserves the slash.
static DATASET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u)^([^()?!]{0,16})\(([^()*/!]{0,32})(\*([^()!]{0,16}))?\)\r\n$")
        .unwrap()
});

/// Parse one block line into a dataset record
///
/// Lines that do not match the grammar become
/// [`DatasetRecord::ParseError`] carrying the raw line; a readout never
/// aborts over one bad line.
pub fn parse_line(line: &[u8]) -> DatasetRecord {
    match DATASET_RE.captures(line) {
        Some(caps) => {
            let obis = String::from_utf8_lossy(&caps[1]).into_owned();
            let value = String::from_utf8_lossy(&caps[2]).into_owned();
            let unit = caps
                .get(4)
                .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned());
            DatasetRecord::Parsed(Dataset::new(obis, value, unit))
        }
        None => {
            log::warn!(
                "Cannot parse dataset line {:?}",
                String::from_utf8_lossy(line)
            );
            DatasetRecord::ParseError {
                raw_line: String::from_utf8_lossy(line).into_owned(),
            }
        }
    }
}
