//! Identification reply parsing

use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::error::{Iec21Error, Iec21Result};

/// Identification reply pattern
///
/// `/` + manufacturer (two uppercase, one mixed-case letter) + baud
/// class character + optional escape pairs + free-form meter type, CR LF
/// terminated. Byte semantics (`(?-u)`) so raw meter bytes match the
/// classes directly.
static IDENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?-u)^/[A-Z]{2}[A-Za-z]([A-I0-9])((?:\\.)*)([^/!]+)\r\n$")
        .unwrap()
});

/// ACK control character opening the readout select command
const ACK: u8 = 0x06;

/// Parsed identification reply
///
/// `/ISK5MT382-1000<CR><LF>` parses to baud hint `5` and meter type
/// `MT382-1000`. Escape pairs (backslash plus one byte) between the
/// baud hint and the type carry mode enhancements and are dropped from
/// the type string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identification {
    /// Baud class character offered by the meter (`A`-`I` or `0`-`9`)
    pub baud_hint: u8,
    /// Free-form meter type identifier
    pub meter_type: String,
}

impl Identification {
    /// Parse one raw identification line, terminator included
    pub fn parse(line: &[u8]) -> Iec21Result<Self> {
        let caps = IDENT_RE
            .captures(line)
            .ok_or_else(|| Iec21Error::Identification {
                line: String::from_utf8_lossy(line).into_owned(),
            })?;

        // Group 1 is a single mandatory byte
        let baud_hint = caps[1][0];
        let meter_type = String::from_utf8_lossy(&caps[3]).into_owned();

        Ok(Self {
            baud_hint,
            meter_type,
        })
    }

    /// Readout select command answering this identification
    ///
    /// ACK `0` + offered baud class + `0` + CR LF: acknowledge, echo the
    /// baud class and request data readout mode.
    pub fn select_command(&self) -> [u8; 6] {
        [ACK, 0x30, self.baud_hint, 0x30, 0x0d, 0x0a]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_identification() {
        let ident = Identification::parse(b"/ISK5MT382-1000\r\n").unwrap();
        assert_eq!(ident.baud_hint, b'5');
        assert_eq!(ident.meter_type, "MT382-1000");
    }

    #[test]
    fn test_parse_with_escape_pair() {
        let ident = Identification::parse(b"/ZPA5\\2AM363801C0269\r\n").unwrap();
        assert_eq!(ident.baud_hint, b'5');
        assert_eq!(ident.meter_type, "AM363801C0269");
    }

    #[test]
    fn test_parse_mode_b_baud_class() {
        let ident = Identification::parse(b"/ABCD1234\r\n").unwrap();
        assert_eq!(ident.baud_hint, b'D');
        assert_eq!(ident.meter_type, "1234");
    }

    #[test]
    fn test_reject_malformed_lines() {
        // No leading slash
        assert!(Identification::parse(b"ISK5MT382-1000\r\n").is_err());
        // Lowercase manufacturer
        assert!(Identification::parse(b"/isk5MT382-1000\r\n").is_err());
        // Baud class outside A-I / 0-9
        assert!(Identification::parse(b"/ISKJMT382-1000\r\n").is_err());
        // Terminator byte inside the type
        assert!(Identification::parse(b"/ISK5MT382!1000\r\n").is_err());
        // Missing line ending
        assert!(Identification::parse(b"/ISK5MT382-1000").is_err());
        assert!(Identification::parse(b"").is_err());
    }

    #[test]
    fn test_error_preserves_line() {
        match Identification::parse(b"garbage\r\n") {
            Err(Iec21Error::Identification { line }) => {
                assert_eq!(line, "garbage\r\n");
            }
            other => panic!("expected identification error, got {:?}", other),
        }
    }

    #[test]
    fn test_select_command_echoes_baud_hint() {
        let ident = Identification::parse(b"/ISK5MT382-1000\r\n").unwrap();
        assert_eq!(
            ident.select_command(),
            [0x06, 0x30, 0x35, 0x30, 0x0d, 0x0a]
        );
    }
}
