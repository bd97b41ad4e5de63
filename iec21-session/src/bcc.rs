//! Block check character (BCC) calculation for checksummed readout blocks

use crate::error::{Iec21Error, Iec21Result};

/// BCC calculation constants
const INITIAL_BCC: u8 = 0x00;
const BCC_MASK: u8 = 0x7F; // Checksum runs over 7-bit characters

/// Block check character calculator
///
/// XOR reduction over the block content, every byte masked to 7 bits
/// before it enters. The meter computes the same value over everything
/// between STX (exclusive) and the BCC byte (exclusive), ETX included.
pub struct BccCalc {
    bcc_value: u8,
}

impl BccCalc {
    /// Create a new BCC calculator
    pub fn new() -> Self {
        Self {
            bcc_value: INITIAL_BCC,
        }
    }

    /// Reset the BCC value to initial state
    pub fn reset(&mut self) {
        self.bcc_value = INITIAL_BCC;
    }

    /// Update the BCC value with a single byte
    pub fn update(&mut self, data: u8) {
        self.bcc_value = (self.bcc_value ^ (data & BCC_MASK)) & BCC_MASK;
    }

    /// Update the BCC value with multiple bytes
    pub fn update_bytes(&mut self, data: &[u8]) {
        for &byte in data {
            self.update(byte);
        }
    }

    /// Get the current BCC value
    pub fn value(&self) -> u8 {
        self.bcc_value
    }
}

impl Default for BccCalc {
    fn default() -> Self {
        Self::new()
    }
}

/// Verify a raw captured block against its trailing check character
///
/// `capture` is the complete raw block as received: STX first, the BCC
/// byte last. On success returns the check value; on mismatch returns
/// [`Iec21Error::Checksum`] carrying both sides.
pub fn verify_capture(capture: &[u8]) -> Iec21Result<u8> {
    if capture.len() < 2 {
        return Err(Iec21Error::Protocol(format!(
            "Checksummed block too short: {} bytes",
            capture.len()
        )));
    }

    let mut calc = BccCalc::new();
    calc.update_bytes(&capture[1..capture.len() - 1]);
    let expected = calc.value();
    let actual = capture[capture.len() - 1];

    if expected == actual {
        Ok(expected)
    } else {
        Err(Iec21Error::Checksum { expected, actual })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcc_single_line_block() {
        let mut calc = BccCalc::new();
        calc.update_bytes(b"1.8.0(001234.567*kWh)\r\n!\r\n\x03");
        assert_eq!(calc.value(), 0x7A);
    }

    #[test]
    fn test_bcc_two_line_block() {
        let mut calc = BccCalc::new();
        calc.update_bytes(b"0.0.0(12345678)\r\n1.8.0(001234.567*kWh)\r\n!\r\n\x03");
        assert_eq!(calc.value(), 0x44);
    }

    #[test]
    fn test_high_bit_masked_before_xor() {
        let mut plain = BccCalc::new();
        plain.update_bytes(b"1.8.0(001234.567*kWh)\r\n!\r\n\x03");

        // Same content with parity bits set on a few bytes
        let mut noisy = BccCalc::new();
        noisy.update(b'1' | 0x80);
        noisy.update_bytes(b".8.0(001234.567*kWh)\r\n!\r");
        noisy.update(b'\n' | 0x80);
        noisy.update(0x03 | 0x80);

        assert_eq!(plain.value(), noisy.value());
        assert!(noisy.value() < 0x80);
    }

    #[test]
    fn test_bcc_reset() {
        let mut calc = BccCalc::new();
        calc.update(0x42);
        calc.reset();
        assert_eq!(calc.value(), INITIAL_BCC);
    }

    #[test]
    fn test_verify_capture_ok() {
        let capture = b"\x021.8.0(001234.567*kWh)\r\n!\r\n\x03\x7a";
        assert_eq!(verify_capture(capture).ok(), Some(0x7A));
    }

    #[test]
    fn test_verify_capture_mismatch() {
        let capture = b"\x021.8.0(001234.567*kWh)\r\n!\r\n\x03\x00";
        match verify_capture(capture) {
            Err(Iec21Error::Checksum { expected, actual }) => {
                assert_eq!(expected, 0x7A);
                assert_eq!(actual, 0x00);
            }
            other => panic!("expected checksum error, got {:?}", other),
        }
    }

    #[test]
    fn test_verify_capture_too_short() {
        assert!(verify_capture(b"\x02").is_err());
        assert!(verify_capture(b"").is_err());
    }
}
