//! Readout statistics collection

/// Readout session statistics
///
/// Counters updated by the session during a readout. Users can query
/// them at any time, also after a failed session, to see how far the
/// exchange got.
#[derive(Debug, Clone, Default)]
pub struct ReadoutStatistics {
    /// Total number of commands written to the meter
    pub commands_sent: u64,
    /// Total number of transport chunks received
    pub chunks_received: u64,
    /// Total number of complete lines consumed
    pub lines_read: u64,
    /// Number of lines parsed into datasets
    pub datasets_parsed: u64,
    /// Number of lines that did not match the dataset grammar
    pub parse_errors: u64,
    /// Raw bytes appended to the block capture
    pub bytes_captured: u64,
}

impl ReadoutStatistics {
    /// Create new statistics with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all statistics counters
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Increment commands sent counter
    pub fn increment_commands_sent(&mut self) {
        self.commands_sent += 1;
    }

    /// Increment chunks received counter
    pub fn increment_chunks_received(&mut self) {
        self.chunks_received += 1;
    }

    /// Increment lines read counter
    pub fn increment_lines_read(&mut self) {
        self.lines_read += 1;
    }

    /// Increment datasets parsed counter
    pub fn increment_datasets_parsed(&mut self) {
        self.datasets_parsed += 1;
    }

    /// Increment parse error counter
    pub fn increment_parse_errors(&mut self) {
        self.parse_errors += 1;
    }

    /// Add to the captured byte counter
    pub fn add_bytes_captured(&mut self, count: usize) {
        self.bytes_captured += count as u64;
    }

    /// Get dataset parse error rate as a percentage
    ///
    /// Returns 0.0 if no dataset lines have been seen.
    pub fn parse_error_rate(&self) -> f64 {
        let total = self.datasets_parsed + self.parse_errors;
        if total == 0 {
            0.0
        } else {
            (self.parse_errors as f64 / total as f64) * 100.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_and_clear() {
        let mut stats = ReadoutStatistics::new();
        stats.increment_commands_sent();
        stats.increment_lines_read();
        stats.increment_datasets_parsed();
        stats.add_bytes_captured(42);
        assert_eq!(stats.commands_sent, 1);
        assert_eq!(stats.bytes_captured, 42);

        stats.clear();
        assert_eq!(stats.lines_read, 0);
        assert_eq!(stats.bytes_captured, 0);
    }

    #[test]
    fn test_parse_error_rate() {
        let mut stats = ReadoutStatistics::new();
        assert_eq!(stats.parse_error_rate(), 0.0);

        stats.increment_datasets_parsed();
        stats.increment_datasets_parsed();
        stats.increment_datasets_parsed();
        stats.increment_parse_errors();
        assert_eq!(stats.parse_error_rate(), 25.0);
    }
}
