//! Line framing for chunked byte streams
//!
//! Transports deliver data in arbitrarily sized chunks. The readout
//! protocol is line oriented, so the session reassembles chunks into
//! lines terminated by LF before interpreting anything.

use bytes::{Bytes, BytesMut};

/// Line terminator byte
const LF: u8 = 0x0a;

/// Reassembles chunked input into protocol lines
///
/// Chunks go in via [`push`](LineFramer::push), complete lines come out
/// via [`next_line`](LineFramer::next_line) with the terminator still
/// attached. Bytes after the last terminator stay buffered; the session
/// drains that residue directly when it collects the checksum trailer,
/// which carries no terminator of its own.
#[derive(Debug, Default)]
pub struct LineFramer {
    buf: BytesMut,
}

impl LineFramer {
    /// Create an empty framer
    pub fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Append one received chunk
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Take the next complete line, terminator included
    ///
    /// Returns `None` until a full line is buffered.
    pub fn next_line(&mut self) -> Option<Bytes> {
        let pos = self.buf.iter().position(|&b| b == LF)?;
        Some(self.buf.split_to(pos + 1).freeze())
    }

    /// Bytes buffered past the last complete line
    pub fn residue(&self) -> &[u8] {
        &self.buf
    }

    /// Take everything still buffered
    pub fn take_residue(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    /// Drop all buffered bytes
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}
