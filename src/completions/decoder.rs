//! Newline framing for streamed response bodies.
//!
//! Network reads do not respect line boundaries: one read may carry several
//! objects, or end halfway through one. Bytes are buffered until a `\n`
//! arrives, so a line is only handed out once it is complete.

use bytes::{Bytes, BytesMut};

#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: BytesMut,
    /// Bytes at the front of `buffer` already known to contain no newline.
    scanned: usize,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network read and drain every line it completes.
    ///
    /// Returned lines exclude the terminator (`\n` or `\r\n`).
    pub fn push(&mut self, bytes: &[u8]) -> Vec<Bytes> {
        self.buffer.extend_from_slice(bytes);

        let mut lines = Vec::new();
        while let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') {
            let end = self.scanned + offset;
            let mut line = self.buffer.split_to(end + 1);
            line.truncate(end);
            if line.last() == Some(&b'\r') {
                line.truncate(end - 1);
            }
            lines.push(line.freeze());
            self.scanned = 0;
        }
        self.scanned = self.buffer.len();

        lines
    }

    /// Take whatever is left once the body has ended.
    ///
    /// Servers usually terminate the last object with a newline, but a final
    /// unterminated object is still returned here.
    pub fn finish(&mut self) -> Option<Bytes> {
        self.scanned = 0;
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer.split().freeze())
        }
    }
}
