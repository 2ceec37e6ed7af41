//! Chunked base64 encoding

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Incremental base64 encoder.
///
/// Carries a 0-2 byte remainder between chunks so that the concatenation
/// of all `update` outputs plus the final `finish` is a single valid
/// base64 document, regardless of how the input was chunked. Padding
/// appears only at the very end.
pub struct StreamEncoder {
    carry: Vec<u8>,
}

impl StreamEncoder {
    pub fn new() -> Self {
        Self { carry: Vec::new() }
    }

    /// Encode as much of the carried remainder plus `chunk` as falls on a
    /// 3-byte boundary. May return an empty string for tiny chunks.
    pub fn update(&mut self, chunk: &[u8]) -> String {
        self.carry.extend_from_slice(chunk);
        let usable = self.carry.len() - self.carry.len() % 3;
        if usable == 0 {
            return String::new();
        }

        let rest = self.carry.split_off(usable);
        let encoded = STANDARD.encode(&self.carry);
        self.carry = rest;
        encoded
    }

    /// Encode the remaining 0-2 carried bytes, with padding.
    pub fn finish(self) -> String {
        STANDARD.encode(&self.carry)
    }
}

impl Default for StreamEncoder {
    fn default() -> Self {
        Self::new()
    }
}
