//! Growable write sink (§4.2): a cursor-style writer over an owned `Vec<u8>`
//! with doubling capacity growth and unaligned little-endian integer writes.

use crate::codec::{encode_varint, varint_length};

#[derive(Debug, Default, Clone)]
pub struct GrowableSink {
    buf: Vec<u8>,
}

impl GrowableSink {
    #[must_use]
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self { buf: Vec::with_capacity(cap) }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Grows the backing buffer so at least `additional` more bytes fit
    /// without reallocating again, doubling capacity each time it must grow.
    pub fn ensure_capacity(&mut self, additional: usize) {
        let needed = self.buf.len() + additional;
        if needed <= self.buf.capacity() {
            return;
        }
        let mut new_cap = self.buf.capacity().max(64);
        while new_cap < needed {
            new_cap *= 2;
        }
        self.buf.reserve(new_cap - self.buf.len());
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16_le(&mut self, v: u16) {
        self.ensure_capacity(2);
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u32_le(&mut self, v: u32) {
        self.ensure_capacity(4);
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_u64_le(&mut self, v: u64) {
        self.ensure_capacity(8);
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    pub fn write_i64_le(&mut self, v: i64) {
        self.write_u64_le(v as u64);
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.ensure_capacity(bytes.len());
        self.buf.extend_from_slice(bytes);
    }

    /// Single capacity check followed by a varint write, per §4.2's fused
    /// `writeVarLong`.
    pub fn write_var_long(&mut self, v: u64) -> usize {
        self.ensure_capacity(varint_length(v));
        encode_varint(v, &mut self.buf)
    }

    /// Writes a UTF-8 string with a 4-byte length prefix. `None` encodes as
    /// length `-1` (`0xFFFF_FFFF`).
    pub fn write_string(&mut self, s: Option<&str>) {
        match s {
            None => self.write_u32_le(u32::MAX),
            Some(s) => {
                let bytes = s.as_bytes();
                self.write_u32_le(bytes.len() as u32);
                self.write_bytes(bytes);
            }
        }
    }

    /// Copies the contents of another sink into this one without an
    /// intermediate allocation beyond the capacity check.
    pub fn write_sink(&mut self, other: &Self) {
        self.write_bytes(&other.buf);
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.buf
    }

    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ensure_capacity_doubles() {
        let mut sink = GrowableSink::with_capacity(4);
        sink.ensure_capacity(100);
        assert!(sink.buf.capacity() >= 104);
    }

    #[test]
    fn string_round_trip_markers() {
        let mut sink = GrowableSink::new();
        sink.write_string(Some("hello"));
        sink.write_string(None);
        let bytes = sink.into_vec();
        assert_eq!(&bytes[0..4], &5u32.to_le_bytes());
        assert_eq!(&bytes[4..9], b"hello");
        assert_eq!(&bytes[9..13], &u32::MAX.to_le_bytes());
    }
}
