//! DeweyID envelope (§4.3.3): hierarchical labels encoded as a delta against
//! the previous record's DeweyID within the same page.

use crate::buffers::{GrowableSink, ReadCursor};
use crate::codec::CodecError;
use serde::{Deserialize, Serialize};

/// A DeweyID is a sequence of divisions (commonly odd integers for original
/// siblings, even for inserted ones); stored here as its raw byte path,
/// the representation the on-disk delta encoding operates over directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeweyId(pub Vec<u8>);

impl DeweyId {
    #[must_use]
    pub fn root() -> Self {
        Self(vec![1])
    }

    fn common_prefix_len(&self, previous: &Self) -> usize {
        self.0.iter().zip(previous.0.iter()).take_while(|(a, b)| a == b).count()
    }

    /// Writes this DeweyID as a delta against `previous`: a 1-byte common
    /// prefix length, a 1-byte tail length, then the tail bytes. The first
    /// record in a page passes `previous = None` and gets the full-length
    /// form (prefix length 0).
    pub fn encode_delta(&self, previous: Option<&Self>, out: &mut GrowableSink) {
        let prefix_len = previous.map_or(0, |prev| self.common_prefix_len(prev));
        let tail = &self.0[prefix_len..];
        out.write_u8(prefix_len as u8);
        out.write_u8(tail.len() as u8);
        out.write_bytes(tail);
    }

    /// Decodes a DeweyID delta, reconstructing against `previous`.
    ///
    /// # Errors
    /// Returns [`CodecError::BufferExhausted`] on truncated input.
    pub fn decode_delta(cur: &mut ReadCursor<'_>, previous: Option<&Self>) -> Result<Self, CodecError> {
        let prefix_len = cur.read_u8()? as usize;
        let tail_len = cur.read_u8()? as usize;
        let tail = cur.read_slice(tail_len)?;
        let mut path = Vec::with_capacity(prefix_len + tail_len);
        if prefix_len > 0 {
            let prev = previous.ok_or(CodecError::BufferExhausted)?;
            path.extend_from_slice(&prev.0[..prefix_len]);
        }
        path.extend_from_slice(tail);
        Ok(Self(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_record_is_full_length() {
        let id = DeweyId(vec![1, 3]);
        let mut sink = GrowableSink::new();
        id.encode_delta(None, &mut sink);
        let bytes = sink.into_vec();
        assert_eq!(bytes[0], 0); // no common prefix
        assert_eq!(bytes[1], 2); // full tail
    }

    #[test]
    fn subsequent_record_shares_prefix() {
        let prev = DeweyId(vec![1, 3]);
        let cur = DeweyId(vec![1, 3, 5]);
        let mut sink = GrowableSink::new();
        cur.encode_delta(Some(&prev), &mut sink);
        let bytes = sink.into_vec();
        let mut cursor = ReadCursor::new(&bytes);
        let decoded = DeweyId::decode_delta(&mut cursor, Some(&prev)).unwrap();
        assert_eq!(decoded, cur);
    }
}
