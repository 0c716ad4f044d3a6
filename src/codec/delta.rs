//! Delta-varint: node keys encoded relative to a base key, exploiting the
//! locality of sibling/parent pointers (almost always within a few of the
//! node's own key). Byte `0x00` is reserved for the NULL sentinel so a
//! missing pointer never needs the base at all.

use super::error::CodecError;
use super::varint::{decode_varint, encode_varint, varint_length};
use super::zigzag;
use crate::types::NodeKey;

/// Bytes `encode_delta` would produce, without encoding.
#[must_use]
pub fn delta_length(target: NodeKey, base: NodeKey) -> usize {
    if target.is_null() {
        return 1;
    }
    varint_length(zigzag_plus_one(target, base))
}

fn zigzag_plus_one(target: NodeKey, base: NodeKey) -> u64 {
    let diff = target.0.wrapping_sub(base.0);
    zigzag::encode(diff).wrapping_add(1)
}

/// Appends the delta-varint encoding of `target` relative to `base`.
/// Returns the number of bytes written.
pub fn encode_delta(target: NodeKey, base: NodeKey, out: &mut Vec<u8>) -> usize {
    if target.is_null() {
        out.push(0x00);
        return 1;
    }
    encode_varint(zigzag_plus_one(target, base), out)
}

/// Decodes a delta-varint from the front of `buf` relative to `base`.
/// Returns `(target, bytes_consumed)`.
///
/// # Errors
/// Propagates [`CodecError`] from the underlying varint decode.
pub fn decode_delta(buf: &[u8], base: NodeKey) -> Result<(NodeKey, usize), CodecError> {
    if buf.first() == Some(&0x00) {
        return Ok((NodeKey::NULL, 1));
    }
    let (encoded, consumed) = decode_varint(buf)?;
    let zz = encoded.wrapping_sub(1);
    let diff = zigzag::decode(zz);
    Ok((NodeKey(base.0.wrapping_add(diff)), consumed))
}

/// Bytes an absolute (non-negative-only) varint encoding of `key` would take.
#[must_use]
pub fn absolute_length(key: NodeKey) -> usize {
    varint_length(key.0 as u64)
}

/// Appends the absolute varint encoding of a non-negative node key.
pub fn encode_absolute(key: NodeKey, out: &mut Vec<u8>) -> usize {
    debug_assert!(key.0 >= 0, "absolute encoding is for non-negative keys only");
    encode_varint(key.0 as u64, out)
}

/// Decodes an absolute varint-encoded node key.
///
/// # Errors
/// Propagates [`CodecError`] from the underlying varint decode.
pub fn decode_absolute(buf: &[u8]) -> Result<(NodeKey, usize), CodecError> {
    let (v, consumed) = decode_varint(buf)?;
    Ok((NodeKey(v as i64), consumed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn sibling_delta_is_one_byte() {
        // target = base + 1 -> zigzag(1) = 2, +1 = 3 -> single byte 0x03
        let base = NodeKey(1_000_000);
        let target = NodeKey(1_000_001);
        let mut out = Vec::new();
        encode_delta(target, base, &mut out);
        assert_eq!(out, vec![0x03]);
        let (decoded, consumed) = decode_delta(&out, base).unwrap();
        assert_eq!(decoded, target);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn absolute_base_matches_scenario_s3() {
        let mut out = Vec::new();
        encode_absolute(NodeKey(1_000_000), &mut out);
        assert_eq!(out, vec![0xC0, 0x84, 0x3D]);
        let (decoded, consumed) = decode_absolute(&out).unwrap();
        assert_eq!(decoded, NodeKey(1_000_000));
        assert_eq!(consumed, 3);
    }

    #[test]
    fn null_round_trips_as_single_zero_byte() {
        let base = NodeKey(42);
        let mut out = Vec::new();
        encode_delta(NodeKey::NULL, base, &mut out);
        assert_eq!(out, vec![0x00]);
        let (decoded, consumed) = decode_delta(&out, base).unwrap();
        assert_eq!(decoded, NodeKey::NULL);
        assert_eq!(consumed, 1);
    }

    proptest! {
        #[test]
        fn round_trip(base in any::<i64>(), offset in -1000i64..1000) {
            let base = NodeKey(base);
            let target = NodeKey(base.0.wrapping_add(offset));
            prop_assume!(!target.is_null());
            let mut out = Vec::new();
            let written = encode_delta(target, base, &mut out);
            prop_assert_eq!(written, delta_length(target, base));
            let (decoded, consumed) = decode_delta(&out, base).unwrap();
            prop_assert_eq!(decoded, target);
            prop_assert_eq!(consumed, out.len());
        }
    }
}
