//! Node record serialization contract (§4.3.1): kind-id byte, optional
//! DeweyID envelope (omitted here when a record has none bound, per
//! §4.3.3), then a kind-specific sequence of delta-encoded or varint
//! fields. Parent and sibling *keys* are encoded as deltas relative to the
//! node's own key (§4.3.1), so the node's absolute key is never stored in
//! the payload itself — callers recover it from the record's page number
//! and slot index (see [`crate::page::record_page::locate`]) and pass it
//! back in as the decode base.

use crate::buffers::{GrowableSink, ReadCursor};
use crate::codec::{self, CodecError};
use crate::node::NodeKind;
use crate::node::delegate::{NameDelegate, NodeDelegate, StructDelegate, ValueDelegate};
use crate::node::structural::{
    ArrayNode, DocumentRootNode, ElementNode, JsonDocumentRootNode, NamespaceNode, ObjectKeyNode,
    ObjectNode,
};
use crate::node::value::{
    AttributeNode, CommentNode, JsonBooleanNode, JsonNullNode, JsonNumberNode, JsonStringNode,
    NumericValue, ProcessingInstructionNode, TextNode,
};
use crate::types::{NodeKey, Revision};

/// A decoded-or-about-to-be-encoded node record of any kind, the
/// tagged-union dispatch table the REDESIGN FLAGS in §9 call for in place
/// of class-inheritance forwarding.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRecord {
    DocumentRoot(DocumentRootNode),
    JsonDocumentRoot(JsonDocumentRootNode),
    Element(ElementNode),
    Namespace(NamespaceNode),
    Attribute(AttributeNode),
    Text(TextNode),
    Comment(CommentNode),
    ProcessingInstruction(ProcessingInstructionNode),
    Object(ObjectNode),
    ObjectKey(ObjectKeyNode),
    Array(ArrayNode),
    JsonString(JsonStringNode),
    JsonNumber(JsonNumberNode),
    JsonBoolean(JsonBooleanNode),
    JsonNull(JsonNullNode),
}

impl NodeRecord {
    #[must_use]
    pub const fn kind(&self) -> NodeKind {
        match self {
            Self::DocumentRoot(_) => NodeKind::DocumentRoot,
            Self::JsonDocumentRoot(_) => NodeKind::JsonDocumentRoot,
            Self::Element(_) => NodeKind::Element,
            Self::Namespace(_) => NodeKind::Namespace,
            Self::Attribute(_) => NodeKind::Attribute,
            Self::Text(_) => NodeKind::Text,
            Self::Comment(_) => NodeKind::Comment,
            Self::ProcessingInstruction(_) => NodeKind::ProcessingInstruction,
            Self::Object(_) => NodeKind::Object,
            Self::ObjectKey(_) => NodeKind::ObjectKey,
            Self::Array(_) => NodeKind::Array,
            Self::JsonString(_) => NodeKind::JsonString,
            Self::JsonNumber(_) => NodeKind::JsonNumber,
            Self::JsonBoolean(_) => NodeKind::JsonBoolean,
            Self::JsonNull(_) => NodeKind::JsonNull,
        }
    }

    #[must_use]
    pub const fn node_key(&self) -> NodeKey {
        match self {
            Self::DocumentRoot(n) => n.node.node_key,
            Self::JsonDocumentRoot(n) => n.node.node_key,
            Self::Element(n) => n.node.node_key,
            Self::Namespace(n) => n.node.node_key,
            Self::Attribute(n) => n.node.node_key,
            Self::Text(n) => n.node.node_key,
            Self::Comment(n) => n.node.node_key,
            Self::ProcessingInstruction(n) => n.node.node_key,
            Self::Object(n) => n.node.node_key,
            Self::ObjectKey(n) => n.node.node_key,
            Self::Array(n) => n.node.node_key,
            Self::JsonString(n) => n.node.node_key,
            Self::JsonNumber(n) => n.node.node_key,
            Self::JsonBoolean(n) => n.node.node_key,
            Self::JsonNull(n) => n.node.node_key,
        }
    }
}

fn write_delta(sink: &mut GrowableSink, target: NodeKey, base: NodeKey) {
    let mut tmp = Vec::with_capacity(10);
    codec::encode_delta(target, base, &mut tmp);
    sink.write_bytes(&tmp);
}

fn read_delta(cur: &mut ReadCursor<'_>, base: NodeKey) -> Result<NodeKey, CodecError> {
    let remaining = cur.peek_slice(cur.remaining())?;
    let (key, consumed) = codec::decode_delta(remaining, base)?;
    cur.read_slice(consumed)?;
    Ok(key)
}

fn write_i32(sink: &mut GrowableSink, v: i32) {
    sink.write_var_long(codec::zigzag_encode(i64::from(v)));
}

fn read_i32(cur: &mut ReadCursor<'_>) -> Result<i32, CodecError> {
    let v = codec::zigzag_decode(cur.read_var_long()?);
    Ok(v as i32)
}

fn write_revision(sink: &mut GrowableSink, r: Revision) {
    sink.write_var_long(codec::zigzag_encode(i64::from(r.0)));
}

fn read_revision(cur: &mut ReadCursor<'_>) -> Result<Revision, CodecError> {
    let v = codec::zigzag_decode(cur.read_var_long()?);
    Ok(Revision(v as i32))
}

fn write_option_u64(sink: &mut GrowableSink, v: Option<u64>) {
    match v {
        None => sink.write_u8(0),
        Some(n) => {
            sink.write_u8(1);
            sink.write_var_long(n);
        }
    }
}

fn read_option_u64(cur: &mut ReadCursor<'_>) -> Result<Option<u64>, CodecError> {
    match cur.read_u8()? {
        0 => Ok(None),
        _ => Ok(Some(cur.read_var_long()?)),
    }
}

fn write_option_hash(sink: &mut GrowableSink, v: Option<u64>) {
    match v {
        None => sink.write_u8(0),
        Some(h) => {
            sink.write_u8(1);
            sink.write_u64_le(h);
        }
    }
}

fn read_option_hash(cur: &mut ReadCursor<'_>) -> Result<Option<u64>, CodecError> {
    match cur.read_u8()? {
        0 => Ok(None),
        _ => Ok(Some(cur.read_u64_le()?)),
    }
}

fn write_node_common(sink: &mut GrowableSink, node: &NodeDelegate, own: NodeKey) {
    write_delta(sink, node.parent_key, own);
    write_revision(sink, node.previous_revision);
    write_revision(sink, node.last_modified_revision);
}

fn read_node_common(cur: &mut ReadCursor<'_>, own: NodeKey) -> Result<NodeDelegate, CodecError> {
    let parent_key = read_delta(cur, own)?;
    let previous_revision = read_revision(cur)?;
    let last_modified_revision = read_revision(cur)?;
    Ok(NodeDelegate { node_key: own, parent_key, previous_revision, last_modified_revision, dewey_id: None })
}

fn write_struct_fields(sink: &mut GrowableSink, s: &StructDelegate, own: NodeKey) {
    write_delta(sink, s.left_sibling_key, own);
    write_delta(sink, s.right_sibling_key, own);
    write_delta(sink, s.first_child_key, own);
    write_delta(sink, s.last_child_key, own);
    write_option_u64(sink, s.child_count);
    write_option_u64(sink, s.descendant_count);
    write_option_hash(sink, s.content_hash);
}

fn read_struct_fields(cur: &mut ReadCursor<'_>, own: NodeKey) -> Result<StructDelegate, CodecError> {
    let left_sibling_key = read_delta(cur, own)?;
    let right_sibling_key = read_delta(cur, own)?;
    let first_child_key = read_delta(cur, own)?;
    let last_child_key = read_delta(cur, own)?;
    let child_count = read_option_u64(cur)?;
    let descendant_count = read_option_u64(cur)?;
    let content_hash = read_option_hash(cur)?;
    Ok(StructDelegate {
        left_sibling_key,
        right_sibling_key,
        first_child_key,
        last_child_key,
        child_count,
        descendant_count,
        content_hash,
    })
}

fn write_name_fields(sink: &mut GrowableSink, n: &NameDelegate, own: NodeKey) {
    write_i32(sink, n.prefix_key);
    write_i32(sink, n.local_name_key);
    write_i32(sink, n.uri_key);
    write_delta(sink, n.path_node_key, own);
}

fn read_name_fields(cur: &mut ReadCursor<'_>, own: NodeKey) -> Result<NameDelegate, CodecError> {
    let prefix_key = read_i32(cur)?;
    let local_name_key = read_i32(cur)?;
    let uri_key = read_i32(cur)?;
    let path_node_key = read_delta(cur, own)?;
    Ok(NameDelegate { prefix_key, local_name_key, uri_key, path_node_key })
}

/// §4.2: compressed-flag byte, 4-byte length, raw bytes.
fn write_value_fields(sink: &mut GrowableSink, v: &ValueDelegate) {
    sink.write_u8(u8::from(v.compressed));
    sink.write_u32_le(v.raw_value.len() as u32);
    sink.write_bytes(&v.raw_value);
}

fn read_value_fields(cur: &mut ReadCursor<'_>) -> Result<ValueDelegate, CodecError> {
    let compressed = cur.read_u8()? != 0;
    let len = cur.read_u32_le()? as usize;
    let raw_value = cur.read_slice(len)?.to_vec();
    Ok(ValueDelegate { compressed, raw_value })
}

/// Minimal-length signed big-endian bytes (sign-extension trimmed), used
/// for the `BigInteger`/`BigDecimal` unscaled payloads. Resolves the §9
/// Open Question on `OBJECT_NUMBER_VALUE`'s length prefix in favor of a
/// stop-bit/varint length uniformly, rather than a fixed 4-byte length.
fn minimal_signed_bytes(v: i128) -> Vec<u8> {
    let full = v.to_be_bytes();
    let sign_byte = if v.is_negative() { 0xFFu8 } else { 0x00u8 };
    let mut start = 0;
    while start + 1 < full.len()
        && full[start] == sign_byte
        && (full[start + 1] & 0x80 == 0x80) == (sign_byte == 0xFF)
    {
        start += 1;
    }
    full[start..].to_vec()
}

fn from_minimal_signed_bytes(bytes: &[u8]) -> i128 {
    if bytes.is_empty() {
        return 0;
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut full = [if negative { 0xFFu8 } else { 0 }; 16];
    let start = 16 - bytes.len();
    full[start..].copy_from_slice(bytes);
    i128::from_be_bytes(full)
}

fn write_numeric(sink: &mut GrowableSink, v: &NumericValue) {
    sink.write_u8(v.tag());
    match v {
        NumericValue::Double(d) => sink.write_u64_le(d.to_bits()),
        NumericValue::Float(f) => sink.write_u32_le(f.to_bits()),
        NumericValue::Int(i) => write_i32(sink, *i),
        NumericValue::Long(l) => sink.write_var_long(codec::zigzag_encode(*l)),
        NumericValue::BigInteger(b) => {
            let bytes = minimal_signed_bytes(*b);
            sink.write_var_long(bytes.len() as u64);
            sink.write_bytes(&bytes);
        }
        NumericValue::BigDecimal { unscaled, scale } => {
            let bytes = minimal_signed_bytes(*unscaled);
            sink.write_var_long(bytes.len() as u64);
            sink.write_bytes(&bytes);
            sink.write_var_long(u64::from(*scale));
        }
    }
}

fn read_numeric(cur: &mut ReadCursor<'_>) -> Result<NumericValue, CodecError> {
    match cur.read_u8()? {
        NumericValue::TAG_DOUBLE => Ok(NumericValue::Double(f64::from_bits(cur.read_u64_le()?))),
        NumericValue::TAG_FLOAT => Ok(NumericValue::Float(f32::from_bits(cur.read_u32_le()?))),
        NumericValue::TAG_INT => Ok(NumericValue::Int(read_i32(cur)?)),
        NumericValue::TAG_LONG => Ok(NumericValue::Long(codec::zigzag_decode(cur.read_var_long()?))),
        NumericValue::TAG_BIG_INTEGER => {
            let len = cur.read_var_long()? as usize;
            let bytes = cur.read_slice(len)?;
            Ok(NumericValue::BigInteger(from_minimal_signed_bytes(bytes)))
        }
        NumericValue::TAG_BIG_DECIMAL => {
            let len = cur.read_var_long()? as usize;
            let bytes = cur.read_slice(len)?;
            let unscaled = from_minimal_signed_bytes(bytes);
            let scale = cur.read_var_long()? as u32;
            Ok(NumericValue::BigDecimal { unscaled, scale })
        }
        other => Err(CodecError::UnknownNodeKind(other)),
    }
}

/// Encodes `record`'s envelope (kind-id byte) and kind-specific payload,
/// per §4.3.1. Parent/sibling/child/path-node keys are encoded as deltas
/// against `record.node_key()`. Draws its scratch buffer from the
/// process-wide sink pool so encoding many records in sequence (a flush of
/// a dirty page) doesn't reallocate a fresh `Vec` per record.
#[must_use]
pub fn encode(record: &NodeRecord) -> Vec<u8> {
    let own = record.node_key();
    let mut pooled = crate::buffers::sink_pool().checkout();
    let sink = pooled.get_mut();
    sink.write_u8(record.kind().to_byte());
    match record {
        NodeRecord::Element(n) => {
            write_node_common(sink, &n.node, own);
            write_struct_fields(sink, &n.structure, own);
            write_name_fields(sink, &n.name, own);
            sink.write_var_long(n.attribute_keys.len() as u64);
            for k in &n.attribute_keys {
                write_delta(sink, *k, own);
            }
            sink.write_var_long(n.namespace_keys.len() as u64);
            for k in &n.namespace_keys {
                write_delta(sink, *k, own);
            }
        }
        NodeRecord::Namespace(n) => {
            write_node_common(sink, &n.node, own);
            write_name_fields(sink, &n.name, own);
        }
        NodeRecord::Object(n) | NodeRecord::Array(n) => {
            write_node_common(sink, &n.node, own);
            write_struct_fields(sink, &n.structure, own);
        }
        NodeRecord::DocumentRoot(n) => {
            write_node_common(sink, &n.node, own);
            write_struct_fields(sink, &n.structure, own);
        }
        NodeRecord::JsonDocumentRoot(n) => {
            write_node_common(sink, &n.node, own);
            write_struct_fields(sink, &n.structure, own);
        }
        NodeRecord::ObjectKey(n) => {
            write_node_common(sink, &n.node, own);
            write_struct_fields(sink, &n.structure, own);
            write_name_fields(sink, &n.name, own);
        }
        NodeRecord::Attribute(n) => {
            write_node_common(sink, &n.node, own);
            write_name_fields(sink, &n.name, own);
            write_value_fields(sink, &n.value);
        }
        NodeRecord::ProcessingInstruction(n) => {
            write_node_common(sink, &n.node, own);
            write_name_fields(sink, &n.name, own);
            write_value_fields(sink, &n.value);
        }
        NodeRecord::Text(n) | NodeRecord::Comment(n) => {
            write_node_common(sink, &n.node, own);
            write_value_fields(sink, &n.value);
            write_delta(sink, n.left_sibling_key, own);
            write_delta(sink, n.right_sibling_key, own);
        }
        NodeRecord::JsonString(n) => {
            write_node_common(sink, &n.node, own);
            write_value_fields(sink, &n.value);
        }
        NodeRecord::JsonNumber(n) => {
            write_node_common(sink, &n.node, own);
            write_numeric(sink, &n.numeric);
        }
        NodeRecord::JsonBoolean(n) => {
            write_node_common(sink, &n.node, own);
            sink.write_u8(u8::from(n.value));
        }
        NodeRecord::JsonNull(n) => {
            write_node_common(sink, &n.node, own);
        }
    }
    pooled.get().as_slice().to_vec()
}

/// Decodes a record envelope whose owning node key is `own` (recovered by
/// the caller from its page number and slot, never stored in the payload
/// itself).
///
/// # Errors
/// Returns [`CodecError`] for an unrecognized kind byte or truncated input.
pub fn decode(own: NodeKey, bytes: &[u8]) -> Result<NodeRecord, CodecError> {
    let mut cur = ReadCursor::new(bytes);
    let kind = NodeKind::from_byte(cur.read_u8()?)?;
    Ok(match kind {
        NodeKind::Element => {
            let node = read_node_common(&mut cur, own)?;
            let structure = read_struct_fields(&mut cur, own)?;
            let name = read_name_fields(&mut cur, own)?;
            let attr_count = cur.read_var_long()? as usize;
            let mut attribute_keys = Vec::with_capacity(attr_count);
            for _ in 0..attr_count {
                attribute_keys.push(read_delta(&mut cur, own)?);
            }
            let ns_count = cur.read_var_long()? as usize;
            let mut namespace_keys = Vec::with_capacity(ns_count);
            for _ in 0..ns_count {
                namespace_keys.push(read_delta(&mut cur, own)?);
            }
            NodeRecord::Element(ElementNode { node, structure, name, attribute_keys, namespace_keys })
        }
        NodeKind::Namespace => {
            let node = read_node_common(&mut cur, own)?;
            let name = read_name_fields(&mut cur, own)?;
            NodeRecord::Namespace(NamespaceNode { node, name })
        }
        NodeKind::Object => {
            let node = read_node_common(&mut cur, own)?;
            let structure = read_struct_fields(&mut cur, own)?;
            NodeRecord::Object(ObjectNode { node, structure })
        }
        NodeKind::Array => {
            let node = read_node_common(&mut cur, own)?;
            let structure = read_struct_fields(&mut cur, own)?;
            NodeRecord::Array(ArrayNode { node, structure })
        }
        NodeKind::DocumentRoot => {
            let node = read_node_common(&mut cur, own)?;
            let structure = read_struct_fields(&mut cur, own)?;
            NodeRecord::DocumentRoot(DocumentRootNode { node, structure })
        }
        NodeKind::JsonDocumentRoot => {
            let node = read_node_common(&mut cur, own)?;
            let structure = read_struct_fields(&mut cur, own)?;
            NodeRecord::JsonDocumentRoot(JsonDocumentRootNode { node, structure })
        }
        NodeKind::ObjectKey => {
            let node = read_node_common(&mut cur, own)?;
            let structure = read_struct_fields(&mut cur, own)?;
            let name = read_name_fields(&mut cur, own)?;
            NodeRecord::ObjectKey(ObjectKeyNode { node, structure, name })
        }
        NodeKind::Attribute => {
            let node = read_node_common(&mut cur, own)?;
            let name = read_name_fields(&mut cur, own)?;
            let value = read_value_fields(&mut cur)?;
            NodeRecord::Attribute(AttributeNode { node, name, value })
        }
        NodeKind::ProcessingInstruction => {
            let node = read_node_common(&mut cur, own)?;
            let name = read_name_fields(&mut cur, own)?;
            let value = read_value_fields(&mut cur)?;
            NodeRecord::ProcessingInstruction(ProcessingInstructionNode { node, name, value })
        }
        NodeKind::Text => {
            let node = read_node_common(&mut cur, own)?;
            let value = read_value_fields(&mut cur)?;
            let left_sibling_key = read_delta(&mut cur, own)?;
            let right_sibling_key = read_delta(&mut cur, own)?;
            NodeRecord::Text(TextNode { node, left_sibling_key, right_sibling_key, value })
        }
        NodeKind::Comment => {
            let node = read_node_common(&mut cur, own)?;
            let value = read_value_fields(&mut cur)?;
            let left_sibling_key = read_delta(&mut cur, own)?;
            let right_sibling_key = read_delta(&mut cur, own)?;
            NodeRecord::Comment(CommentNode { node, left_sibling_key, right_sibling_key, value })
        }
        NodeKind::JsonString => {
            let node = read_node_common(&mut cur, own)?;
            let value = read_value_fields(&mut cur)?;
            NodeRecord::JsonString(JsonStringNode { node, value })
        }
        NodeKind::JsonNumber => {
            let node = read_node_common(&mut cur, own)?;
            let numeric = read_numeric(&mut cur)?;
            NodeRecord::JsonNumber(JsonNumberNode { node, numeric })
        }
        NodeKind::JsonBoolean => {
            let node = read_node_common(&mut cur, own)?;
            let value = cur.read_u8()? != 0;
            NodeRecord::JsonBoolean(JsonBooleanNode { node, value })
        }
        NodeKind::JsonNull => {
            let node = read_node_common(&mut cur, own)?;
            NodeRecord::JsonNull(JsonNullNode { node })
        }
        NodeKind::PathSummary | NodeKind::CasIndex | NodeKind::PathIndex | NodeKind::NameIndex | NodeKind::ValueIndex => {
            return Err(CodecError::UnknownNodeKind(kind.to_byte()));
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::delegate::NodeDelegate;

    fn element_at(key: i64, parent: i64) -> ElementNode {
        ElementNode {
            node: NodeDelegate::new(NodeKey(key), NodeKey(parent), Revision::FIRST),
            structure: StructDelegate::empty(),
            name: NameDelegate { prefix_key: -1, local_name_key: 7, uri_key: -1, path_node_key: NodeKey(2) },
            attribute_keys: vec![NodeKey(key + 1), NodeKey(key + 2)],
            namespace_keys: vec![],
        }
    }

    #[test]
    fn element_round_trips() {
        let record = NodeRecord::Element(element_at(1_000_000, 999_999));
        let bytes = encode(&record);
        let decoded = decode(NodeKey(1_000_000), &bytes).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn repeated_encodes_reuse_the_process_wide_sink_pool() {
        let record = NodeRecord::Element(element_at(1, 0));
        // First encode checks a sink out, writes into it, and returns it to
        // the pool on drop; the second call should draw that same buffer
        // back out rather than allocate fresh.
        let _ = encode(&record);
        let checked_out = crate::buffers::sink_pool().checkout();
        assert_eq!(checked_out.get().len(), 0, "returned sink is cleared before reuse");
    }

    #[test]
    fn text_round_trips_with_siblings() {
        let record = NodeRecord::Text(TextNode {
            node: NodeDelegate::new(NodeKey(42), NodeKey(1), Revision(3)),
            left_sibling_key: NodeKey(41),
            right_sibling_key: NodeKey(43),
            value: ValueDelegate::new(b"c41".to_vec(), false),
        });
        let bytes = encode(&record);
        let decoded = decode(NodeKey(42), &bytes).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn text_with_null_siblings_round_trips() {
        let record = NodeRecord::Text(TextNode {
            node: NodeDelegate::new(NodeKey(1), NodeKey(0), Revision::FIRST),
            left_sibling_key: NodeKey::NULL,
            right_sibling_key: NodeKey::NULL,
            value: ValueDelegate::new(b"only child".to_vec(), false),
        });
        let bytes = encode(&record);
        let decoded = decode(NodeKey(1), &bytes).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn json_number_round_trips_every_variant() {
        for numeric in [
            NumericValue::Double(3.5),
            NumericValue::Float(1.25),
            NumericValue::Int(-7),
            NumericValue::Long(i64::MIN),
            NumericValue::BigInteger(i128::from(i64::MAX) * 1000),
            NumericValue::BigInteger(-5),
            NumericValue::BigDecimal { unscaled: 12345, scale: 2 },
            NumericValue::BigDecimal { unscaled: -1, scale: 0 },
        ] {
            let record =
                NodeRecord::JsonNumber(JsonNumberNode { node: NodeDelegate::new(NodeKey(5), NodeKey(1), Revision::FIRST), numeric });
            let bytes = encode(&record);
            let decoded = decode(NodeKey(5), &bytes).unwrap();
            assert_eq!(decoded, record);
        }
    }

    #[test]
    fn json_null_and_boolean_round_trip() {
        let null = NodeRecord::JsonNull(JsonNullNode { node: NodeDelegate::new(NodeKey(9), NodeKey(1), Revision::FIRST) });
        let bytes = encode(&null);
        assert_eq!(decode(NodeKey(9), &bytes).unwrap(), null);

        let boolean =
            NodeRecord::JsonBoolean(JsonBooleanNode { node: NodeDelegate::new(NodeKey(10), NodeKey(1), Revision::FIRST), value: true });
        let bytes = encode(&boolean);
        assert_eq!(decode(NodeKey(10), &bytes).unwrap(), boolean);
    }

    #[test]
    fn unknown_kind_byte_is_corrupt_data() {
        assert_eq!(decode(NodeKey(1), &[255]).unwrap_err(), CodecError::UnknownNodeKind(255));
    }
}
