//! # StructuredBuffer: The Value Tree
//!
//! An ordered, name-indexed collection of typed elements. Elements may hold
//! nested trees, stored as complete serialized snapshots and materialized on
//! `get`, so a tree is always finite and acyclic and every copy is deep.
//!
//! ## Lookup
//!
//! Each element keeps its precomputed 64-bit [`name_hash`]. The index maps a
//! hash to the positions of every element with that hash; a lookup scans
//! only those candidates and confirms with an exact name comparison. Two
//! distinct names that collide therefore coexist as separate elements.
//!
//! ## Serialization
//!
//! `serialize()` concatenates each element's frame in insertion order.
//! `parse()` walks frames until the input is exhausted, validating every
//! payload (recursively for nested trees) so that a successfully parsed tree
//! never fails a later `get` for any reason other than absence or kind.
//!
//! The nesting limit is symmetric: `put` refuses a child tree that would take
//! the parent past [`MAX_NESTING_DEPTH`], so anything `put` accepts will
//! parse again.
//!
//! ## Concurrency
//!
//! No interior mutability: shared `&StructuredBuffer` readers are safe across
//! threads and mutation requires `&mut`.

use std::collections::HashMap;

use crate::error::TreeError;
use crate::frame::{decode_frame, encode_frame_into, frame_len, MIN_FRAME_LEN};
use crate::hash::name_hash;
use crate::kind::ValueKind;
use crate::value::{validate_scalar, TreeValue, Value};

/// Maximum nesting depth accepted by [`StructuredBuffer::parse`] and
/// [`StructuredBuffer::put`].
pub const MAX_NESTING_DEPTH: usize = 128;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    name: String,
    hash: u64,
    kind: ValueKind,
    data: Vec<u8>,
    /// Levels of nested trees below this element; zero for scalars.
    depth: usize,
}

/// Borrowed view of one element, yielded by [`StructuredBuffer::elements`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementRef<'a> {
    /// Element name.
    pub name: &'a str,
    /// Precomputed name hash.
    pub hash: u64,
    /// Element kind.
    pub kind: ValueKind,
    /// Raw payload bytes.
    pub data: &'a [u8],
}

/// A self-describing tree of named, typed values.
///
/// # Invariants
///
/// - Names are non-empty, NUL-free, and unique.
/// - `index` maps every element's hash to exactly the positions holding it.
/// - Every payload is valid for its kind.
#[derive(Debug, Clone, Default)]
pub struct StructuredBuffer {
    elements: Vec<Element>,
    index: HashMap<u64, Vec<usize>>,
}

impl StructuredBuffer {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite an element.
    ///
    /// - Same name, same kind: payload replaced, position kept.
    /// - Same name, different kind: old element removed, new one appended.
    /// - New name: appended.
    ///
    /// # Errors
    ///
    /// - [`TreeError::InvalidName`] if `name` is empty or contains NUL.
    /// - [`TreeError::NestingTooDeep`] if a child tree would put this tree
    ///   past [`MAX_NESTING_DEPTH`].
    /// - [`TreeError::InvalidValue`] if the name or payload length does not
    ///   fit the frame's 32-bit length fields.
    pub fn put(&mut self, name: &str, value: impl Into<Value>) -> Result<(), TreeError> {
        validate_name(name)?;
        let value = value.into();
        let kind = value.kind();
        let depth = match &value {
            Value::Tree(child) => child.nesting_depth() + 1,
            _ => 0,
        };
        if depth > MAX_NESTING_DEPTH {
            return Err(TreeError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }
        let data = value.to_data();
        check_frame_lengths(kind, name.len(), data.len())?;

        match self.position(name) {
            Some(pos) if self.elements[pos].kind == kind => {
                let element = &mut self.elements[pos];
                element.data = data;
                element.depth = depth;
            }
            Some(pos) => {
                self.remove_at(pos);
                self.push(name.to_string(), kind, data, depth);
            }
            None => self.push(name.to_string(), kind, data, depth),
        }
        Ok(())
    }

    /// Fetch a typed copy of an element.
    ///
    /// # Errors
    ///
    /// - [`TreeError::NotFound`] if no element has this name.
    /// - [`TreeError::TypeMismatch`] if it is stored as a different kind.
    pub fn get<T: TreeValue>(&self, name: &str) -> Result<T, TreeError> {
        let element = self.element(name)?;
        if element.kind != T::KIND {
            return Err(TreeError::TypeMismatch {
                name: name.to_string(),
                expected: T::KIND,
                found: element.kind,
            });
        }
        T::from_data(&element.data)
    }

    /// Fetch an element as a dynamically typed [`Value`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotFound`] if no element has this name.
    pub fn get_value(&self, name: &str) -> Result<Value, TreeError> {
        let element = self.element(name)?;
        Value::from_data(element.kind, &element.data)
    }

    /// The kind stored under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::NotFound`] if no element has this name.
    pub fn kind_of(&self, name: &str) -> Result<ValueKind, TreeError> {
        self.element(name).map(|e| e.kind)
    }

    /// True if an element named `name` exists with exactly `kind`.
    pub fn is_present(&self, name: &str, kind: ValueKind) -> bool {
        self.position(name)
            .is_some_and(|pos| self.elements[pos].kind == kind)
    }

    /// Remove an element. Returns whether anything was removed.
    pub fn remove(&mut self, name: &str) -> bool {
        match self.position(name) {
            Some(pos) => {
                self.remove_at(pos);
                true
            }
            None => false,
        }
    }

    /// Element names in insertion order. Each call starts a fresh iteration.
    pub fn names(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.elements.iter().map(|e| e.name.as_str())
    }

    /// Borrowed views of every element in insertion order.
    pub fn elements(&self) -> impl ExactSizeIterator<Item = ElementRef<'_>> + '_ {
        self.elements.iter().map(|e| ElementRef {
            name: &e.name,
            hash: e.hash,
            kind: e.kind,
            data: &e.data,
        })
    }

    /// Number of elements at this level.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// True if the tree has no elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Levels of nested trees below this one: zero when no element holds a
    /// tree, otherwise one more than the deepest child.
    pub fn nesting_depth(&self) -> usize {
        self.elements.iter().map(|e| e.depth).max().unwrap_or(0)
    }

    /// Remove every element.
    pub fn clear(&mut self) {
        self.elements.clear();
        self.index.clear();
    }

    /// Exact length of [`serialize`](Self::serialize) output.
    pub fn serialized_len(&self) -> usize {
        self.elements
            .iter()
            .map(|e| frame_len(&e.name, e.data.len()))
            .sum()
    }

    /// Concatenate every element's frame in insertion order.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.serialized_len());
        for e in &self.elements {
            encode_frame_into(&mut out, &e.name, e.kind, &e.data);
        }
        out
    }

    /// Parse a serialized tree.
    ///
    /// Nested tree payloads are validated recursively up to
    /// [`MAX_NESTING_DEPTH`].
    ///
    /// # Errors
    ///
    /// - [`TreeError::Frame`] if a frame fails to decode; offsets are
    ///   relative to the start of `bytes`.
    /// - [`TreeError::TrailingData`] if fewer bytes than the smallest
    ///   possible frame remain after the last complete frame.
    /// - [`TreeError::DuplicateName`] if a name appears twice.
    /// - [`TreeError::InvalidValue`] if a payload is invalid for its kind.
    /// - [`TreeError::NestingTooDeep`] past the depth limit.
    pub fn parse(bytes: &[u8]) -> Result<Self, TreeError> {
        Self::parse_at_depth(bytes, 0)
    }

    fn parse_at_depth(bytes: &[u8], depth: usize) -> Result<Self, TreeError> {
        if depth > MAX_NESTING_DEPTH {
            return Err(TreeError::NestingTooDeep {
                limit: MAX_NESTING_DEPTH,
            });
        }

        let mut tree = Self::new();
        let mut offset = 0;
        while offset < bytes.len() {
            let remaining = bytes.len() - offset;
            if remaining < MIN_FRAME_LEN {
                return Err(TreeError::TrailingData { offset, remaining });
            }

            let frame = decode_frame(&bytes[offset..]).map_err(|e| e.shifted(offset))?;

            let element_depth = if frame.kind == ValueKind::Tree {
                Self::parse_at_depth(frame.data, depth + 1)?.nesting_depth() + 1
            } else {
                validate_scalar(frame.kind, frame.data)?;
                0
            };

            if tree.position(frame.name).is_some() {
                return Err(TreeError::DuplicateName(frame.name.to_string()));
            }
            tree.push(
                frame.name.to_string(),
                frame.kind,
                frame.data.to_vec(),
                element_depth,
            );
            offset += frame.consumed;
        }
        Ok(tree)
    }

    fn element(&self, name: &str) -> Result<&Element, TreeError> {
        self.position(name)
            .map(|pos| &self.elements[pos])
            .ok_or_else(|| TreeError::NotFound(name.to_string()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        let hash = name_hash(name);
        self.index
            .get(&hash)?
            .iter()
            .copied()
            .find(|&pos| self.elements[pos].name == name)
    }

    fn push(&mut self, name: String, kind: ValueKind, data: Vec<u8>, depth: usize) {
        let hash = name_hash(&name);
        self.index.entry(hash).or_default().push(self.elements.len());
        self.elements.push(Element {
            name,
            hash,
            kind,
            data,
            depth,
        });
    }

    fn remove_at(&mut self, pos: usize) {
        self.elements.remove(pos);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (pos, e) in self.elements.iter().enumerate() {
            self.index.entry(e.hash).or_default().push(pos);
        }
    }

    fn write_dump(&self, f: &mut std::fmt::Formatter<'_>, depth: usize) -> std::fmt::Result {
        for e in &self.elements {
            write!(f, "{:indent$}{} ({})", "", e.name, e.kind, indent = depth * 2)?;
            match Value::from_data(e.kind, &e.data) {
                Ok(Value::Tree(child)) => {
                    writeln!(f, ":")?;
                    child.write_dump(f, depth + 1)?;
                }
                Ok(value) => writeln!(f, ": {value}")?,
                Err(err) => writeln!(f, ": <{err}>")?,
            }
        }
        Ok(())
    }
}

impl PartialEq for StructuredBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl Eq for StructuredBuffer {}

/// Indented dump, one element per line, nested trees expanded.
impl std::fmt::Display for StructuredBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.write_dump(f, 0)
    }
}

fn validate_name(name: &str) -> Result<(), TreeError> {
    if name.is_empty() || name.contains('\0') {
        return Err(TreeError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// The frame stores `name.len() + 1` and the payload length as `u32`.
fn check_frame_lengths(
    kind: ValueKind,
    name_len: usize,
    data_len: usize,
) -> Result<(), TreeError> {
    let limit = u32::MAX as usize;
    if name_len >= limit {
        return Err(TreeError::InvalidValue {
            kind,
            reason: format!("name of {name_len} bytes exceeds the 32-bit frame length field"),
        });
    }
    if data_len > limit {
        return Err(TreeError::InvalidValue {
            kind,
            reason: format!("payload of {data_len} bytes exceeds the 32-bit frame length field"),
        });
    }
    Ok(())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn scalar_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            any::<bool>().prop_map(Value::Boolean),
            any::<i8>().prop_map(Value::Int8),
            any::<i64>().prop_map(Value::Int64),
            any::<u16>().prop_map(Value::UInt16),
            any::<u32>().prop_map(Value::DoubleWord),
            any::<u64>().prop_map(Value::UInt64),
            any::<u8>().prop_map(Value::Byte),
            (-1.0e12f64..1.0e12).prop_map(Value::Float64),
            "[ -~]{0,32}".prop_map(Value::String),
            prop::collection::vec(any::<u8>(), 0..64).prop_map(Value::Buffer),
        ]
    }

    fn tree_strategy() -> impl Strategy<Value = StructuredBuffer> {
        let leaf = prop::collection::vec(("[a-z]{1,8}", scalar_value()), 0..6)
            .prop_map(build);
        leaf.prop_recursive(6, 64, 6, |inner| {
            prop::collection::vec(
                (
                    "[a-z]{1,8}",
                    prop_oneof![scalar_value(), inner.prop_map(Value::Tree)],
                ),
                0..6,
            )
            .prop_map(build)
        })
    }

    fn build(entries: Vec<(String, Value)>) -> StructuredBuffer {
        let mut tree = StructuredBuffer::new();
        for (name, value) in entries {
            tree.put(&name, value).unwrap();
        }
        tree
    }

    proptest! {
        /// Parse inverts serialize for arbitrary nested trees.
        #[test]
        fn serialize_parse_round_trip(tree in tree_strategy()) {
            let bytes = tree.serialize();
            prop_assert_eq!(bytes.len(), tree.serialized_len());
            let parsed = StructuredBuffer::parse(&bytes).unwrap();
            prop_assert_eq!(&parsed, &tree);
            prop_assert_eq!(parsed.serialize(), bytes);
        }

        /// Names stay unique no matter how puts collide.
        #[test]
        fn names_unique(entries in prop::collection::vec(("[a-c]{1,2}", scalar_value()), 0..32)) {
            let tree = build(entries);
            let mut names: Vec<&str> = tree.names().collect();
            let total = names.len();
            names.sort_unstable();
            names.dedup();
            prop_assert_eq!(names.len(), total);
        }

        /// Arbitrary bytes never panic the parser.
        #[test]
        fn parse_arbitrary_bytes_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..256)) {
            let _ = StructuredBuffer::parse(&bytes);
        }
    }
}
