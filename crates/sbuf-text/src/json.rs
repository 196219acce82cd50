//! # Tree ↔ JSON Bridge
//!
//! Converts [`StructuredBuffer`] trees to and from JSON objects. Member order
//! follows element insertion order (serde_json is built with
//! `preserve_order`).
//!
//! ## Tree → JSON
//!
//! | Kind                               | JSON                         |
//! |------------------------------------|------------------------------|
//! | Boolean                            | `true` / `false`             |
//! | integers, Word, DoubleWord, Byte   | number                       |
//! | Float32, Float64                   | number (must be finite)      |
//! | String                             | string                       |
//! | Buffer                             | base-64 string               |
//! | Identifier                         | hyphenated string            |
//! | Tree                               | nested object                |
//!
//! ## JSON → Tree
//!
//! JSON carries no width or sign, so integers become the narrowest fitting
//! kind: `UInt8..UInt64` when non-negative, `Int8..Int64` when negative.
//! Other numbers become `Float64`. Strings stay strings (a base-64 buffer or
//! an identifier comes back as a String). `null` and arrays have no element
//! kind and are rejected.
//!
//! Exact kinds therefore survive only the binary and base-64 paths; this
//! bridge is lossy by contract.

use std::io;

use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use serde_json::{Map, Number};

use sbuf_core::{StructuredBuffer, TreeError, Value, ValueKind, MAX_NESTING_DEPTH};

use crate::base64;
use crate::error::BridgeError;
use crate::escape::escape;

/// Convert a tree to a JSON object.
///
/// # Errors
///
/// - [`BridgeError::NonFiniteFloat`] for a NaN or infinite float element.
/// - [`BridgeError::Tree`] if a stored payload fails to decode.
pub fn to_json_value(tree: &StructuredBuffer) -> Result<serde_json::Value, BridgeError> {
    let value = tree_to_object(tree, "")?;
    tracing::debug!(elements = tree.len(), "converted tree to JSON");
    Ok(value)
}

/// Render a tree as JSON text.
///
/// String contents follow [`escape`](crate::escape::escape), so `/` is
/// written as `\/` in addition to serde_json's standard escapes.
///
/// # Errors
///
/// As [`to_json_value`], plus [`BridgeError::Json`] if rendering fails.
pub fn to_json_string(tree: &StructuredBuffer, pretty: bool) -> Result<String, BridgeError> {
    let value = to_json_value(tree)?;
    let mut buf = Vec::with_capacity(tree.serialized_len());
    if pretty {
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, SlashEscaping(PrettyFormatter::new()));
        value.serialize(&mut ser)?;
    } else {
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, SlashEscaping(CompactFormatter));
        value.serialize(&mut ser)?;
    }
    String::from_utf8(buf).map_err(|e| BridgeError::Json(serde::ser::Error::custom(e)))
}

/// Parse JSON text into a tree.
///
/// # Errors
///
/// [`BridgeError::Json`] for invalid JSON text, otherwise as
/// [`from_json_value`].
pub fn from_json_str(text: &str) -> Result<StructuredBuffer, BridgeError> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    from_json_value(&value)
}

/// Build a tree from a JSON object.
///
/// # Errors
///
/// - [`BridgeError::NotAnObject`] unless `value` is an object.
/// - [`BridgeError::Unrepresentable`] for `null` or array members.
/// - [`BridgeError::Tree`] for a member name the tree rejects (empty or
///   containing NUL), or nesting past [`MAX_NESTING_DEPTH`].
pub fn from_json_value(value: &serde_json::Value) -> Result<StructuredBuffer, BridgeError> {
    let serde_json::Value::Object(map) = value else {
        return Err(BridgeError::NotAnObject {
            found: json_type(value),
        });
    };
    let tree = object_to_tree(map, "", 0)?;
    tracing::debug!(elements = tree.len(), "built tree from JSON");
    Ok(tree)
}

fn tree_to_object(tree: &StructuredBuffer, prefix: &str) -> Result<serde_json::Value, BridgeError> {
    let mut map = Map::with_capacity(tree.len());
    for element in tree.elements() {
        let path = join_path(prefix, element.name);
        let json = match Value::from_data(element.kind, element.data)? {
            Value::Boolean(v) => serde_json::Value::Bool(v),
            Value::Int8(v) => v.into(),
            Value::Int16(v) => v.into(),
            Value::Int32(v) => v.into(),
            Value::Int64(v) => v.into(),
            Value::UInt8(v) | Value::Byte(v) => v.into(),
            Value::UInt16(v) | Value::Word(v) => v.into(),
            Value::UInt32(v) | Value::DoubleWord(v) => v.into(),
            Value::UInt64(v) => v.into(),
            Value::Float32(v) => float(f64::from(v), &path)?,
            Value::Float64(v) => float(v, &path)?,
            Value::String(v) => serde_json::Value::String(v),
            Value::Buffer(v) => serde_json::Value::String(base64::encode(&v)),
            Value::Identifier(v) => serde_json::Value::String(v.to_string()),
            Value::Tree(child) => tree_to_object(&child, &path)?,
        };
        map.insert(element.name.to_string(), json);
    }
    Ok(serde_json::Value::Object(map))
}

fn float(v: f64, path: &str) -> Result<serde_json::Value, BridgeError> {
    Number::from_f64(v)
        .map(serde_json::Value::Number)
        .ok_or_else(|| BridgeError::NonFiniteFloat {
            name: path.to_string(),
        })
}

fn object_to_tree(
    map: &Map<String, serde_json::Value>,
    prefix: &str,
    depth: usize,
) -> Result<StructuredBuffer, BridgeError> {
    if depth > MAX_NESTING_DEPTH {
        return Err(TreeError::NestingTooDeep {
            limit: MAX_NESTING_DEPTH,
        }
        .into());
    }

    let mut tree = StructuredBuffer::new();
    for (name, member) in map {
        let path = join_path(prefix, name);
        let value = match member {
            serde_json::Value::Bool(b) => Value::Boolean(*b),
            serde_json::Value::Number(n) => infer_number(n),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Object(child) => Value::Tree(object_to_tree(child, &path, depth + 1)?),
            serde_json::Value::Null | serde_json::Value::Array(_) => {
                return Err(BridgeError::Unrepresentable {
                    name: path,
                    json_type: json_type(member),
                });
            }
        };
        tracing::trace!(name = %path, kind = %value.kind(), "inferred element kind");
        tree.put(name, value)?;
    }
    Ok(tree)
}

/// Narrowest kind for a JSON number.
fn infer_number(n: &Number) -> Value {
    if let Some(u) = n.as_u64() {
        if let Ok(v) = u8::try_from(u) {
            Value::UInt8(v)
        } else if let Ok(v) = u16::try_from(u) {
            Value::UInt16(v)
        } else if let Ok(v) = u32::try_from(u) {
            Value::UInt32(v)
        } else {
            Value::UInt64(u)
        }
    } else if let Some(i) = n.as_i64() {
        if let Ok(v) = i8::try_from(i) {
            Value::Int8(v)
        } else if let Ok(v) = i16::try_from(i) {
            Value::Int16(v)
        } else if let Ok(v) = i32::try_from(i) {
            Value::Int32(v)
        } else {
            Value::Int64(i)
        }
    } else {
        // Without arbitrary_precision every non-integer Number is a finite f64.
        Value::Float64(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn join_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Wraps a serde_json formatter so string fragments also escape `/`.
///
/// serde_json hands unescaped runs to `write_string_fragment` and routes
/// every character it escapes itself through `write_char_escape`, whose
/// output already matches [`escape`]. Only `/` needs adding.
struct SlashEscaping<F>(F);

impl<F: Formatter> Formatter for SlashEscaping<F> {
    fn write_string_fragment<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        fragment: &str,
    ) -> io::Result<()> {
        writer.write_all(escape(fragment).as_bytes())
    }

    fn begin_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_array(writer)
    }

    fn end_array<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array(writer)
    }

    fn begin_array_value<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_array_value(writer, first)
    }

    fn end_array_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_array_value(writer)
    }

    fn begin_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object(writer)
    }

    fn end_object<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object(writer)
    }

    fn begin_object_key<W: ?Sized + io::Write>(
        &mut self,
        writer: &mut W,
        first: bool,
    ) -> io::Result<()> {
        self.0.begin_object_key(writer, first)
    }

    fn begin_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.begin_object_value(writer)
    }

    fn end_object_value<W: ?Sized + io::Write>(&mut self, writer: &mut W) -> io::Result<()> {
        self.0.end_object_value(writer)
    }
}
