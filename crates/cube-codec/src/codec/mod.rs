//! Encoders and decoders between the data model and documents.
//!
//! Each sub-codec works on one part of a cube document and reports errors
//! with the dotted path of the field it was handed.

pub mod attributes;
pub mod bulk;
pub mod cell_method;
pub mod coord;
pub mod coord_system;
pub mod cube;
pub mod units;

use serde_json::{Map, Value};

use crate::error::{CodecError, Result};

/// Join a document path and a key: `dim_coords` + `latitude`.
pub(crate) fn field_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", prefix, key)
    }
}

/// Describe a JSON value's kind for error messages.
pub(crate) fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn required<'a>(map: &'a Map<String, Value>, prefix: &str, key: &str) -> Result<&'a Value> {
    map.get(key)
        .ok_or_else(|| CodecError::missing_field(field_path(prefix, key)))
}

pub(crate) fn required_object<'a>(
    map: &'a Map<String, Value>,
    prefix: &str,
    key: &str,
) -> Result<&'a Map<String, Value>> {
    let value = required(map, prefix, key)?;
    value.as_object().ok_or_else(|| {
        CodecError::type_mismatch(
            field_path(prefix, key),
            format!("an object, found {}", kind(value)),
        )
    })
}

pub(crate) fn required_str<'a>(map: &'a Map<String, Value>, prefix: &str, key: &str) -> Result<&'a str> {
    let value = required(map, prefix, key)?;
    value.as_str().ok_or_else(|| {
        CodecError::type_mismatch(
            field_path(prefix, key),
            format!("a string, found {}", kind(value)),
        )
    })
}

/// A string field that may be absent or null.
pub(crate) fn optional_string(map: &Map<String, Value>, prefix: &str, key: &str) -> Result<Option<String>> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(CodecError::type_mismatch(
            field_path(prefix, key),
            format!("a string or null, found {}", kind(other)),
        )),
    }
}

/// A list of non-negative integers, e.g. a shape.
pub(crate) fn usize_list(value: &Value, field: &str) -> Result<Vec<usize>> {
    let mismatch = || CodecError::type_mismatch(field, "a list of non-negative integers");
    value
        .as_array()
        .ok_or_else(mismatch)?
        .iter()
        .map(|v| v.as_u64().map(|n| n as usize).ok_or_else(mismatch))
        .collect()
}

/// Leaves of a possibly nested list, in row-major order. A non-list value is
/// a single leaf.
pub(crate) fn flatten_leaves(value: &Value) -> Vec<&Value> {
    fn walk<'a>(value: &'a Value, out: &mut Vec<&'a Value>) {
        match value {
            Value::Array(items) => items.iter().for_each(|item| walk(item, out)),
            leaf => out.push(leaf),
        }
    }
    let mut out = Vec::new();
    walk(value, &mut out);
    out
}

/// Nest row-major leaves into lists following `shape`.
pub(crate) fn nest_leaves(leaves: Vec<Value>, shape: &[usize]) -> Value {
    fn build(leaves: &mut std::vec::IntoIter<Value>, shape: &[usize]) -> Value {
        match shape.split_first() {
            None => leaves.next().unwrap_or(Value::Null),
            Some((&len, rest)) => Value::Array((0..len).map(|_| build(leaves, rest)).collect()),
        }
    }
    build(&mut leaves.into_iter(), shape)
}
