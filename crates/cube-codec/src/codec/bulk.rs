//! Bulk arrays <-> `{data, [mask, fill_value], shape, dtype}`.
//!
//! `data` and `mask` are nested lists following `shape`; flat lists are also
//! accepted on decode. The fill value is written as a string and read back
//! integer-first, so `"255"` is an integer and `"1e20"` a float.

use ndarray::{ArrayD, IxDyn};
use serde_json::{Map, Value};

use crate::codec::{field_path, flatten_leaves, kind, nest_leaves, required, usize_list};
use crate::error::{CodecError, Result};
use crate::types::array::{ArrayData, DataType, FillValue, MaskedArray, NdArray};

pub fn encode_array(array: &NdArray) -> Map<String, Value> {
    let shape = array.shape().to_vec();
    let mut doc = Map::new();
    doc.insert(
        "data".to_string(),
        nest_leaves(array.values().to_json_leaves(), &shape),
    );
    if let NdArray::Masked(masked) = array {
        doc.insert(
            "mask".to_string(),
            nest_leaves(masked.mask().iter().map(|m| Value::Bool(*m)).collect(), &shape),
        );
        doc.insert(
            "fill_value".to_string(),
            Value::String(masked.fill_value().to_string()),
        );
    }
    doc.insert("shape".to_string(), Value::from(shape));
    doc.insert("dtype".to_string(), Value::from(array.dtype().as_str()));
    doc
}

/// The recorded shape and element type, without touching `data`.
pub fn decode_shape_and_dtype(doc: &Map<String, Value>, field: &str) -> Result<(Vec<usize>, DataType)> {
    let shape = usize_list(required(doc, field, "shape")?, &field_path(field, "shape"))?;
    let dtype_field = field_path(field, "dtype");
    let dtype = match required(doc, field, "dtype")? {
        Value::String(s) => s
            .parse::<DataType>()
            .map_err(|message| CodecError::invalid_value(&dtype_field, message))?,
        other => {
            return Err(CodecError::type_mismatch(
                dtype_field,
                format!("a string, found {}", kind(other)),
            ))
        }
    };
    Ok((shape, dtype))
}

pub fn decode_fill_value(value: &Value, field: &str) -> Result<FillValue> {
    match value {
        Value::String(s) => s
            .parse()
            .map_err(|message: String| CodecError::invalid_value(field, message)),
        Value::Number(n) => Ok(match n.as_i64() {
            Some(i) => FillValue::Int(i as i128),
            None => FillValue::Float(n.as_f64().unwrap_or(f64::NAN)),
        }),
        other => Err(CodecError::type_mismatch(
            field,
            format!("a numeric string, found {}", kind(other)),
        )),
    }
}

fn decode_mask(value: &Value, shape: &[usize], field: &str) -> Result<ArrayD<bool>> {
    let leaves = flatten_leaves(value);
    let expected: usize = shape.iter().product();
    let flags = leaves
        .iter()
        .enumerate()
        .map(|(i, leaf)| match leaf {
            Value::Bool(b) => Ok(*b),
            Value::Number(n) if n.as_u64().map_or(false, |v| v <= 1) => Ok(n.as_u64() == Some(1)),
            _ => Err(CodecError::type_mismatch(format!("{}[{}]", field, i), "a boolean")),
        })
        .collect::<Result<Vec<bool>>>()?;

    // A single flag applies to every element.
    let flags = match flags.as_slice() {
        [flag] if expected != 1 => vec![*flag; expected],
        _ => flags,
    };
    let found = flags.len();
    ArrayD::from_shape_vec(IxDyn(shape), flags)
        .map_err(|_| CodecError::shape_mismatch(field, shape, &[found]))
}

/// Rebuild a plain or masked array, reshaped to `shape` and cast to `dtype`.
pub fn decode_array(doc: &Map<String, Value>, field: &str) -> Result<NdArray> {
    let (shape, dtype) = decode_shape_and_dtype(doc, field)?;
    let data_field = field_path(field, "data");
    let leaves = flatten_leaves(required(doc, field, "data")?);
    let expected: usize = shape.iter().product();
    if leaves.len() != expected {
        return Err(CodecError::shape_mismatch(data_field, &shape, &[leaves.len()]));
    }
    let values = ArrayData::from_json_leaves(dtype, &leaves, &shape, &data_field)?;

    match doc.get("mask") {
        None | Some(Value::Null) => Ok(NdArray::Plain(values)),
        Some(mask) => {
            let mask = decode_mask(mask, &shape, &field_path(field, "mask"))?;
            let fill_value = match doc.get("fill_value") {
                None | Some(Value::Null) => dtype.default_fill_value(),
                Some(fill) => decode_fill_value(fill, &field_path(field, "fill_value"))?,
            };
            Ok(NdArray::Masked(MaskedArray::new(values, mask, fill_value)?))
        }
    }
}
