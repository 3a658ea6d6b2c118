//! Coordinate <-> coordinate document.
//!
//! A coordinate document carries the name triple, `units`, `attributes`,
//! `dims` (`"scalar"`, an axis number, or a list of axis numbers), point
//! statistics (`min`, `max`, `step`, `npoints`, `shape`), the optional flat
//! `points` list and `coord_system`.

use ndarray::{ArrayD, IxDyn};
use serde_json::{Map, Number, Value};

use crate::codec::attributes::{encode_attributes, AttributeDecoders};
use crate::codec::coord_system::{decode_coord_system, encode_coord_system};
use crate::codec::units::{decode_unit, encode_unit};
use crate::codec::{field_path, flatten_leaves, kind, optional_string, required, usize_list};
use crate::error::{CodecError, Result};
use crate::types::coords::{AxisSpec, Coord};

const SCALAR: &str = "scalar";

fn float_json(value: Option<f64>) -> Value {
    value
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

pub fn encode_axis_spec(axes: &AxisSpec) -> Value {
    match axes {
        AxisSpec::Scalar => Value::from(SCALAR),
        AxisSpec::Single(axis) => Value::from(*axis),
        AxisSpec::Multi(axes) => Value::from(axes.clone()),
    }
}

pub fn decode_axis_spec(value: &Value, field: &str) -> Result<AxisSpec> {
    match value {
        Value::String(s) if s == SCALAR => Ok(AxisSpec::Scalar),
        Value::String(s) => Err(CodecError::invalid_value(
            field,
            format!("expected \"{}\", found \"{}\"", SCALAR, s),
        )),
        Value::Number(n) => n
            .as_u64()
            .map(|axis| AxisSpec::Single(axis as usize))
            .ok_or_else(|| CodecError::invalid_value(field, "axis must be a non-negative integer")),
        Value::Array(_) => Ok(AxisSpec::from_axes(usize_list(value, field)?)),
        other => Err(CodecError::type_mismatch(
            field,
            format!("\"scalar\", an integer or a list, found {}", kind(other)),
        )),
    }
}

/// Encode a coordinate placed on `axes`.
///
/// Dimension coordinates must sit on exactly one axis.
pub fn encode_coord(
    coord: &Coord,
    axes: &AxisSpec,
    is_dimension: bool,
    include_points: bool,
) -> Result<Value> {
    if is_dimension && !matches!(axes, AxisSpec::Single(_)) {
        return Err(CodecError::axis_mismatch(
            coord.name(),
            format!("dimension coordinates span exactly one axis, found {}", axes),
        ));
    }

    let mut doc = Map::new();
    doc.insert("standard_name".into(), Value::from(coord.standard_name.clone()));
    doc.insert("long_name".into(), Value::from(coord.long_name.clone()));
    doc.insert("var_name".into(), Value::from(coord.var_name.clone()));
    doc.insert("units".into(), encode_unit(&coord.units));
    doc.insert("attributes".into(), encode_attributes(&coord.attributes));
    doc.insert("dims".into(), encode_axis_spec(axes));
    doc.insert("min".into(), float_json(coord.min()));
    doc.insert("max".into(), float_json(coord.max()));
    doc.insert("step".into(), float_json(coord.step()));
    doc.insert("npoints".into(), Value::from(coord.npoints()));
    doc.insert("shape".into(), Value::from(coord.shape().to_vec()));
    if include_points {
        let points: Vec<Value> = coord.points.iter().map(|p| float_json(Some(*p))).collect();
        doc.insert("points".into(), Value::Array(points));
    }
    doc.insert(
        "coord_system".into(),
        encode_coord_system(coord.coord_system.as_ref())?,
    );
    Ok(Value::Object(doc))
}

fn decode_points(value: &Value, shape: &[usize], field: &str) -> Result<ArrayD<f64>> {
    let points = flatten_leaves(value)
        .into_iter()
        .enumerate()
        .map(|(i, leaf)| match leaf {
            Value::Null => Ok(f64::NAN),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| CodecError::type_mismatch(format!("{}[{}]", field, i), "a number")),
            _ => Err(CodecError::type_mismatch(format!("{}[{}]", field, i), "a number")),
        })
        .collect::<Result<Vec<f64>>>()?;
    let found = points.len();
    ArrayD::from_shape_vec(IxDyn(shape), points)
        .map_err(|_| CodecError::shape_mismatch(field, shape, &[found]))
}

/// Decode a coordinate document and its axis placement.
///
/// With `treat_as_dimension` the coordinate must sit on a single axis (or be
/// scalar).
pub fn decode_coord(
    value: &Value,
    field: &str,
    treat_as_dimension: bool,
    decoders: &AttributeDecoders,
) -> Result<(Coord, AxisSpec)> {
    let map = value.as_object().ok_or_else(|| {
        CodecError::type_mismatch(field, format!("an object, found {}", kind(value)))
    })?;

    let axes = decode_axis_spec(required(map, field, "dims")?, &field_path(field, "dims"))?;
    let shape = usize_list(required(map, field, "shape")?, &field_path(field, "shape"))?;
    let points_field = field_path(field, "points");
    let points = decode_points(required(map, field, "points")?, &shape, &points_field)?;

    if let Some(npoints) = map.get("npoints").and_then(Value::as_u64) {
        if npoints as usize != points.len() {
            return Err(CodecError::shape_mismatch(
                field_path(field, "npoints"),
                &[npoints as usize],
                &[points.len()],
            ));
        }
    }

    let mut coord = Coord::new(points, decode_unit(required(map, field, "units")?, &field_path(field, "units"))?);
    coord.standard_name = optional_string(map, field, "standard_name")?;
    coord.long_name = optional_string(map, field, "long_name")?;
    coord.var_name = optional_string(map, field, "var_name")?;
    coord.coord_system = match map.get("coord_system") {
        Some(cs) => decode_coord_system(cs, &field_path(field, "coord_system"))?,
        None => None,
    };
    coord.attributes = match map.get("attributes") {
        None | Some(Value::Null) => Default::default(),
        Some(attrs) => decoders.decode(attrs, &field_path(field, "attributes"))?,
    };

    if treat_as_dimension && matches!(axes, AxisSpec::Multi(_)) {
        return Err(CodecError::axis_mismatch(
            coord.name(),
            format!("dimension coordinates span exactly one axis, found {}", axes),
        ));
    }
    Ok((coord, axes))
}
