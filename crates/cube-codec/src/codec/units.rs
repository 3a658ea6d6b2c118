//! Unit <-> `{unit, calendar}`.

use serde_json::{json, Value};

use crate::codec::{field_path, kind, required_str};
use crate::error::{CodecError, Result};
use crate::types::units::{Calendar, Unit};

/// `{"unit": "...", "calendar": "..." | null}`; the calendar is null for
/// non-temporal units.
pub fn encode_unit(unit: &Unit) -> Value {
    json!({
        "unit": unit.definition(),
        "calendar": unit.calendar().map(|c| c.as_str()),
    })
}

pub fn decode_unit(value: &Value, field: &str) -> Result<Unit> {
    let map = value.as_object().ok_or_else(|| {
        CodecError::type_mismatch(field, format!("an object, found {}", kind(value)))
    })?;
    let definition = required_str(map, field, "unit")?;
    let unit_field = field_path(field, "unit");

    let relocate = |err: CodecError| match err {
        CodecError::MalformedUnit { unit, message, .. } => CodecError::MalformedUnit {
            field: unit_field.clone(),
            unit,
            message,
        },
        other => other,
    };

    match map.get("calendar") {
        None | Some(Value::Null) => Unit::new(definition).map_err(relocate),
        Some(Value::String(name)) => {
            let calendar: Calendar = name.parse().map_err(|message: String| {
                CodecError::malformed_unit(field_path(field, "calendar"), definition, message)
            })?;
            Unit::with_calendar(definition, calendar).map_err(relocate)
        }
        Some(other) => Err(CodecError::type_mismatch(
            field_path(field, "calendar"),
            format!("a string or null, found {}", kind(other)),
        )),
    }
}
