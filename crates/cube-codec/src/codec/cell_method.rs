//! Cell method <-> `{method, coords, intervals, comments}` strings.
//!
//! Coordinate names and intervals are joined with `,`, comments with `:,:`.
//! Delimiters inside names are not escaped, so a coordinate name containing a
//! comma does not survive a round trip. An empty string decodes to an empty list.

use serde_json::{json, Map, Value};

use crate::codec::{kind, required_str};
use crate::error::{CodecError, Result};
use crate::types::cell_method::CellMethod;

const LIST_DELIMITER: &str = ",";
const COMMENT_DELIMITER: &str = ":,:";

pub fn encode_cell_method(cm: &CellMethod) -> Value {
    json!({
        "method": cm.method,
        "coords": cm.coord_names.join(LIST_DELIMITER),
        "intervals": cm.intervals.join(LIST_DELIMITER),
        "comments": cm.comments.join(COMMENT_DELIMITER),
    })
}

fn split(joined: &str, delimiter: &str) -> Vec<String> {
    if joined.is_empty() {
        Vec::new()
    } else {
        joined.split(delimiter).map(str::to_string).collect()
    }
}

/// A joined list field; absent or null reads as empty.
fn joined<'a>(map: &'a Map<String, Value>, field: &str, key: &str) -> Result<&'a str> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(""),
        Some(_) => required_str(map, field, key),
    }
}

pub fn decode_cell_method(value: &Value, field: &str) -> Result<CellMethod> {
    let map = value.as_object().ok_or_else(|| {
        CodecError::type_mismatch(field, format!("an object, found {}", kind(value)))
    })?;
    Ok(CellMethod {
        method: required_str(map, field, "method")?.to_string(),
        coord_names: split(joined(map, field, "coords")?, LIST_DELIMITER),
        intervals: split(joined(map, field, "intervals")?, LIST_DELIMITER),
        comments: split(joined(map, field, "comments")?, COMMENT_DELIMITER),
    })
}
