//! Coordinate system <-> flat `name`-tagged record.

use serde_json::Value;

use crate::codec::{field_path, kind};
use crate::error::{CodecError, Result};
use crate::types::coord_system::{CoordSystem, KNOWN_COORD_SYSTEMS};

/// Null when there is no coordinate system.
pub fn encode_coord_system(cs: Option<&CoordSystem>) -> Result<Value> {
    match cs {
        None => Ok(Value::Null),
        Some(cs) => Ok(serde_json::to_value(cs)?),
    }
}

/// Dispatch on `name`. Names outside the supported set are an error.
pub fn decode_coord_system(value: &Value, field: &str) -> Result<Option<CoordSystem>> {
    let map = match value {
        Value::Null => return Ok(None),
        Value::Object(map) => map,
        other => {
            return Err(CodecError::type_mismatch(
                field,
                format!("an object or null, found {}", kind(other)),
            ))
        }
    };

    let name_field = field_path(field, "name");
    let name = match map.get("name") {
        Some(Value::String(name)) => name,
        Some(other) => {
            return Err(CodecError::type_mismatch(
                name_field,
                format!("a string, found {}", kind(other)),
            ))
        }
        None => return Err(CodecError::missing_field(name_field)),
    };
    if !KNOWN_COORD_SYSTEMS.contains(&name.as_str()) {
        return Err(CodecError::unknown_coord_system(name_field, name.clone()));
    }

    serde_json::from_value(value.clone())
        .map(Some)
        .map_err(|e| CodecError::invalid_value(field, format!("{} coordinate system: {}", name, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::coord_system::{Ellipsoid, MercatorProjection, RotatedPole};
    use serde_json::json;

    #[test]
    fn test_none_round_trip() {
        assert_eq!(encode_coord_system(None).unwrap(), Value::Null);
        assert_eq!(decode_coord_system(&Value::Null, "cs").unwrap(), None);
    }

    #[test]
    fn test_rotated_pole_round_trip() {
        let cs = CoordSystem::RotatedGeog(RotatedPole {
            grid_north_pole_latitude: 37.5,
            grid_north_pole_longitude: 177.5,
            north_pole_grid_longitude: 10.0,
            ellipsoid: Some(Ellipsoid::from_axes(6378137.0, 6356752.314245)),
        });
        let encoded = encode_coord_system(Some(&cs)).unwrap();
        assert_eq!(decode_coord_system(&encoded, "cs").unwrap(), Some(cs));
    }

    #[test]
    fn test_mercator_round_trip() {
        let cs = CoordSystem::Mercator(MercatorProjection {
            longitude_of_projection_origin: -90.0,
            standard_parallel: Some(20.0),
            ellipsoid: Some(Ellipsoid::wgs84()),
            ..MercatorProjection::default()
        });
        let encoded = encode_coord_system(Some(&cs)).unwrap();
        assert_eq!(encoded["name"], json!("mercator"));
        assert_eq!(decode_coord_system(&encoded, "cs").unwrap(), Some(cs));
    }

    #[test]
    fn test_geog_never_emits_ellipsoid() {
        let cs = CoordSystem::Geog(Ellipsoid::wgs84());
        let encoded = encode_coord_system(Some(&cs)).unwrap();
        assert!(encoded.get("ellipsoid").is_none());
        assert_eq!(decode_coord_system(&encoded, "cs").unwrap(), Some(cs));
    }

    #[test]
    fn test_unknown_name_is_an_error() {
        let err = decode_coord_system(
            &json!({"name": "utm", "zone": 30}),
            "dim_coords.x.coord_system",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CodecError::UnknownCoordinateSystem { ref field, ref name }
                if field == "dim_coords.x.coord_system.name" && name == "utm"
        ));
    }

    #[test]
    fn test_missing_parameter() {
        let err = decode_coord_system(
            &json!({"name": "rotated_latitude_longitude", "grid_north_pole_latitude": 37.5}),
            "cs",
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::InvalidValue { .. }));

        let err = decode_coord_system(&json!({"semi_major_axis": 1.0}), "cs").unwrap_err();
        assert!(matches!(err, CodecError::MissingField(ref f) if f == "cs.name"));
    }
}
