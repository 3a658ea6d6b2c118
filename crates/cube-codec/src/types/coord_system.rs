//! Geodetic and projected coordinate reference systems.
//!
//! The set of systems is closed: plain geographic, rotated-pole geographic
//! and Mercator. The serialized form is a flat record tagged by `name`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Names of the supported systems, as written in the `name` field.
pub const KNOWN_COORD_SYSTEMS: [&str; 3] = [
    "latitude_longitude",
    "rotated_latitude_longitude",
    "mercator",
];

/// A reference ellipsoid (or sphere, when only the semi-major axis is set).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ellipsoid {
    pub semi_major_axis: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semi_minor_axis: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inverse_flattening: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude_of_prime_meridian: Option<f64>,
}

impl Ellipsoid {
    /// A sphere of the given radius in metres.
    pub fn sphere(radius: f64) -> Self {
        Self {
            semi_major_axis: radius,
            semi_minor_axis: None,
            inverse_flattening: None,
            longitude_of_prime_meridian: None,
        }
    }

    pub fn from_axes(semi_major_axis: f64, semi_minor_axis: f64) -> Self {
        Self {
            semi_minor_axis: Some(semi_minor_axis),
            ..Self::sphere(semi_major_axis)
        }
    }

    pub fn from_inverse_flattening(semi_major_axis: f64, inverse_flattening: f64) -> Self {
        Self {
            inverse_flattening: Some(inverse_flattening),
            ..Self::sphere(semi_major_axis)
        }
    }

    /// WGS84.
    pub fn wgs84() -> Self {
        Self::from_inverse_flattening(6378137.0, 298.257223563)
    }
}

impl Default for Ellipsoid {
    /// The spherical Earth used by the Met Office Unified Model.
    fn default() -> Self {
        Self::sphere(6371229.0)
    }
}

/// Rotated-pole geographic system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotatedPole {
    pub grid_north_pole_latitude: f64,
    pub grid_north_pole_longitude: f64,
    #[serde(default)]
    pub north_pole_grid_longitude: f64,
    #[serde(default)]
    pub ellipsoid: Option<Ellipsoid>,
}

impl RotatedPole {
    pub fn new(grid_north_pole_latitude: f64, grid_north_pole_longitude: f64) -> Self {
        Self {
            grid_north_pole_latitude,
            grid_north_pole_longitude,
            north_pole_grid_longitude: 0.0,
            ellipsoid: None,
        }
    }

    pub fn with_ellipsoid(mut self, ellipsoid: Ellipsoid) -> Self {
        self.ellipsoid = Some(ellipsoid);
        self
    }
}

/// Mercator projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MercatorProjection {
    #[serde(default)]
    pub longitude_of_projection_origin: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub standard_parallel: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_factor_at_projection_origin: Option<f64>,
    #[serde(default)]
    pub false_easting: f64,
    #[serde(default)]
    pub false_northing: f64,
    #[serde(default)]
    pub ellipsoid: Option<Ellipsoid>,
}

impl Default for MercatorProjection {
    fn default() -> Self {
        Self {
            longitude_of_projection_origin: 0.0,
            standard_parallel: None,
            scale_factor_at_projection_origin: None,
            false_easting: 0.0,
            false_northing: 0.0,
            ellipsoid: None,
        }
    }
}

/// A coordinate reference system attached to spatial coordinates.
///
/// Only the non-geographic variants carry an `ellipsoid` sub-record; for the
/// plain geographic system the ellipsoid parameters are the system itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "name")]
pub enum CoordSystem {
    #[serde(rename = "latitude_longitude")]
    Geog(Ellipsoid),
    #[serde(rename = "rotated_latitude_longitude")]
    RotatedGeog(RotatedPole),
    #[serde(rename = "mercator")]
    Mercator(MercatorProjection),
}

impl CoordSystem {
    /// The CF grid-mapping name of this system.
    pub fn grid_mapping_name(&self) -> &'static str {
        match self {
            CoordSystem::Geog(_) => KNOWN_COORD_SYSTEMS[0],
            CoordSystem::RotatedGeog(_) => KNOWN_COORD_SYSTEMS[1],
            CoordSystem::Mercator(_) => KNOWN_COORD_SYSTEMS[2],
        }
    }

    /// The explicit ellipsoid of a non-geographic system.
    pub fn ellipsoid(&self) -> Option<&Ellipsoid> {
        match self {
            CoordSystem::Geog(_) => None,
            CoordSystem::RotatedGeog(rp) => rp.ellipsoid.as_ref(),
            CoordSystem::Mercator(m) => m.ellipsoid.as_ref(),
        }
    }
}

impl fmt::Display for CoordSystem {
    /// `name(key=value, ...)` in field order.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params = match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map
                .into_iter()
                .filter(|(k, _)| k != "name")
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join(", "),
            _ => String::new(),
        };
        write!(f, "{}({})", self.grid_mapping_name(), params)
    }
}
