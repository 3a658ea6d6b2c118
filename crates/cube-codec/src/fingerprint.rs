//! Metadata fingerprint of a cube.
//!
//! Two cubes with the same name, dimension coordinates, shape, coordinate
//! system and cell methods share a fingerprint, whatever their values.

use uuid::Uuid;

use crate::types::cube::Cube;

fn metadata_summary(cube: &Cube) -> String {
    let dims: Vec<&str> = cube.dim_coords().iter().map(|(c, _)| c.name()).collect();
    let coord_system = cube
        .coord_system()
        .map(|cs| cs.to_string())
        .unwrap_or_else(|| "None".to_string());
    let cell_methods: Vec<String> = cube.cell_methods.iter().map(|cm| cm.to_string()).collect();
    format!(
        "{}_{}_{:?}_{}_{}",
        cube.name(),
        dims.join(","),
        cube.shape(),
        coord_system,
        cell_methods.join(" ")
    )
}

/// `"{name}_{hash}"`, the hash being a name-based UUID of the metadata
/// summary in simple (undashed) form.
pub fn metadata_hash(cube: &Cube) -> String {
    let summary = metadata_summary(cube);
    let hash = Uuid::new_v5(&Uuid::NAMESPACE_OID, summary.as_bytes());
    format!("{}_{}", cube.name(), hash.simple())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::array::ArrayData;
    use crate::types::cell_method::CellMethod;
    use crate::types::coords::Coord;
    use crate::types::units::Unit;
    use ndarray::{ArrayD, IxDyn};

    fn cube(fill: f32) -> Cube {
        let data = ArrayData::from(ArrayD::from_elem(IxDyn(&[2, 3]), fill));
        let mut cube = Cube::new(data, Unit::new("K").unwrap()).with_standard_name("air_temperature");
        cube.add_dim_coord(
            Coord::from_vec(vec![-1.0, 1.0], Unit::new("degrees").unwrap()).with_standard_name("latitude"),
            0,
        )
        .unwrap();
        cube
    }

    #[test]
    fn test_values_do_not_change_hash() {
        let hash = metadata_hash(&cube(0.0));
        assert_eq!(hash, metadata_hash(&cube(1.0)));
        assert!(hash.starts_with("air_temperature_"));
        assert_eq!(hash.len(), "air_temperature_".len() + 32);
    }

    #[test]
    fn test_metadata_changes_hash() {
        let plain = cube(0.0);
        let with_method = cube(0.0).with_cell_method(CellMethod::new("mean").with_coords(["time"]));
        assert_ne!(metadata_hash(&plain), metadata_hash(&with_method));

        let mut renamed = cube(0.0);
        renamed.standard_name = None;
        renamed.long_name = Some("temp".to_string());
        assert!(metadata_hash(&renamed).starts_with("temp_"));
    }

    #[test]
    fn test_summary_format() {
        assert_eq!(
            metadata_summary(&cube(0.0)),
            "air_temperature_latitude_[2, 3]_None_"
        );
    }
}
