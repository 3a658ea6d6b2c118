//! Ready-made cubes covering the common shapes of stored data.

use cube_codec::{
    ArrayData, AxisSpec, CellMethod, Coord, CoordSystem, Cube, Ellipsoid, FillValue, MaskedArray,
    NdArray, RotatedPole, StashCode, Unit,
};

use crate::generators::{diagonal_mask, precipitation_field, regular_points, temperature_field};

/// Earth radius used by the fixtures' spherical coordinate systems.
pub const EARTH_RADIUS: f64 = 6_371_229.0;

/// Pole of the fixtures' rotated grid.
pub const ROTATED_POLE: (f64, f64) = (37.5, 177.5);

fn unit(definition: &str) -> Unit {
    Unit::new(definition).expect("fixture units are valid")
}

fn geog() -> CoordSystem {
    CoordSystem::Geog(Ellipsoid::sphere(EARTH_RADIUS))
}

/// A 2x3 `air_temperature` cube on a regular latitude/longitude grid with a
/// scalar time and height, a STASH attribute and a mean cell method.
pub fn air_temperature_cube() -> Cube {
    let mut cube = Cube::new(ArrayData::from(temperature_field(2, 3)), unit("K"))
        .with_standard_name("air_temperature")
        .with_var_name("tas")
        .with_attribute("STASH", StashCode::new(1, 3, 236))
        .with_attribute("source", "Met Office Unified Model")
        .with_cell_method(CellMethod::new("mean").with_coords(["time"]).with_intervals(["1 hour"]));

    let latitude = Coord::from_vec(vec![-1.0, 1.0], unit("degrees"))
        .with_standard_name("latitude")
        .with_coord_system(geog());
    let longitude = Coord::from_vec(regular_points(0.0, 1.5, 3), unit("degrees"))
        .with_standard_name("longitude")
        .with_coord_system(geog());
    let time = Coord::scalar(24.0, unit("hours since 1970-01-01 00:00:00")).with_standard_name("time");
    let height = Coord::scalar(1.5, unit("m")).with_standard_name("height");

    attach(&mut cube, |cube| {
        cube.add_dim_coord(latitude, 0)?;
        cube.add_dim_coord(longitude, 1)?;
        cube.add_aux_coord(time, AxisSpec::Scalar)?;
        cube.add_aux_coord(height, AxisSpec::Scalar)
    });
    cube
}

/// An `x_wind` cube on a rotated-pole grid of `ny` by `nx` points, with a
/// two-dimensional auxiliary coordinate spanning both axes.
pub fn rotated_pole_cube(ny: usize, nx: usize) -> Cube {
    let (pole_lat, pole_lon) = ROTATED_POLE;
    let cs = CoordSystem::RotatedGeog(
        RotatedPole::new(pole_lat, pole_lon).with_ellipsoid(Ellipsoid::sphere(EARTH_RADIUS)),
    );
    let mut cube = Cube::new(ArrayData::from(temperature_field(ny, nx)), unit("m s-1"))
        .with_standard_name("x_wind");

    let grid_latitude = Coord::from_vec(regular_points(-4.5, 0.0135, ny), unit("degrees"))
        .with_standard_name("grid_latitude")
        .with_coord_system(cs.clone());
    let grid_longitude = Coord::from_vec(regular_points(353.0, 0.0135, nx), unit("degrees"))
        .with_standard_name("grid_longitude")
        .with_coord_system(cs);
    let altitude = Coord::new(temperature_field(ny, nx).mapv(f64::from), unit("m"))
        .with_long_name("surface_altitude");

    attach(&mut cube, |cube| {
        cube.add_dim_coord(grid_latitude, 0)?;
        cube.add_dim_coord(grid_longitude, 1)?;
        cube.add_aux_coord(altitude, AxisSpec::Multi(vec![0, 1]))
    });
    cube
}

/// A masked integer `precipitation_amount` cube of the given shape with an
/// integer fill value. Every axis gets a dimension coordinate.
pub fn masked_cube(shape: &[usize]) -> Cube {
    let values = ArrayData::from(precipitation_field(shape, 42));
    let masked = MaskedArray::new(values, diagonal_mask(shape, 5), FillValue::Int(-999))
        .expect("mask follows the value shape");
    let mut cube = Cube::new(NdArray::Masked(masked), unit("mm"))
        .with_standard_name("precipitation_amount")
        .with_cell_method(CellMethod::new("sum").with_coords(["time"]));

    attach(&mut cube, |cube| {
        for (axis, &len) in shape.iter().enumerate() {
            let coord = Coord::from_vec(regular_points(0.0, 1.0, len), unit("1"))
                .with_long_name(format!("index_{}", axis));
            cube.add_dim_coord(coord, axis)?;
        }
        Ok(())
    });
    cube
}

fn attach(cube: &mut Cube, f: impl FnOnce(&mut Cube) -> cube_codec::Result<()>) {
    f(cube).expect("fixture coordinates fit the cube");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_air_temperature_cube() {
        let cube = air_temperature_cube();
        assert_eq!(cube.shape(), &[2, 3]);
        assert_eq!(cube.name(), "air_temperature");
        assert_eq!(cube.scalar_coords().count(), 2);
    }

    #[test]
    fn test_rotated_pole_cube() {
        let cube = rotated_pole_cube(4, 5);
        assert_eq!(cube.shape(), &[4, 5]);
        assert!(matches!(cube.coord_system(), Some(CoordSystem::RotatedGeog(_))));
        assert_eq!(cube.coord_dims("surface_altitude"), Some(AxisSpec::Multi(vec![0, 1])));
    }

    #[test]
    fn test_masked_cube() {
        let cube = masked_cube(&[2, 3, 4]);
        assert_eq!(cube.dim_coords().len(), 3);
        assert!(cube.data().as_realised().map_or(false, NdArray::is_masked));
    }
}
