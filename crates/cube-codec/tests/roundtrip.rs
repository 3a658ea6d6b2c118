//! Integration test: encode cubes to documents and decode them back.
//!
//! Covers plain, masked and rotated-pole cubes, the metadata-only encoding,
//! and the errors raised by malformed documents.

use cube_codec::{
    decode_cube, encode_cube, ArrayData, AttributeDecoders, AxisSpec, CellMethod, CodecError,
    Coord, CoordSystem, Cube, CubeData, DecodeOptions, Ellipsoid, EncodeOptions, FillValue,
    MaskedArray, NdArray, RotatedPole, StashCode, Unit,
};
use doc_store::Document;
use ndarray::{ArrayD, IxDyn};
use serde_json::json;

fn degrees() -> Unit {
    Unit::new("degrees").unwrap()
}

fn roundtrip(cube: &Cube) -> Cube {
    let doc = encode_cube(cube, &EncodeOptions::default()).unwrap();
    // Go through text so the document survives real serialization.
    let text = serde_json::to_string(&doc).unwrap();
    let doc: Document = serde_json::from_str(&text).unwrap();
    decode_cube(&doc, &DecodeOptions::default(), &AttributeDecoders::default()).unwrap()
}

/// A 2x3 air temperature cube on a regular latitude/longitude grid.
fn air_temperature() -> Cube {
    let values = ArrayD::from_shape_vec(
        IxDyn(&[2, 3]),
        vec![280.5f32, 281.0, 282.25, 279.0, 278.5, 277.75],
    )
    .unwrap();
    let geog = CoordSystem::Geog(Ellipsoid::default());
    let mut cube = Cube::new(ArrayData::from(values), Unit::new("K").unwrap())
        .with_standard_name("air_temperature")
        .with_var_name("tas")
        .with_attribute("STASH", StashCode::new(1, 3, 236))
        .with_attribute("source", "Met Office Unified Model")
        .with_attribute("um_version", json!(11.2))
        .with_cell_method(
            CellMethod::new("mean")
                .with_coords(["time"])
                .with_intervals(["1 hour"]),
        );
    cube.add_dim_coord(
        Coord::from_vec(vec![-1.0, 1.0], degrees())
            .with_standard_name("latitude")
            .with_coord_system(geog.clone()),
        0,
    )
    .unwrap();
    cube.add_dim_coord(
        Coord::from_vec(vec![0.0, 1.5, 3.0], degrees())
            .with_standard_name("longitude")
            .with_coord_system(geog),
        1,
    )
    .unwrap();
    cube.add_aux_coord(
        Coord::scalar(24.0, Unit::new("hours since 1970-01-01 00:00:00").unwrap())
            .with_standard_name("time"),
        AxisSpec::Scalar,
    )
    .unwrap();
    cube.add_aux_coord(
        Coord::from_vec(vec![10.0, 20.0], Unit::new("m").unwrap()).with_long_name("surface_altitude"),
        AxisSpec::Single(0),
    )
    .unwrap();
    cube
}

#[test]
fn test_round_trip() {
    let cube = air_temperature();
    let decoded = roundtrip(&cube);
    assert_eq!(decoded, cube);
    assert_eq!(decoded.coord_dims("surface_altitude"), Some(AxisSpec::Single(0)));
    assert_eq!(decoded.scalar_coords().count(), 1);
    assert_eq!(
        decoded.attributes["STASH"].to_json(),
        json!([1, 3, 236])
    );
}

#[test]
fn test_dimension_coords_match_axis_extents() {
    let decoded = roundtrip(&air_temperature());
    for (coord, axis) in decoded.dim_coords() {
        assert_eq!(coord.npoints(), decoded.shape()[*axis]);
    }
}

#[test]
fn test_masked_round_trip() {
    let values = ArrayData::from(
        ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![1u8, 2, 3, 4]).unwrap(),
    );
    let mask = ArrayD::from_shape_vec(IxDyn(&[2, 2]), vec![false, true, false, true]).unwrap();
    let masked = MaskedArray::new(values, mask.clone(), FillValue::Int(255)).unwrap();
    let cube = Cube::new(NdArray::Masked(masked), Unit::new("1").unwrap())
        .with_long_name("land_binary_mask");

    let decoded = roundtrip(&cube);
    assert_eq!(decoded, cube);
    match decoded.data() {
        CubeData::Realised(NdArray::Masked(m)) => {
            assert_eq!(m.mask(), &mask);
            assert_eq!(m.fill_value(), FillValue::Int(255));
        }
        other => panic!("expected a masked array, got {:?}", other),
    }
}

#[test]
fn test_float_fill_value_stays_float() {
    let values = ArrayData::from(ArrayD::from_elem(IxDyn(&[3]), 2.5f64));
    let mask = ArrayD::from_shape_vec(IxDyn(&[3]), vec![true, false, false]).unwrap();
    let masked = MaskedArray::new(values, mask, FillValue::Float(1e20)).unwrap();
    let cube = Cube::new(NdArray::Masked(masked), Unit::new("mm").unwrap());

    let doc = encode_cube(&cube, &EncodeOptions::default()).unwrap();
    assert_eq!(doc["data"]["fill_value"], json!("1e20"));
    match roundtrip(&cube).data() {
        CubeData::Realised(NdArray::Masked(m)) => assert_eq!(m.fill_value(), FillValue::Float(1e20)),
        other => panic!("expected a masked array, got {:?}", other),
    }
}

#[test]
fn test_rotated_pole_fidelity() {
    let cs = CoordSystem::RotatedGeog(
        RotatedPole::new(37.5, 177.5).with_ellipsoid(Ellipsoid::sphere(6371229.0)),
    );
    let data = ArrayData::from(ArrayD::<f32>::zeros(IxDyn(&[2, 2])));
    let mut cube = Cube::new(data, Unit::new("m s-1").unwrap()).with_standard_name("x_wind");
    cube.add_dim_coord(
        Coord::from_vec(vec![-0.5, 0.5], degrees())
            .with_standard_name("grid_latitude")
            .with_coord_system(cs.clone()),
        0,
    )
    .unwrap();
    cube.add_dim_coord(
        Coord::from_vec(vec![359.5, 360.5], degrees())
            .with_standard_name("grid_longitude")
            .with_coord_system(cs.clone()),
        1,
    )
    .unwrap();

    let doc = encode_cube(&cube, &EncodeOptions::default()).unwrap();
    let encoded_cs = &doc["dim_coords"]["grid_latitude"]["coord_system"];
    assert_eq!(encoded_cs["name"], json!("rotated_latitude_longitude"));
    assert_eq!(encoded_cs["grid_north_pole_latitude"], json!(37.5));
    assert_eq!(encoded_cs["ellipsoid"]["semi_major_axis"], json!(6371229.0));

    let decoded = roundtrip(&cube);
    assert_eq!(decoded.coord_system(), Some(&cs));
    assert_eq!(decoded, cube);
}

#[test]
fn test_geographic_system_has_no_ellipsoid_key() {
    let doc = encode_cube(&air_temperature(), &EncodeOptions::default()).unwrap();
    let cs = doc["dim_coords"]["latitude"]["coord_system"].as_object().unwrap();
    assert_eq!(cs["name"], json!("latitude_longitude"));
    assert!(!cs.contains_key("ellipsoid"));
    assert_eq!(cs["semi_major_axis"], json!(6371229.0));
}

#[test]
fn test_unknown_coordinate_system() {
    let mut doc = encode_cube(&air_temperature(), &EncodeOptions::default()).unwrap();
    doc["dim_coords"]["latitude"]["coord_system"] = json!({"name": "utm", "zone": 30});

    let err = decode_cube(&doc, &DecodeOptions::default(), &AttributeDecoders::default())
        .unwrap_err();
    match err {
        CodecError::UnknownCoordinateSystem { field, name } => {
            assert_eq!(name, "utm");
            assert_eq!(field, "dim_coords.latitude.coord_system.name");
        }
        other => panic!("expected UnknownCoordinateSystem, got {:?}", other),
    }
}

#[test]
fn test_missing_dim_coords() {
    let mut doc = encode_cube(&air_temperature(), &EncodeOptions::default()).unwrap();
    doc.remove("dim_coords");
    let err = decode_cube(&doc, &DecodeOptions::default(), &AttributeDecoders::default())
        .unwrap_err();
    assert!(matches!(err, CodecError::MissingField(ref f) if f == "dim_coords"));
    assert!(err.to_string().contains("dim_coords"));
}

#[test]
fn test_malformed_unit_names_field() {
    let mut doc = encode_cube(&air_temperature(), &EncodeOptions::default()).unwrap();
    doc["aux_coords"]["surface_altitude"]["units"]["unit"] = json!("bogus_unit");
    let err = decode_cube(&doc, &DecodeOptions::default(), &AttributeDecoders::default())
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::MalformedUnit { ref field, .. } if field == "aux_coords.surface_altitude.units.unit"
    ));
}

#[test]
fn test_non_ascii_unit_is_malformed() {
    let mut doc = encode_cube(&air_temperature(), &EncodeOptions::default()).unwrap();
    doc["units"]["unit"] = json!("\u{212A} since 1970-01-01");
    let err = decode_cube(&doc, &DecodeOptions::default(), &AttributeDecoders::default())
        .unwrap_err();
    assert!(matches!(
        err,
        CodecError::MalformedUnit { ref field, .. } if field == "units.unit"
    ));
}

#[test]
fn test_metadata_only_scenario() {
    let data = ArrayData::from(ArrayD::<f32>::zeros(IxDyn(&[2, 3])));
    let mut cube = Cube::new(data, Unit::new("K").unwrap()).with_standard_name("air_temperature");
    cube.add_dim_coord(
        Coord::from_vec(vec![-1.0, 1.0], degrees()).with_standard_name("latitude"),
        0,
    )
    .unwrap();

    let options = EncodeOptions {
        include_data: false,
        include_points: false,
    };
    let doc = encode_cube(&cube, &options).unwrap();
    assert!(doc.get("data").is_none());
    let latitude = doc["dim_coords"]["latitude"].as_object().unwrap();
    assert!(!latitude.contains_key("points"));
    assert_eq!(latitude["npoints"], json!(2));
    assert_eq!(latitude["min"], json!(-1.0));
    assert_eq!(latitude["max"], json!(1.0));
    assert_eq!(doc["standard_name"], json!("air_temperature"));
    assert_eq!(doc["cell_methods"], json!(null));
}

#[test]
fn test_nan_values_round_trip_as_null() {
    let values = ArrayD::from_shape_vec(IxDyn(&[3]), vec![1.0f64, f64::NAN, 3.0]).unwrap();
    let cube = Cube::new(ArrayData::from(values), Unit::new("K").unwrap());
    let doc = encode_cube(&cube, &EncodeOptions::default()).unwrap();
    assert_eq!(doc["data"]["data"], json!([1.0, null, 3.0]));

    let decoded = roundtrip(&cube);
    let values: Vec<f64> = decoded
        .data()
        .as_realised()
        .unwrap()
        .values()
        .to_f64()
        .iter()
        .copied()
        .collect();
    assert_eq!(values[0], 1.0);
    assert!(values[1].is_nan());
    assert_eq!(values[2], 3.0);
}
